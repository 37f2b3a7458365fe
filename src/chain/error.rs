use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ChainError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Contract call error: {0}")]
    Contract(String),

    #[error("Transaction reverted: {0}")]
    Reverted(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
