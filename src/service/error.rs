use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::{BindingError, ChainError};
use crate::service::amounts::CodecError;

#[derive(Debug, Clone, Error, JsonSchema, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ServiceError {
    // Business validation errors
    /// No connected wallet session.
    #[error("No connected wallet session")]
    NotConnected,

    /// A supplied token or pair address is malformed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The supplied amount is not a usable decimal amount.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The router returned no usable quote for the requested swap.
    #[error("No quote available: {0}")]
    QuoteUnavailable(String),

    // Infrastructure errors
    /// A required contract endpoint is missing from configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An error occurred while communicating with the blockchain.
    #[error("Blockchain error: {0}")]
    Blockchain(String),

    /// An unexpected internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ChainError> for ServiceError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Rpc(msg) | ChainError::Contract(msg) | ChainError::Reverted(msg) => {
                ServiceError::Blockchain(msg)
            }
            ChainError::Parse(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<CodecError> for ServiceError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::InvalidAmount(msg) => ServiceError::InvalidAmount(msg),
        }
    }
}

impl From<BindingError> for ServiceError {
    fn from(err: BindingError) -> Self {
        match err {
            BindingError::NotConnected => ServiceError::NotConnected,
            e @ BindingError::Unconfigured { .. } => ServiceError::Configuration(e.to_string()),
            BindingError::Build(e) => e.into(),
        }
    }
}
