pub mod alloy;
pub mod contract;
pub mod error;
pub mod registry;

use ::alloy::primitives::{Address, B256, U256};
pub use alloy::{AlloyChainFactory, AlloyDexChain};
use async_trait::async_trait;
pub use error::ChainError;
pub use registry::{BindingError, BindingRegistry, ChainFactory, ContractAddresses};

pub(crate) type ChainResult<T> = std::result::Result<T, ChainError>;

/// Outcome of a confirmed state-changing call.
#[derive(Debug, Clone)]
pub struct TxOutcome {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
}

/// Callable handle over the three exchange endpoints, bound to one signer.
///
/// Every write submits the transaction and awaits its inclusion; the returned
/// [`TxOutcome`] describes the mined transaction. Reverts surface as
/// [`ChainError::Reverted`]. Implementations are valid only for the session
/// that produced them; the [`BindingRegistry`] rebuilds handles whenever the
/// session identity changes.
#[async_trait]
pub trait DexChain: Send + Sync + std::fmt::Debug {
    /// Deploys a new token through the token factory.
    async fn create_token(
        &self,
        name: &str,
        symbol: &str,
        total_supply: U256,
    ) -> ChainResult<TxOutcome>;

    /// Creates a trading pair for two tokens through the pair factory.
    async fn create_pair(&self, token_a: Address, token_b: Address) -> ChainResult<TxOutcome>;

    /// Deposits both sides of a pair through the router.
    async fn add_liquidity(
        &self,
        token_a: Address,
        token_b: Address,
        amount_a: U256,
        amount_b: U256,
    ) -> ChainResult<TxOutcome>;

    /// Swaps an exact input amount along `path`, sending output to `to`.
    async fn swap_exact_tokens(
        &self,
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        to: Address,
    ) -> ChainResult<TxOutcome>;

    /// Router quote: expected amounts along `path` for `amount_in`.
    async fn amounts_out(&self, amount_in: U256, path: Vec<Address>) -> ChainResult<Vec<U256>>;

    /// Number of pairs the factory has created.
    async fn pair_count(&self) -> ChainResult<u64>;

    /// Pair address at a creation-order index.
    async fn pair_at(&self, index: u64) -> ChainResult<Address>;

    /// The two constituent tokens of a pair, in contract order.
    async fn pair_tokens(&self, pair: Address) -> ChainResult<(Address, Address)>;
}
