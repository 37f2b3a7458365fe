use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use async_trait::async_trait;
use tracing::instrument;

use super::contract::{IDexRouter, IPair, IPairFactory, ITokenFactory};
use super::error::ChainError;
use super::registry::{ChainFactory, ContractAddresses};
use crate::chain::{ChainResult, DexChain, TxOutcome};
use crate::session::provider::WalletProvider;

/// Contract bindings over an alloy provider.
///
/// One instance per session epoch: the provider carries the signer the
/// session was connected with, so a reconnect always gets a fresh instance.
pub struct AlloyDexChain<P> {
    provider: Arc<P>,
    addresses: ContractAddresses,
}

impl<P> std::fmt::Debug for AlloyDexChain<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlloyDexChain")
            .field("addresses", &self.addresses)
            .finish_non_exhaustive()
    }
}

impl<P: Provider + Clone + 'static> AlloyDexChain<P> {
    pub fn new(provider: Arc<P>, addresses: ContractAddresses) -> Self {
        Self {
            provider,
            addresses,
        }
    }

    fn outcome(receipt: TransactionReceipt) -> ChainResult<TxOutcome> {
        if !receipt.status() {
            return Err(ChainError::Reverted(format!(
                "transaction {} reverted",
                receipt.transaction_hash
            )));
        }

        Ok(TxOutcome {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
        })
    }
}

#[async_trait]
impl<P: Provider + Clone + Send + Sync + 'static> DexChain for AlloyDexChain<P> {
    #[instrument(skip(self), err)]
    async fn create_token(
        &self,
        name: &str,
        symbol: &str,
        total_supply: U256,
    ) -> ChainResult<TxOutcome> {
        let factory = ITokenFactory::new(self.addresses.token_factory, self.provider.clone());

        let pending = factory
            .createToken(name.to_owned(), symbol.to_owned(), total_supply)
            .send()
            .await
            .map_err(|e| ChainError::Contract(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        Self::outcome(receipt)
    }

    #[instrument(skip(self), err)]
    async fn create_pair(&self, token_a: Address, token_b: Address) -> ChainResult<TxOutcome> {
        let factory = IPairFactory::new(self.addresses.pair_factory, self.provider.clone());

        let pending = factory
            .createPair(token_a, token_b)
            .send()
            .await
            .map_err(|e| ChainError::Contract(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        Self::outcome(receipt)
    }

    #[instrument(skip(self), err)]
    async fn add_liquidity(
        &self,
        token_a: Address,
        token_b: Address,
        amount_a: U256,
        amount_b: U256,
    ) -> ChainResult<TxOutcome> {
        let router = IDexRouter::new(self.addresses.router, self.provider.clone());

        let pending = router
            .addLiquidity(token_a, token_b, amount_a, amount_b)
            .send()
            .await
            .map_err(|e| ChainError::Contract(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        Self::outcome(receipt)
    }

    #[instrument(skip(self), err)]
    async fn swap_exact_tokens(
        &self,
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        to: Address,
    ) -> ChainResult<TxOutcome> {
        let router = IDexRouter::new(self.addresses.router, self.provider.clone());

        let pending = router
            .swapExactTokensForTokens(amount_in, amount_out_min, path, to)
            .send()
            .await
            .map_err(|e| ChainError::Contract(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        Self::outcome(receipt)
    }

    #[instrument(skip(self), err)]
    async fn amounts_out(&self, amount_in: U256, path: Vec<Address>) -> ChainResult<Vec<U256>> {
        let router = IDexRouter::new(self.addresses.router, self.provider.clone());

        let amounts = router
            .getAmountsOut(amount_in, path)
            .call()
            .await
            .map_err(|e| ChainError::Contract(e.to_string()))?;

        Ok(amounts.to_vec())
    }

    #[instrument(skip(self), err)]
    async fn pair_count(&self) -> ChainResult<u64> {
        let factory = IPairFactory::new(self.addresses.pair_factory, self.provider.clone());

        let count = factory
            .allPairsLength()
            .call()
            .await
            .map_err(|e| ChainError::Contract(e.to_string()))?;

        u64::try_from(count).map_err(|e| ChainError::Parse(format!("pair count: {e}")))
    }

    #[instrument(skip(self), err)]
    async fn pair_at(&self, index: u64) -> ChainResult<Address> {
        let factory = IPairFactory::new(self.addresses.pair_factory, self.provider.clone());

        factory
            .allPairs(U256::from(index))
            .call()
            .await
            .map_err(|e| ChainError::Contract(e.to_string()))
    }

    #[instrument(skip(self), err)]
    async fn pair_tokens(&self, pair: Address) -> ChainResult<(Address, Address)> {
        let contract = IPair::new(pair, self.provider.clone());

        let token0 = contract
            .token0()
            .call()
            .await
            .map_err(|e| ChainError::Contract(e.to_string()))?;

        let token1 = contract
            .token1()
            .call()
            .await
            .map_err(|e| ChainError::Contract(e.to_string()))?;

        Ok((token0, token1))
    }
}

/// Builds a fresh signing chain handle for the current session.
pub struct AlloyChainFactory {
    rpc_url: String,
    wallet: Option<Arc<dyn WalletProvider>>,
}

impl AlloyChainFactory {
    pub fn new(rpc_url: impl Into<String>, wallet: Option<Arc<dyn WalletProvider>>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            wallet,
        }
    }
}

impl ChainFactory for AlloyChainFactory {
    fn build(&self, addresses: &ContractAddresses) -> ChainResult<Arc<dyn DexChain>> {
        // Unreachable through a connected session, which requires a wallet;
        // kept as a hard error rather than a panic.
        let Some(wallet) = &self.wallet else {
            return Err(ChainError::Contract(
                "no signing wallet configured".to_string(),
            ));
        };

        let url = self
            .rpc_url
            .parse()
            .map_err(|e| ChainError::Parse(format!("invalid RPC URL: {e}")))?;

        let provider = ProviderBuilder::new()
            .wallet(wallet.signer())
            .connect_http(url);

        Ok(Arc::new(AlloyDexChain::new(
            Arc::new(provider),
            addresses.clone(),
        )))
    }
}
