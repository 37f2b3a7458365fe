use std::str::FromStr;
use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::Provider;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Error)]
pub enum WalletError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("wallet request failed: {0}")]
    Request(String),
}

pub(crate) type WalletResult<T> = std::result::Result<T, WalletError>;

/// The externally owned signing wallet this service binds sessions to.
///
/// Mirrors the capability set of a browser-injected provider: request the
/// account list, read the active network, hand out the signer for contract
/// bindings, and stream account-change events. Account events are delivered
/// on a broadcast channel; subscribers that lag simply skip to the newest
/// event, which is the only one that matters for session state.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Asks the wallet for its accounts, prompting for access if needed.
    async fn request_accounts(&self) -> WalletResult<Vec<Address>>;

    /// Chain id of the network the wallet is pointed at.
    async fn chain_id(&self) -> WalletResult<u64>;

    /// The signer used to build contract bindings for a session.
    fn signer(&self) -> EthereumWallet;

    /// Subscribes to account-change events for the caller's lifetime.
    fn subscribe_accounts(&self) -> broadcast::Receiver<Vec<Address>>;
}

/// Wallet backed by a configured private key and an RPC endpoint.
///
/// A single-account wallet: `request_accounts` always answers with the key's
/// address and never prompts. The account-event channel exists for parity
/// with injected providers; nothing publishes on it in this implementation.
pub struct LocalWalletProvider<P> {
    provider: Arc<P>,
    wallet: EthereumWallet,
    accounts_tx: broadcast::Sender<Vec<Address>>,
}

impl<P: Provider + Clone + 'static> LocalWalletProvider<P> {
    pub fn new(provider: Arc<P>, private_key: &str) -> WalletResult<Self> {
        let signer = PrivateKeySigner::from_str(private_key)
            .map_err(|e| WalletError::InvalidKey(e.to_string()))?;

        let (accounts_tx, _) = broadcast::channel(8);

        Ok(Self {
            provider,
            wallet: EthereumWallet::from(signer),
            accounts_tx,
        })
    }

    pub fn address(&self) -> Address {
        self.wallet.default_signer().address()
    }
}

#[async_trait]
impl<P: Provider + Clone + Send + Sync + 'static> WalletProvider for LocalWalletProvider<P> {
    async fn request_accounts(&self) -> WalletResult<Vec<Address>> {
        Ok(vec![self.address()])
    }

    async fn chain_id(&self) -> WalletResult<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| WalletError::Rpc(e.to_string()))
    }

    fn signer(&self) -> EthereumWallet {
        self.wallet.clone()
    }

    fn subscribe_accounts(&self) -> broadcast::Receiver<Vec<Address>> {
        self.accounts_tx.subscribe()
    }
}
