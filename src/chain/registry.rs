use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use alloy::primitives::Address;
use thiserror::Error;

use crate::chain::{ChainError, ChainResult, DexChain};
use crate::config::ContractsConfig;
use crate::session::Session;

#[derive(Debug, Clone, Error)]
pub enum BindingError {
    /// No connected session; callers treat this as a silent no-op.
    #[error("no connected wallet session")]
    NotConnected,

    /// A required contract address is missing from the runtime configuration.
    #[error("contract address `{name}` is not configured: {reason}")]
    Unconfigured { name: &'static str, reason: String },

    #[error(transparent)]
    Build(#[from] ChainError),
}

/// The three configured exchange endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractAddresses {
    pub token_factory: Address,
    pub pair_factory: Address,
    pub router: Address,
}

impl ContractAddresses {
    pub fn from_config(contracts: &ContractsConfig) -> Result<Self, BindingError> {
        Ok(Self {
            token_factory: parse_address("token_factory", &contracts.token_factory)?,
            pair_factory: parse_address("pair_factory", &contracts.pair_factory)?,
            router: parse_address("router", &contracts.router)?,
        })
    }
}

fn parse_address(name: &'static str, value: &str) -> Result<Address, BindingError> {
    let value = value.trim();

    // An empty value or a leftover `${VAR}` placeholder means the deployment
    // address was never supplied.
    if value.is_empty() || value.starts_with("${") {
        return Err(BindingError::Unconfigured {
            name,
            reason: "no value set".to_string(),
        });
    }

    Address::from_str(value).map_err(|e| BindingError::Unconfigured {
        name,
        reason: e.to_string(),
    })
}

/// Builds a chain handle for the current session's signer.
pub trait ChainFactory: Send + Sync {
    fn build(&self, addresses: &ContractAddresses) -> ChainResult<Arc<dyn DexChain>>;
}

/// Resolves the contract endpoints into a callable handle for the current
/// session.
///
/// Handles are cached per session epoch and replaced wholesale when the
/// epoch changes, so a disconnect/reconnect cycle never reuses a binding
/// even if the account is identical.
pub struct BindingRegistry {
    addresses: Result<ContractAddresses, BindingError>,
    factory: Arc<dyn ChainFactory>,
    cache: Mutex<Option<(u64, Arc<dyn DexChain>)>>,
}

impl BindingRegistry {
    pub fn new(contracts: &ContractsConfig, factory: Arc<dyn ChainFactory>) -> Self {
        let addresses = ContractAddresses::from_config(contracts);
        if let Err(e) = &addresses {
            tracing::error!("contract endpoints unavailable: {e}");
        }

        Self {
            addresses,
            factory,
            cache: Mutex::new(None),
        }
    }

    /// The callable bindings for `session`, or why none exist.
    pub fn bindings(&self, session: &Session) -> Result<Arc<dyn DexChain>, BindingError> {
        if !session.is_connected {
            return Err(BindingError::NotConnected);
        }

        let addresses = self.addresses.as_ref().map_err(Clone::clone)?;

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((epoch, chain)) = &*cache
            && *epoch == session.epoch
        {
            return Ok(chain.clone());
        }

        let chain = self.factory.build(addresses)?;
        *cache = Some((session.epoch, chain.clone()));
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contracts(token_factory: &str, pair_factory: &str, router: &str) -> ContractsConfig {
        ContractsConfig {
            token_factory: token_factory.to_string(),
            pair_factory: pair_factory.to_string(),
            router: router.to_string(),
        }
    }

    #[test]
    fn parses_configured_addresses() {
        let config = contracts(
            "0x5FbDB2315678afecb367f032d93F642f64180aa3",
            "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512",
            "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0",
        );

        let addresses = ContractAddresses::from_config(&config).unwrap();
        assert_eq!(
            addresses.router,
            Address::from_str("0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0").unwrap()
        );
    }

    #[test]
    fn empty_address_is_unconfigured() {
        let config = contracts("", "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512", "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0");

        match ContractAddresses::from_config(&config) {
            Err(BindingError::Unconfigured { name, .. }) => assert_eq!(name, "token_factory"),
            other => panic!("expected Unconfigured, got {other:?}"),
        }
    }

    #[test]
    fn unsubstituted_placeholder_is_unconfigured() {
        let config = contracts(
            "0x5FbDB2315678afecb367f032d93F642f64180aa3",
            "${CONTRACT_PAIR_FACTORY}",
            "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0",
        );

        match ContractAddresses::from_config(&config) {
            Err(BindingError::Unconfigured { name, .. }) => assert_eq!(name, "pair_factory"),
            other => panic!("expected Unconfigured, got {other:?}"),
        }
    }

    #[test]
    fn garbage_address_is_unconfigured() {
        let config = contracts(
            "not-an-address",
            "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512",
            "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0",
        );

        assert!(matches!(
            ContractAddresses::from_config(&config),
            Err(BindingError::Unconfigured {
                name: "token_factory",
                ..
            })
        ));
    }
}
