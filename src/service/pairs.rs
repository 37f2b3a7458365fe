use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::Address;
use futures::future::join_all;
use rmcp::schemars::{self, JsonSchema};
use serde::Serialize;
use tokio::sync::watch;

use crate::chain::{BindingRegistry, ChainResult, DexChain};
use crate::service::notify::{Notification, Notifier};
use crate::service::orchestrator::{OperationKind, OperationTracker};
use crate::session::SessionManager;

/// Metadata for one trading pair.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairDetails {
    /// Both constituent tokens resolved.
    Resolved {
        address: String,
        token0: String,
        token1: String,
    },
    /// Introspection failed; the pair is kept in the aggregate with sentinel
    /// fields so one bad pair cannot block the rest.
    Degraded {
        address: String,
        token0: String,
        token1: String,
        error: bool,
    },
}

impl PairDetails {
    fn degraded(address: Address) -> Self {
        Self::Degraded {
            address: address.to_string(),
            token0: "N/A".to_string(),
            token1: "N/A".to_string(),
            error: true,
        }
    }

    pub fn address(&self) -> &str {
        match self {
            Self::Resolved { address, .. } | Self::Degraded { address, .. } => address,
        }
    }
}

/// Read-only pair enumeration and introspection, independent of the
/// transaction pipeline.
pub struct PairQueryService {
    session: Arc<SessionManager>,
    registry: Arc<BindingRegistry>,
    notifier: Notifier,
    tracker: OperationTracker,
    refresh_seq: AtomicU64,
    details: watch::Sender<Vec<PairDetails>>,
}

impl PairQueryService {
    pub fn new(
        session: Arc<SessionManager>,
        registry: Arc<BindingRegistry>,
        notifier: Notifier,
        tracker: OperationTracker,
    ) -> Self {
        Self {
            session,
            registry,
            notifier,
            tracker,
            refresh_seq: AtomicU64::new(0),
            details: watch::Sender::new(Vec::new()),
        }
    }

    /// All pair addresses in on-chain creation order.
    ///
    /// Without bindings this is an empty list. Enumeration failures are
    /// reported through a notification and also yield an empty list; a
    /// partially enumerated list is never returned.
    pub async fn list_pairs(&self) -> Vec<Address> {
        let session = self.session.current();
        let Ok(chain) = self.registry.bindings(&session) else {
            return Vec::new();
        };

        let guard = self.tracker.begin(OperationKind::RefreshPairs);
        match enumerate(chain.as_ref()).await {
            Ok(pairs) => {
                guard.succeed();
                pairs
            }
            Err(e) => {
                tracing::error!("pair enumeration failed: {e}");
                self.notifier.notify(Notification::destructive(
                    "Fetch Pairs Failed",
                    e.to_string(),
                ));
                guard.fail(e.to_string());
                Vec::new()
            }
        }
    }

    /// Constituent tokens of one pair; absent without a session, degraded
    /// (never an error) when introspection fails.
    pub async fn describe_pair(&self, address: Address) -> Option<PairDetails> {
        let session = self.session.current();
        if !session.is_connected {
            return None;
        }
        let chain = self.registry.bindings(&session).ok()?;

        Some(match chain.pair_tokens(address).await {
            Ok((token0, token1)) => PairDetails::Resolved {
                address: address.to_string(),
                token0: token0.to_string(),
                token1: token1.to_string(),
            },
            Err(e) => {
                tracing::warn!("introspection of pair {address} failed: {e}");
                PairDetails::degraded(address)
            }
        })
    }

    /// Re-enumerates, resolves every pair concurrently, and waits for all to
    /// settle. The aggregate is published only if no newer refresh was issued
    /// while this one was in flight; stale aggregates are discarded.
    pub async fn refresh_pairs(&self) -> Vec<PairDetails> {
        let seq = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let pairs = self.list_pairs().await;
        let resolved = join_all(
            pairs
                .into_iter()
                .map(|address| self.describe_pair(address)),
        )
        .await;

        // A pair resolving to None means the session went away mid-refresh;
        // the aggregate no longer describes anything current.
        let details: Vec<PairDetails> = match resolved.into_iter().collect() {
            Some(details) => details,
            None => Vec::new(),
        };

        if self.refresh_seq.load(Ordering::SeqCst) == seq {
            self.details.send_replace(details.clone());
        }

        details
    }

    pub fn latest_details(&self) -> Vec<PairDetails> {
        self.details.borrow().clone()
    }

    pub fn subscribe_details(&self) -> watch::Receiver<Vec<PairDetails>> {
        self.details.subscribe()
    }
}

async fn enumerate(chain: &dyn DexChain) -> ChainResult<Vec<Address>> {
    let count = chain.pair_count().await?;

    let mut pairs = Vec::with_capacity(count as usize);
    for index in 0..count {
        pairs.push(chain.pair_at(index).await?);
    }

    Ok(pairs)
}
