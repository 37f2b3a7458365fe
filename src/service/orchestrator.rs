use std::future::Future;
use std::sync::Arc;

use rmcp::schemars::{self, JsonSchema};
use serde::Serialize;
use tokio::sync::watch;

use crate::chain::{BindingError, BindingRegistry, DexChain, TxOutcome};
use crate::service::ServiceResult;
use crate::service::notify::{Notification, Notifier};
use crate::session::SessionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CreateToken,
    CreatePair,
    AddLiquidity,
    Swap,
    RefreshPairs,
}

impl OperationKind {
    fn label(self) -> &'static str {
        match self {
            Self::CreateToken => "create token",
            Self::CreatePair => "create pair",
            Self::AddLiquidity => "add liquidity",
            Self::Swap => "swap tokens",
            Self::RefreshPairs => "fetch pairs",
        }
    }

    /// Generic failure message used when the underlying error carries none.
    pub(crate) fn fallback_message(self) -> String {
        format!("Failed to {}", self.label())
    }
}

/// Current state of the one reported operation.
///
/// `Pending` is what the consumer renders as "busy". The orchestrator does
/// not serialize concurrent operations; callers are expected to hold off
/// while one is pending, and a bypassed gate leaves notifications ordered
/// by completion.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OperationState {
    Idle,
    Pending { kind: OperationKind },
    Succeeded { kind: OperationKind },
    Failed { kind: OperationKind, reason: String },
}

impl OperationState {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Read-only view plus subscribe capability over [`OperationState`]; only
/// operation guards write to it.
#[derive(Clone)]
pub struct OperationTracker {
    state: Arc<watch::Sender<OperationState>>,
}

impl OperationTracker {
    pub fn new() -> Self {
        Self {
            state: Arc::new(watch::Sender::new(OperationState::Idle)),
        }
    }

    pub fn current(&self) -> OperationState {
        self.state.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_busy()
    }

    pub fn subscribe(&self) -> watch::Receiver<OperationState> {
        self.state.subscribe()
    }

    pub(crate) fn begin(&self, kind: OperationKind) -> OperationGuard {
        self.state.send_replace(OperationState::Pending { kind });
        OperationGuard {
            state: self.state.clone(),
            kind,
            finished: false,
        }
    }
}

impl Default for OperationTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the pending state on every exit path; dropping without an explicit
/// outcome (an early return or panic) falls back to `Idle`.
pub(crate) struct OperationGuard {
    state: Arc<watch::Sender<OperationState>>,
    kind: OperationKind,
    finished: bool,
}

impl OperationGuard {
    pub(crate) fn succeed(mut self) {
        self.finished = true;
        self.state
            .send_replace(OperationState::Succeeded { kind: self.kind });
    }

    pub(crate) fn fail(mut self, reason: String) {
        self.finished = true;
        self.state.send_replace(OperationState::Failed {
            kind: self.kind,
            reason,
        });
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.state.send_replace(OperationState::Idle);
        }
    }
}

/// Serializable outcome of one orchestrated write.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TxStatus {
    /// The transaction was mined successfully.
    Confirmed { tx_hash: String, summary: String },
    /// The operation failed; `reason` mirrors the failure notification.
    Failed { reason: String },
    /// No usable session, nothing was attempted.
    NoSession,
}

/// Uniform submit→confirm→notify pipeline around every state-changing call.
///
/// Every run resolves bindings, marks the operation pending, executes the
/// call, and reports the outcome through exactly one notification. Failures
/// are fully absorbed here; callers only ever see a [`TxStatus`].
pub struct TxOrchestrator {
    session: Arc<SessionManager>,
    registry: Arc<BindingRegistry>,
    notifier: Notifier,
    tracker: OperationTracker,
}

impl TxOrchestrator {
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
        }
    }

    pub async fn run<F, Fut>(&self, kind: OperationKind, success: String, op: F) -> TxStatus
    where
        F: FnOnce(Arc<dyn DexChain>) -> Fut,
        Fut: Future<Output = ServiceResult<TxOutcome>>,
    {
        let session = self.session.current();
        let chain = match self.registry.bindings(&session) {
            Ok(chain) => chain,
            Err(BindingError::NotConnected) => return TxStatus::NoSession,
            Err(e) => {
                // Missing endpoint configuration: report it, submit nothing.
                let reason = e.to_string();
                tracing::error!("{}: {reason}", kind.label());
                self.notifier
                    .notify(Notification::destructive("Transaction Failed", reason.clone()));
                return TxStatus::Failed { reason };
            }
        };

        let guard = self.tracker.begin(kind);

        match op(chain).await {
            Ok(outcome) => {
                tracing::info!("{} confirmed in tx {}", kind.label(), outcome.tx_hash);
                self.notifier
                    .notify(Notification::info("Transaction Successful", success.clone()));
                guard.succeed();
                TxStatus::Confirmed {
                    tx_hash: outcome.tx_hash.to_string(),
                    summary: success,
                }
            }
            Err(e) => {
                tracing::error!("{} failed: {e}", kind.label());
                let mut reason = e.to_string();
                if reason.trim().is_empty() {
                    reason = kind.fallback_message();
                }
                self.notifier
                    .notify(Notification::destructive("Transaction Failed", reason.clone()));
                guard.fail(reason.clone());
                TxStatus::Failed { reason }
            }
        }
    }
}
