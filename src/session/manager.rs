use std::sync::{Arc, Mutex, PoisonError, Weak};

use alloy::primitives::Address;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::service::notify::{Notification, Notifier};
use crate::session::provider::WalletProvider;

/// The live binding between this service and one signing account on one
/// network. Exactly one exists per process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub is_connected: bool,
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
    /// Bumped on every successful connect. Contract bindings are keyed on
    /// this, so a disconnect/reconnect cycle never reuses a binding even
    /// when the account is identical.
    pub epoch: u64,
}

/// Sole writer of [`Session`] state.
///
/// Owns the wallet's account-event subscription for its whole lifetime: the
/// watcher task is spawned in the constructor and aborted on drop, so
/// repeated construction never accumulates subscriptions.
pub struct SessionManager {
    session: watch::Sender<Session>,
    wallet: Option<Arc<dyn WalletProvider>>,
    notifier: Notifier,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    pub fn new(wallet: Option<Arc<dyn WalletProvider>>, notifier: Notifier) -> Arc<Self> {
        let manager = Arc::new(Self {
            session: watch::Sender::new(Session::default()),
            wallet: wallet.clone(),
            notifier,
            watcher: Mutex::new(None),
        });

        if let Some(wallet) = wallet {
            let events = wallet.subscribe_accounts();
            let handle = tokio::spawn(account_watcher(Arc::downgrade(&manager), events));
            *manager
                .watcher
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(handle);
        }

        manager
    }

    pub fn current(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// Requests account access from the wallet and opens a session.
    ///
    /// Never returns an error: the outcome is reported through exactly one
    /// notification and reflected in the returned session state.
    pub async fn connect(&self) -> Session {
        let Some(wallet) = &self.wallet else {
            self.notifier.notify(Notification::destructive(
                "Wallet Not Found",
                "No signing wallet is configured for this service",
            ));
            return self.current();
        };

        let accounts = match wallet.request_accounts().await {
            Ok(accounts) if !accounts.is_empty() => accounts,
            Ok(_) => {
                self.notifier.notify(Notification::destructive(
                    "Connection Failed",
                    "The wallet returned no accounts",
                ));
                return self.current();
            }
            Err(e) => {
                tracing::warn!("wallet connection failed: {e}");
                self.notifier.notify(Notification::destructive(
                    "Connection Failed",
                    format!("Failed to connect wallet: {e}"),
                ));
                return self.current();
            }
        };

        let chain_id = match wallet.chain_id().await {
            Ok(chain_id) => chain_id,
            Err(e) => {
                tracing::warn!("network lookup failed: {e}");
                self.notifier.notify(Notification::destructive(
                    "Connection Failed",
                    format!("Failed to read wallet network: {e}"),
                ));
                return self.current();
            }
        };

        let account = accounts[0];
        self.session.send_modify(|session| {
            session.is_connected = true;
            session.account = Some(account);
            session.chain_id = Some(chain_id);
            session.epoch += 1;
        });

        self.notifier.notify(Notification::info(
            "Wallet Connected",
            format!("Connected to {}", short_address(&account)),
        ));

        self.current()
    }

    /// Unconditionally resets to the disconnected state. Never fails.
    pub fn disconnect(&self) -> Session {
        self.session.send_modify(|session| {
            session.is_connected = false;
            session.account = None;
            session.chain_id = None;
        });

        self.notifier.notify(Notification::info(
            "Wallet Disconnected",
            "Your wallet has been disconnected",
        ));

        self.current()
    }

    fn on_accounts_changed(&self, accounts: Vec<Address>) {
        if accounts.is_empty() {
            self.disconnect();
            return;
        }

        // Account switches only move the account field; the network and the
        // connected flag are left as they were.
        self.session
            .send_modify(|session| session.account = Some(accounts[0]));
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Some(handle) = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

async fn account_watcher(
    manager: Weak<SessionManager>,
    mut events: broadcast::Receiver<Vec<Address>>,
) {
    loop {
        match events.recv().await {
            Ok(accounts) => {
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                manager.on_accounts_changed(accounts);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!("account watcher lagged, skipped {skipped} events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn short_address(address: &Address) -> String {
    let rendered = address.to_string();
    format!(
        "{}...{}",
        &rendered[..6],
        &rendered[rendered.len() - 4..]
    )
}
