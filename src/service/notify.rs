use std::sync::Arc;

use rmcp::schemars::{self, JsonSchema};
use serde::Serialize;
use tokio::sync::watch;

/// How long presentation keeps a notification on screen by default.
pub const DEFAULT_DISMISS_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Default,
    Destructive,
}

/// One user-visible status message.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
    /// Milliseconds after which the consumer should dismiss the message.
    pub auto_dismiss_ms: u64,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Default,
            auto_dismiss_ms: DEFAULT_DISMISS_MS,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
            auto_dismiss_ms: DEFAULT_DISMISS_MS,
        }
    }
}

/// Single-slot outbound notification stream, most recent wins.
///
/// Consumers either poll [`Notifier::latest`] or hold a watch receiver from
/// [`Notifier::subscribe`]; a new notification replaces an unread one.
#[derive(Clone)]
pub struct Notifier {
    slot: Arc<watch::Sender<Option<Notification>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(watch::Sender::new(None)),
        }
    }

    pub fn notify(&self, notification: Notification) {
        tracing::debug!(title = %notification.title, "notify: {}", notification.description);
        self.slot.send_replace(Some(notification));
    }

    pub fn latest(&self) -> Option<Notification> {
        self.slot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.slot.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
