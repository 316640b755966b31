//! Process-wide channel for failures that have no awaiting caller.
//!
//! Detached writes and live-query subscriptions report here; presentation
//! code subscribes and shows the message. Nothing on this channel is fatal.

use tokio::sync::broadcast;
use watchtrack_core::constants::ERROR_CHANNEL_CAPACITY;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A fire-and-forget mutation failed.
    WriteFailed { operation: &'static str, message: String },
    /// A live query could not deliver a snapshot.
    SubscriptionFailed { user_id: String, message: String },
}

impl AppEvent {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::WriteFailed { message, .. } | Self::SubscriptionFailed { message, .. } => message,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorChannel {
    tx: broadcast::Sender<AppEvent>,
}

impl Default for ErrorChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorChannel {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(ERROR_CHANNEL_CAPACITY);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// Log and broadcast. Having no subscribers is fine.
    pub fn publish(&self, event: AppEvent) {
        tracing::warn!(event = ?event, "background failure");
        if self.tx.send(event).is_err() {
            tracing::debug!("no error channel subscribers");
        }
    }

    pub(crate) fn write_failed(&self, operation: &'static str, message: String) {
        self.publish(AppEvent::WriteFailed { operation, message });
    }
}
