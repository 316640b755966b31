//! Change notifications for live queries.

use tokio::sync::broadcast;
use watchtrack_core::constants::CHANGE_FEED_CAPACITY;

/// A video collection changed. Subscribers re-read the collection.
///
/// `user_id` is `None` when the writer is outside this process and the
/// affected collection is unknown; every subscriber must re-read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionChange {
    pub user_id: Option<String>,
}

impl CollectionChange {
    #[must_use]
    pub fn affects(&self, user_id: &str) -> bool {
        self.user_id.as_deref().is_none_or(|changed| changed == user_id)
    }
}

/// Broadcast sender shared by a backend and all clones of it.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<CollectionChange>,
}

impl ChangeFeed {
    #[must_use]
    pub fn new() -> Self {
        // Initial receiver dropped - subscribers use subscribe()
        let (tx, _initial_rx) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CollectionChange> {
        self.tx.subscribe()
    }

    /// Notify subscribers. Having no subscribers is normal.
    pub fn publish(&self, user_id: &str) {
        self.send(CollectionChange { user_id: Some(user_id.to_owned()) });
    }

    pub fn publish_all<'a>(&self, user_ids: impl IntoIterator<Item = &'a String>) {
        for user_id in user_ids {
            self.publish(user_id);
        }
    }

    /// Another process committed; which collections changed is unknown.
    pub fn publish_external(&self) {
        self.send(CollectionChange { user_id: None });
    }

    fn send(&self, change: CollectionChange) {
        let delivered = self.tx.send(change).unwrap_or(0);
        tracing::trace!(delivered, "collection change published");
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}
