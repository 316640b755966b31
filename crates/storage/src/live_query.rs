//! Live query over one user's video collection.
//!
//! The first call to [`LiveQuery::next`] yields the current collection; every
//! later call waits for a change to that collection and yields the full list
//! again. Changes that arrive while a read is in flight are coalesced into
//! the next read.

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast;
use watchtrack_core::VideoProgress;

use crate::change_feed::CollectionChange;
use crate::error::StorageError;
use crate::traits::{ChangeSource, VideoStore};

pub struct LiveQuery<S> {
    store: Arc<S>,
    user_id: String,
    changes: broadcast::Receiver<CollectionChange>,
    delivered_initial: bool,
    last: Option<Vec<VideoProgress>>,
}

impl<S: VideoStore + ChangeSource> LiveQuery<S> {
    /// Subscribes before the first read so no change can slip between them.
    #[must_use]
    pub fn new(store: Arc<S>, user_id: &str) -> Self {
        let changes = store.subscribe_changes();
        Self { store, user_id: user_id.to_owned(), changes, delivered_initial: false, last: None }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Next full snapshot, `None` once the change feed has closed.
    pub async fn next(&mut self) -> Option<Result<Vec<VideoProgress>, StorageError>> {
        loop {
            if self.delivered_initial {
                if !self.wait_for_change().await {
                    return None;
                }
            } else {
                self.delivered_initial = true;
            }
            match self.store.list_videos(&self.user_id).await {
                Ok(videos) if self.last.as_ref() == Some(&videos) => {},
                Ok(videos) => {
                    self.last = Some(videos.clone());
                    return Some(Ok(videos));
                },
                Err(e) => {
                    self.last = None;
                    return Some(Err(e));
                },
            }
        }
    }

    async fn wait_for_change(&mut self) -> bool {
        loop {
            match self.changes.recv().await {
                Ok(change) if change.affects(&self.user_id) => break,
                Ok(_) => {},
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, user_id = %self.user_id, "live query lagged, re-reading");
                    break;
                },
                Err(RecvError::Closed) => return false,
            }
        }
        loop {
            match self.changes.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => {},
                Err(TryRecvError::Empty | TryRecvError::Closed) => return true,
            }
        }
    }
}
