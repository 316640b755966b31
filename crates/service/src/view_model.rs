//! Reactive view over one user's collection.
//!
//! A spawned task follows the store's live query and publishes each full
//! snapshot on a `watch` channel. Local intents patch the snapshot at once
//! and queue the write on the dispatcher, which applies writes in the order
//! they were made; the next store snapshot replaces whatever the patch
//! guessed.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use watchtrack_core::{FeatureFlags, FilteredVideos, VideoProgress, filter_videos, validate_name};
use watchtrack_storage::{LiveQuery, StorageBackend};

use crate::dispatcher::{MutationDispatcher, PendingWrite};
use crate::error::ServiceError;
use crate::events::{AppEvent, ErrorChannel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSnapshot {
    pub videos: Vec<VideoProgress>,
    /// True until the first snapshot or the first error.
    pub is_loading: bool,
}

impl Default for CollectionSnapshot {
    fn default() -> Self {
        Self { videos: Vec::new(), is_loading: true }
    }
}

pub struct CollectionViewModel {
    dispatcher: MutationDispatcher,
    state: Arc<watch::Sender<CollectionSnapshot>>,
    subscription: JoinHandle<()>,
}

impl CollectionViewModel {
    /// Start following the dispatcher's user. Must be called inside a tokio
    /// runtime.
    #[must_use]
    pub fn new(dispatcher: MutationDispatcher) -> Self {
        let (tx, _) = watch::channel(CollectionSnapshot::default());
        let state = Arc::new(tx);
        let query = LiveQuery::new(Arc::clone(dispatcher.storage()), dispatcher.user_id());
        let subscription =
            tokio::spawn(follow(query, Arc::clone(&state), dispatcher.errors().clone()));
        Self { dispatcher, state, subscription }
    }

    #[must_use]
    pub const fn dispatcher(&self) -> &MutationDispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn flags(&self) -> FeatureFlags {
        self.dispatcher.flags()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CollectionSnapshot> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> CollectionSnapshot {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn videos(&self) -> Vec<VideoProgress> {
        self.state.borrow().videos.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Current records matching `search`, sorted by name.
    #[must_use]
    pub fn filtered(&self, search: &str) -> FilteredVideos {
        filter_videos(&self.state.borrow().videos, search)
    }

    /// Wait for the first snapshot or error.
    pub async fn wait_until_loaded(&self) -> CollectionSnapshot {
        self.wait_for(|s| !s.is_loading).await
    }

    /// Wait until the snapshot satisfies `predicate`.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&CollectionSnapshot) -> bool,
    ) -> CollectionSnapshot {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|s| predicate(s)).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        }
    }

    /// Add a show or overwrite its episode, optimistically.
    ///
    /// A new row gets its final id here, so intents on it can be queued
    /// before the store has confirmed it.
    pub fn add(&self, name: &str, episode: u32) -> Result<PendingWrite, ServiceError> {
        let name = validate_name(name)?;
        let user_id = self.dispatcher.user_id().to_owned();
        let id = uuid::Uuid::new_v4().to_string();
        self.state.send_modify(|s| {
            if let Some(existing) = s.videos.iter_mut().find(|v| v.has_name(&name)) {
                existing.episode = episode;
            } else {
                s.videos.push(VideoProgress {
                    id: id.clone(),
                    name: name.clone(),
                    episode,
                    user_id,
                    created_at: Utc::now(),
                });
            }
        });
        Ok(self.dispatcher.spawn_add_or_update_with_id(&id, &name, episode))
    }

    /// `None` when the id is not in the current snapshot.
    pub fn increment(&self, id: &str) -> Option<PendingWrite> {
        let next = self.find(id)?.next_episode();
        Some(self.set_episode(id, next))
    }

    /// `None` when the id is unknown or the counter is already at zero.
    pub fn decrement(&self, id: &str) -> Option<PendingWrite> {
        let previous = self.find(id)?.previous_episode()?;
        Some(self.set_episode(id, previous))
    }

    pub fn set_episode(&self, id: &str, episode: u32) -> PendingWrite {
        self.state.send_modify(|s| {
            if let Some(video) = s.videos.iter_mut().find(|v| v.id == id) {
                video.episode = episode;
            }
        });
        self.dispatcher.spawn_update_episode(id, episode)
    }

    pub fn delete(&self, id: &str) -> PendingWrite {
        self.state.send_modify(|s| s.videos.retain(|v| v.id != id));
        self.dispatcher.spawn_delete(id)
    }

    fn find(&self, id: &str) -> Option<VideoProgress> {
        self.state.borrow().videos.iter().find(|v| v.id == id).cloned()
    }
}

impl Drop for CollectionViewModel {
    fn drop(&mut self) {
        self.subscription.abort();
    }
}

async fn follow(
    mut query: LiveQuery<StorageBackend>,
    state: Arc<watch::Sender<CollectionSnapshot>>,
    errors: ErrorChannel,
) {
    while let Some(result) = query.next().await {
        match result {
            Ok(videos) => state.send_modify(|s| {
                s.videos = videos;
                s.is_loading = false;
            }),
            Err(e) => {
                errors.publish(AppEvent::SubscriptionFailed {
                    user_id: query.user_id().to_owned(),
                    message: e.to_string(),
                });
                state.send_modify(|s| s.is_loading = false);
            },
        }
    }
    tracing::debug!(user_id = %query.user_id(), "live query closed");
}
