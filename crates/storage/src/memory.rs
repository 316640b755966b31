//! In-process document store.
//!
//! Mirrors the SQLite backend's semantics (ordering, batch atomicity, change
//! notification) without touching disk. Fault injection lets tests simulate
//! an unreachable backend or a rejected batch commit.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use watchtrack_core::{FeatureFlags, NewVideo, VideoProgress, name_key};

use crate::batch::{WriteBatch, WriteOp};
use crate::change_feed::{ChangeFeed, CollectionChange};
use crate::error::StorageError;
use crate::traits::{AccountStore, ChangeSource, ConfigStore, VideoStore};
use crate::types::AccountRecord;

#[derive(Debug, Default, Clone)]
struct MemoryState {
    /// Per-user collections in insertion (creation) order.
    videos: HashMap<String, Vec<VideoProgress>>,
    feature_flags: Option<FeatureFlags>,
    accounts: HashMap<String, AccountRecord>,
}

impl MemoryState {
    fn apply(&mut self, op: &WriteOp) -> Result<(), StorageError> {
        match op {
            WriteOp::Set { id, video } => {
                let collection = self.videos.entry(video.user_id.clone()).or_default();
                let record = video.clone().into_video(id.clone());
                if let Some(existing) = collection.iter_mut().find(|v| v.id == *id) {
                    *existing = record;
                } else {
                    collection.push(record);
                }
            },
            WriteOp::UpdateEpisode { user_id, id, episode } => {
                let record = self
                    .videos
                    .get_mut(user_id)
                    .and_then(|c| c.iter_mut().find(|v| v.id == *id))
                    .ok_or_else(|| StorageError::video_not_found(id))?;
                record.episode = *episode;
            },
            WriteOp::Delete { user_id, id } => {
                if let Some(collection) = self.videos.get_mut(user_id) {
                    collection.retain(|v| v.id != *id);
                }
            },
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    offline: Arc<AtomicBool>,
    reject_commits: Arc<AtomicBool>,
    changes: ChangeFeed,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// While set, batch commits fail with `Unavailable` and leave data untouched.
    pub fn set_reject_commits(&self, reject: bool) {
        self.reject_commits.store(reject, Ordering::SeqCst);
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store is offline".to_owned()));
        }
        self.state
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_owned()))
    }
}

#[async_trait]
impl VideoStore for MemoryStore {
    async fn list_videos(&self, user_id: &str) -> Result<Vec<VideoProgress>, StorageError> {
        let state = self.state()?;
        Ok(state.videos.get(user_id).cloned().unwrap_or_default())
    }

    async fn get_video(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<VideoProgress>, StorageError> {
        let state = self.state()?;
        Ok(state.videos.get(user_id).and_then(|c| c.iter().find(|v| v.id == id)).cloned())
    }

    async fn find_video_by_name(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<Option<VideoProgress>, StorageError> {
        let key = name_key(name);
        let state = self.state()?;
        Ok(state
            .videos
            .get(user_id)
            .and_then(|c| c.iter().find(|v| name_key(&v.name) == key))
            .cloned())
    }

    async fn create_video(&self, video: &NewVideo) -> Result<VideoProgress, StorageError> {
        self.create_video_with_id(&uuid::Uuid::new_v4().to_string(), video).await
    }

    async fn create_video_with_id(
        &self,
        id: &str,
        video: &NewVideo,
    ) -> Result<VideoProgress, StorageError> {
        self.state()?.apply(&WriteOp::Set { id: id.to_owned(), video: video.clone() })?;
        self.changes.publish(&video.user_id);
        Ok(video.clone().into_video(id.to_owned()))
    }

    async fn update_episode(
        &self,
        user_id: &str,
        id: &str,
        episode: u32,
    ) -> Result<(), StorageError> {
        self.state()?.apply(&WriteOp::UpdateEpisode {
            user_id: user_id.to_owned(),
            id: id.to_owned(),
            episode,
        })?;
        self.changes.publish(user_id);
        Ok(())
    }

    async fn delete_video(&self, user_id: &str, id: &str) -> Result<bool, StorageError> {
        let removed = {
            let mut state = self.state()?;
            let Some(collection) = state.videos.get_mut(user_id) else {
                return Ok(false);
            };
            let before = collection.len();
            collection.retain(|v| v.id != id);
            collection.len() != before
        };
        if removed {
            self.changes.publish(user_id);
        }
        Ok(removed)
    }

    async fn commit(&self, batch: &WriteBatch) -> Result<usize, StorageError> {
        if batch.is_empty() {
            return Ok(0);
        }
        {
            let mut state = self.state()?;
            if self.reject_commits.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("batch commit rejected".to_owned()));
            }
            let mut staged = state.clone();
            for op in batch.ops() {
                staged.apply(op)?;
            }
            *state = staged;
        }
        self.changes.publish_all(&batch.affected_users());
        Ok(batch.len())
    }
}

impl ChangeSource for MemoryStore {
    fn subscribe_changes(&self) -> broadcast::Receiver<CollectionChange> {
        self.changes.subscribe()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get_feature_flags(&self) -> Result<Option<FeatureFlags>, StorageError> {
        Ok(self.state()?.feature_flags)
    }

    async fn save_feature_flags(&self, flags: &FeatureFlags) -> Result<(), StorageError> {
        self.state()?.feature_flags = Some(*flags);
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert_account(&self, account: &AccountRecord) -> Result<(), StorageError> {
        let mut state = self.state()?;
        if state.accounts.values().any(|a| a.identifier == account.identifier) {
            return Err(StorageError::Duplicate(format!(
                "identifier already registered: {}",
                account.identifier
            )));
        }
        state.accounts.insert(account.uid.clone(), account.clone());
        Ok(())
    }

    async fn get_account_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<AccountRecord>, StorageError> {
        let state = self.state()?;
        Ok(state.accounts.values().find(|a| a.identifier == identifier).cloned())
    }

    async fn get_account(&self, uid: &str) -> Result<Option<AccountRecord>, StorageError> {
        Ok(self.state()?.accounts.get(uid).cloned())
    }

    async fn update_password(
        &self,
        uid: &str,
        password_hash: &str,
        password_salt: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut state = self.state()?;
        let account = state
            .accounts
            .get_mut(uid)
            .ok_or_else(|| StorageError::NotFound { entity: "account", id: uid.to_owned() })?;
        password_hash.clone_into(&mut account.password_hash);
        password_salt.clone_into(&mut account.password_salt);
        account.password_updated_at = updated_at;
        Ok(())
    }
}
