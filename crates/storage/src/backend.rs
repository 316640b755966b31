//! Unified storage backend with enum dispatch.

#[cfg(feature = "sqlite")]
use std::path::Path;
#[cfg(feature = "sqlite")]
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use watchtrack_core::{FeatureFlags, NewVideo, VideoProgress};

use crate::batch::WriteBatch;
use crate::change_feed::CollectionChange;
use crate::error::StorageError;
use crate::memory::MemoryStore;
use crate::traits::{AccountStore, ChangeSource, ConfigStore, VideoStore};
use crate::types::AccountRecord;

macro_rules! dispatch {
    ($self:expr, $trait:path, $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self {
            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite(s) => <crate::Storage as $trait>::$method(s, $($arg),*).await,
            StorageBackend::Memory(s) => <MemoryStore as $trait>::$method(s, $($arg),*).await,
        }
    };
}

#[derive(Clone, Debug)]
pub enum StorageBackend {
    #[cfg(feature = "sqlite")]
    Sqlite(crate::Storage),
    Memory(MemoryStore),
}

impl StorageBackend {
    /// # Errors
    /// Returns error if the database cannot be opened or migrated.
    #[cfg(feature = "sqlite")]
    pub fn new_sqlite(db_path: &Path, pool_size: u32) -> Result<Self, StorageError> {
        Ok(Self::Sqlite(crate::Storage::new(db_path, pool_size)?))
    }

    /// # Errors
    /// Returns error if the database cannot be opened or migrated.
    #[cfg(feature = "sqlite")]
    pub fn open_sqlite(
        db_path: &Path,
        pool_size: u32,
        change_poll: Option<Duration>,
    ) -> Result<Self, StorageError> {
        Ok(Self::Sqlite(crate::Storage::open(db_path, pool_size, change_poll)?))
    }

    #[must_use]
    pub fn new_memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    /// The in-memory store, for fault injection in tests.
    #[must_use]
    pub const fn as_memory(&self) -> Option<&MemoryStore> {
        match self {
            Self::Memory(s) => Some(s),
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => None,
        }
    }
}

// ── VideoStore ───────────────────────────────────────────────────

#[async_trait]
impl VideoStore for StorageBackend {
    async fn list_videos(&self, user_id: &str) -> Result<Vec<VideoProgress>, StorageError> {
        dispatch!(self, VideoStore, list_videos(user_id))
    }

    async fn get_video(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<VideoProgress>, StorageError> {
        dispatch!(self, VideoStore, get_video(user_id, id))
    }

    async fn find_video_by_name(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<Option<VideoProgress>, StorageError> {
        dispatch!(self, VideoStore, find_video_by_name(user_id, name))
    }

    async fn create_video(&self, video: &NewVideo) -> Result<VideoProgress, StorageError> {
        dispatch!(self, VideoStore, create_video(video))
    }

    async fn create_video_with_id(
        &self,
        id: &str,
        video: &NewVideo,
    ) -> Result<VideoProgress, StorageError> {
        dispatch!(self, VideoStore, create_video_with_id(id, video))
    }

    async fn update_episode(
        &self,
        user_id: &str,
        id: &str,
        episode: u32,
    ) -> Result<(), StorageError> {
        dispatch!(self, VideoStore, update_episode(user_id, id, episode))
    }

    async fn delete_video(&self, user_id: &str, id: &str) -> Result<bool, StorageError> {
        dispatch!(self, VideoStore, delete_video(user_id, id))
    }

    async fn commit(&self, batch: &WriteBatch) -> Result<usize, StorageError> {
        dispatch!(self, VideoStore, commit(batch))
    }
}

impl ChangeSource for StorageBackend {
    fn subscribe_changes(&self) -> broadcast::Receiver<CollectionChange> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(s) => s.subscribe_changes(),
            Self::Memory(s) => s.subscribe_changes(),
        }
    }
}

// ── ConfigStore ──────────────────────────────────────────────────

#[async_trait]
impl ConfigStore for StorageBackend {
    async fn get_feature_flags(&self) -> Result<Option<FeatureFlags>, StorageError> {
        dispatch!(self, ConfigStore, get_feature_flags())
    }

    async fn save_feature_flags(&self, flags: &FeatureFlags) -> Result<(), StorageError> {
        dispatch!(self, ConfigStore, save_feature_flags(flags))
    }
}

// ── AccountStore ─────────────────────────────────────────────────

#[async_trait]
impl AccountStore for StorageBackend {
    async fn insert_account(&self, account: &AccountRecord) -> Result<(), StorageError> {
        dispatch!(self, AccountStore, insert_account(account))
    }

    async fn get_account_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<AccountRecord>, StorageError> {
        dispatch!(self, AccountStore, get_account_by_identifier(identifier))
    }

    async fn get_account(&self, uid: &str) -> Result<Option<AccountRecord>, StorageError> {
        dispatch!(self, AccountStore, get_account(uid))
    }

    async fn update_password(
        &self,
        uid: &str,
        password_hash: &str,
        password_salt: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        dispatch!(self, AccountStore, update_password(uid, password_hash, password_salt, updated_at))
    }
}
