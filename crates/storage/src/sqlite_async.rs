//! Async trait implementations for SQLite `Storage` via `spawn_blocking`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use watchtrack_core::{FeatureFlags, NewVideo, VideoProgress};

use crate::Storage;
use crate::batch::WriteBatch;
use crate::change_feed::CollectionChange;
use crate::error::StorageError;
use crate::traits::{AccountStore, ChangeSource, ConfigStore, VideoStore};
use crate::types::AccountRecord;

/// Helper: run a blocking closure on the tokio blocking pool.
async fn blocking<F, T>(f: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// Body-generating macro for async-to-blocking delegation.
///
/// Each argument is annotated with a capture kind:
/// - `@ref arg`  — `.clone()` a `&T`, pass as `&arg`
/// - `@str arg`  — `.to_owned()` a `&str`, pass as `&arg`
/// - `@val arg`  — move directly (Copy/owned types)
macro_rules! delegate {
    ($self:ident, $method:ident $(, @$kind:ident $arg:ident)*) => {{
        let s = $self.clone();
        $(delegate!(@capture $kind $arg);)*
        blocking(move || s.$method($(delegate!(@pass $kind $arg)),*)).await
    }};
    (@capture ref $arg:ident) => { let $arg = $arg.clone(); };
    (@capture str $arg:ident) => { let $arg = $arg.to_owned(); };
    (@capture val $arg:ident) => { };
    (@pass ref $arg:ident) => { &$arg };
    (@pass str $arg:ident) => { &$arg };
    (@pass val $arg:ident) => { $arg };
}

// ── VideoStore ───────────────────────────────────────────────────

#[async_trait]
impl VideoStore for Storage {
    async fn list_videos(&self, user_id: &str) -> Result<Vec<VideoProgress>, StorageError> {
        delegate!(self, list_videos, @str user_id)
    }
    async fn get_video(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<VideoProgress>, StorageError> {
        delegate!(self, get_video, @str user_id, @str id)
    }
    async fn find_video_by_name(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<Option<VideoProgress>, StorageError> {
        delegate!(self, find_video_by_name, @str user_id, @str name)
    }
    async fn create_video(&self, video: &NewVideo) -> Result<VideoProgress, StorageError> {
        delegate!(self, create_video, @ref video)
    }
    async fn create_video_with_id(
        &self,
        id: &str,
        video: &NewVideo,
    ) -> Result<VideoProgress, StorageError> {
        delegate!(self, create_video_with_id, @str id, @ref video)
    }
    async fn update_episode(
        &self,
        user_id: &str,
        id: &str,
        episode: u32,
    ) -> Result<(), StorageError> {
        delegate!(self, update_episode, @str user_id, @str id, @val episode)
    }
    async fn delete_video(&self, user_id: &str, id: &str) -> Result<bool, StorageError> {
        delegate!(self, delete_video, @str user_id, @str id)
    }
    async fn commit(&self, batch: &WriteBatch) -> Result<usize, StorageError> {
        delegate!(self, commit_batch, @ref batch)
    }
}

impl ChangeSource for Storage {
    fn subscribe_changes(&self) -> broadcast::Receiver<CollectionChange> {
        self.subscribe()
    }
}

// ── ConfigStore ──────────────────────────────────────────────────

#[async_trait]
impl ConfigStore for Storage {
    async fn get_feature_flags(&self) -> Result<Option<FeatureFlags>, StorageError> {
        delegate!(self, get_feature_flags)
    }
    async fn save_feature_flags(&self, flags: &FeatureFlags) -> Result<(), StorageError> {
        delegate!(self, save_feature_flags, @ref flags)
    }
}

// ── AccountStore ─────────────────────────────────────────────────

#[async_trait]
impl AccountStore for Storage {
    async fn insert_account(&self, account: &AccountRecord) -> Result<(), StorageError> {
        delegate!(self, insert_account, @ref account)
    }
    async fn get_account_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<AccountRecord>, StorageError> {
        delegate!(self, get_account_by_identifier, @str identifier)
    }
    async fn get_account(&self, uid: &str) -> Result<Option<AccountRecord>, StorageError> {
        delegate!(self, get_account, @str uid)
    }
    async fn update_password(
        &self,
        uid: &str,
        password_hash: &str,
        password_salt: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        delegate!(self, update_password, @str uid, @str password_hash, @str password_salt, @val updated_at)
    }
}
