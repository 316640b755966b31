use async_trait::async_trait;
use tokio::sync::broadcast;
use watchtrack_core::{NewVideo, VideoProgress};

use crate::batch::WriteBatch;
use crate::change_feed::CollectionChange;
use crate::error::StorageError;

/// Operations on `users/{uid}/videos`.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Every record of a user, oldest first.
    async fn list_videos(&self, user_id: &str) -> Result<Vec<VideoProgress>, StorageError>;

    async fn get_video(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<VideoProgress>, StorageError>;

    /// First record whose name matches case-insensitively.
    async fn find_video_by_name(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<Option<VideoProgress>, StorageError>;

    /// Insert a record. The store assigns the id.
    async fn create_video(&self, video: &NewVideo) -> Result<VideoProgress, StorageError>;

    /// Write a record under an id the caller allocated, replacing any record
    /// already stored under that id.
    async fn create_video_with_id(
        &self,
        id: &str,
        video: &NewVideo,
    ) -> Result<VideoProgress, StorageError>;

    /// Set the episode field. Fails with `NotFound` when the record is missing.
    async fn update_episode(
        &self,
        user_id: &str,
        id: &str,
        episode: u32,
    ) -> Result<(), StorageError>;

    /// Delete one record. Returns `true` if a record was removed.
    async fn delete_video(&self, user_id: &str, id: &str) -> Result<bool, StorageError>;

    /// Apply a batch atomically. Returns the number of operations applied.
    async fn commit(&self, batch: &WriteBatch) -> Result<usize, StorageError>;
}

/// Source of collection change notifications.
pub trait ChangeSource: Send + Sync {
    fn subscribe_changes(&self) -> broadcast::Receiver<CollectionChange>;
}
