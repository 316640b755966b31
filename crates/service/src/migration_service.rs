use std::sync::Arc;

use watchtrack_core::ValidationError;
use watchtrack_storage::{StorageBackend, VideoStore, WriteBatch};

use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MigrationOutcome {
    pub copied: usize,
}

/// Copies collections between identities, e.g. from an anonymous session to
/// a registered account.
pub struct MigrationService {
    storage: Arc<StorageBackend>,
}

impl MigrationService {
    #[must_use]
    pub const fn new(storage: Arc<StorageBackend>) -> Self {
        Self { storage }
    }

    /// Write a copy of every record of `source_uid` under `target_uid` in one
    /// atomic batch. Source records are left in place.
    pub async fn migrate_owner(
        &self,
        source_uid: &str,
        target_uid: &str,
    ) -> Result<MigrationOutcome, ServiceError> {
        let source_uid = source_uid.trim();
        let target_uid = target_uid.trim();
        if source_uid.is_empty() {
            return Err(ValidationError::MissingField { field: "source uid" }.into());
        }
        if target_uid.is_empty() {
            return Err(ValidationError::MissingField { field: "target uid" }.into());
        }
        if source_uid == target_uid {
            return Err(ValidationError::SameOwner.into());
        }

        let videos = self.storage.list_videos(source_uid).await?;
        if videos.is_empty() {
            tracing::info!(source_uid, "nothing to migrate");
            return Ok(MigrationOutcome::default());
        }
        let mut batch = WriteBatch::new();
        for video in &videos {
            batch.set(video.reowned(target_uid));
        }
        let copied = self.storage.commit(&batch).await?;
        tracing::info!(source_uid, target_uid, copied, "collection migrated");
        Ok(MigrationOutcome { copied })
    }
}
