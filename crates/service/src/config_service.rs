use std::sync::Arc;

use watchtrack_core::FeatureFlags;
use watchtrack_storage::{ConfigStore, StorageBackend};

use crate::error::ServiceError;

/// Reads and writes the `config/features` document.
pub struct ConfigService {
    storage: Arc<StorageBackend>,
}

impl ConfigService {
    #[must_use]
    pub const fn new(storage: Arc<StorageBackend>) -> Self {
        Self { storage }
    }

    /// Stored flags, or the defaults when the document does not exist.
    pub async fn load(&self) -> Result<FeatureFlags, ServiceError> {
        if let Some(flags) = self.storage.get_feature_flags().await? {
            return Ok(flags);
        }
        tracing::debug!("no feature document, using defaults");
        Ok(FeatureFlags::default())
    }

    pub async fn save(&self, flags: FeatureFlags) -> Result<(), ServiceError> {
        self.storage.save_feature_flags(&flags).await?;
        tracing::info!(is_delete_all_enabled = flags.is_delete_all_enabled, "feature flags saved");
        Ok(())
    }
}
