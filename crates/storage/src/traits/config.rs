use async_trait::async_trait;
use watchtrack_core::FeatureFlags;

use crate::error::StorageError;

/// The `config/features` document.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Stored flags, `None` when the document has never been written.
    async fn get_feature_flags(&self) -> Result<Option<FeatureFlags>, StorageError>;

    async fn save_feature_flags(&self, flags: &FeatureFlags) -> Result<(), StorageError>;
}
