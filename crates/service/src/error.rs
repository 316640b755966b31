//! Typed error enum for the service layer.
//!
//! Unifies validation, interchange, storage and identity failures so callers
//! can match on the failure mode and render a message for the user.

use thiserror::Error;
use watchtrack_core::{InterchangeError, ValidationError};
use watchtrack_storage::StorageError;

use crate::identity::IdentityError;

/// Service-layer error.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller input rejected before reaching the store.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Import/export document problem.
    #[error("interchange: {0}")]
    Interchange(#[from] InterchangeError),

    /// Storage operation failed (unavailable, not found, database, etc.).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Identity provider refused or failed.
    #[error("identity: {0}")]
    Identity(#[from] IdentityError),

    /// Operation switched off by the `config/features` document.
    #[error("feature disabled: {0}")]
    FeatureDisabled(&'static str),
}

impl ServiceError {
    /// Whether this error is likely transient (worth retrying).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) | Self::Identity(IdentityError::Storage(e)) => e.is_transient(),
            _ => false,
        }
    }

    /// Whether this error represents a not-found condition.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(StorageError::NotFound { .. }))
    }

    /// Message suitable for showing to the person at the keyboard.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Interchange(InterchangeError::NothingToExport) => {
                "There is no progress to export yet.".to_owned()
            },
            Self::Interchange(e) => format!("The import file could not be read: {e}"),
            Self::Storage(e) if e.is_transient() => {
                "The store is unreachable right now. Please try again.".to_owned()
            },
            Self::Storage(StorageError::NotFound { .. }) => {
                "That video no longer exists.".to_owned()
            },
            Self::Storage(_) => "Something went wrong while saving. Please try again.".to_owned(),
            Self::Identity(e) => e.user_message().to_owned(),
            Self::FeatureDisabled(_) => "This action is currently disabled.".to_owned(),
        }
    }
}
