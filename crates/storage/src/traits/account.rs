use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::types::AccountRecord;

/// Accounts backing the local identity provider.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert an account. Fails with `Duplicate` if the identifier is taken.
    async fn insert_account(&self, account: &AccountRecord) -> Result<(), StorageError>;

    async fn get_account_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<AccountRecord>, StorageError>;

    async fn get_account(&self, uid: &str) -> Result<Option<AccountRecord>, StorageError>;

    /// Replace the password hash. Fails with `NotFound` for an unknown uid.
    async fn update_password(
        &self,
        uid: &str,
        password_hash: &str,
        password_salt: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;
}
