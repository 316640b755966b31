//! Storage types shared across modules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A local identity-provider account.
///
/// Hash and salt are opaque to the store; the identity provider owns the
/// hashing scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub uid: String,
    pub identifier: String,
    pub password_hash: String,
    pub password_salt: String,
    pub created_at: DateTime<Utc>,
    pub password_updated_at: DateTime<Utc>,
}
