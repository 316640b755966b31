//! Shared constants for watchtrack.

/// Path of the feature-flag document.
pub const FEATURES_DOCUMENT_PATH: &str = "config/features";

/// Suggested filename for exported progress.
pub const EXPORT_FILE_NAME: &str = "watchtrack_data.json";

/// Minimum password length accepted at sign-up and password change.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum phone number length accepted at sign-up and sign-in.
pub const MIN_PHONE_LEN: usize = 10;

/// Domain appended to phone numbers to build a login identifier.
pub const DEFAULT_EMAIL_DOMAIN: &str = "watchtrack.app";

/// Capacity of the process-wide error broadcast channel.
pub const ERROR_CHANNEL_CAPACITY: usize = 100;

/// Capacity of the store change feed.
pub const CHANGE_FEED_CAPACITY: usize = 256;

/// Default SQLite pool size.
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

/// How often the SQLite backend checks for commits made by other processes.
pub const DEFAULT_CHANGE_POLL_MS: u64 = 250;

/// Sessions older than this must re-authenticate before sensitive operations.
pub const DEFAULT_RECENT_LOGIN_SECS: i64 = 300;
