//! Environment-driven configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CHANGE_POLL_MS, DEFAULT_DB_POOL_SIZE, DEFAULT_EMAIL_DOMAIN, DEFAULT_RECENT_LOGIN_SECS,
};

/// Parse an environment variable, falling back to `default`.
///
/// An unset variable is the expected case and stays silent. A set but
/// unparseable value is logged at warn level so typos do not go unnoticed.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    let Ok(raw) = std::env::var(var) else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(var, value = %raw, default = %default, "invalid env var value, using default");
        default
    })
}

/// Runtime settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub db_pool_size: u32,
    /// Poll interval for commits from other processes; `0` disables polling.
    pub change_poll_ms: u64,
    pub recent_login_secs: i64,
    pub email_domain: String,
}

impl AppConfig {
    /// Resolve settings from `WATCHTRACK_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let db_path = std::env::var("WATCHTRACK_DB_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map_or_else(default_db_path, PathBuf::from);
        let db_pool_size =
            env_parse_with_default("WATCHTRACK_DB_POOL_SIZE", DEFAULT_DB_POOL_SIZE).max(1);
        let change_poll_ms =
            env_parse_with_default("WATCHTRACK_CHANGE_POLL_MS", DEFAULT_CHANGE_POLL_MS);
        let recent_login_secs =
            env_parse_with_default("WATCHTRACK_RECENT_LOGIN_SECS", DEFAULT_RECENT_LOGIN_SECS);
        let email_domain = std::env::var("WATCHTRACK_EMAIL_DOMAIN")
            .ok()
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_EMAIL_DOMAIN.to_owned());
        Self { db_path, db_pool_size, change_poll_ms, recent_login_secs, email_domain }
    }

    #[must_use]
    pub const fn change_poll_interval(&self) -> Option<Duration> {
        if self.change_poll_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.change_poll_ms))
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            db_pool_size: DEFAULT_DB_POOL_SIZE,
            change_poll_ms: DEFAULT_CHANGE_POLL_MS,
            recent_login_secs: DEFAULT_RECENT_LOGIN_SECS,
            email_domain: DEFAULT_EMAIL_DOMAIN.to_owned(),
        }
    }
}

/// `<data_local_dir>/watchtrack/watchtrack.db`, or the working directory when
/// the platform has no data dir.
#[must_use]
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("watchtrack")
        .join("watchtrack.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_value() {
        let var = "WATCHTRACK_TEST_PARSE_VALID_41822";
        // SAFETY: test-unique variable name, no concurrent readers.
        unsafe { std::env::set_var(var, " 7 ") };
        let result: u32 = env_parse_with_default(var, 3);
        assert_eq!(result, 7);
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn invalid_value_falls_back() {
        let var = "WATCHTRACK_TEST_PARSE_INVALID_41823";
        unsafe { std::env::set_var(var, "seven") };
        let result: i64 = env_parse_with_default(var, 300);
        assert_eq!(result, 300);
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn missing_value_falls_back() {
        let result: u32 = env_parse_with_default("WATCHTRACK_TEST_PARSE_MISSING_41824", 4);
        assert_eq!(result, 4);
    }

    #[test]
    fn zero_poll_interval_disables_polling() {
        let config = AppConfig { change_poll_ms: 0, ..AppConfig::default() };
        assert_eq!(config.change_poll_interval(), None);
        assert_eq!(
            AppConfig::default().change_poll_interval(),
            Some(Duration::from_millis(DEFAULT_CHANGE_POLL_MS))
        );
    }

    #[test]
    fn default_db_path_ends_with_file_name() {
        let path = default_db_path();
        assert!(path.ends_with("watchtrack/watchtrack.db"));
    }
}
