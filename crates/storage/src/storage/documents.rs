use chrono::Utc;
use rusqlite::{OptionalExtension, params};
use watchtrack_core::FeatureFlags;
use watchtrack_core::constants::FEATURES_DOCUMENT_PATH;

use super::{Storage, get_conn};
use crate::error::StorageError;

impl Storage {
    /// Raw JSON body of the document at `path`.
    ///
    /// # Errors
    /// Returns error if the query fails or the body is not JSON.
    pub fn get_document(&self, path: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let body: Option<String> = conn
            .query_row("SELECT body FROM documents WHERE path = ?1", params![path], |row| {
                row.get(0)
            })
            .optional()?;
        body.map(|b| serde_json::from_str(&b)).transpose().map_err(StorageError::from)
    }

    /// # Errors
    /// Returns error if the write fails.
    pub fn set_document(&self, path: &str, body: &serde_json::Value) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO documents (path, body, updated_at) VALUES (?1, ?2, ?3)
               ON CONFLICT(path) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
            params![path, serde_json::to_string(body)?, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// # Errors
    /// Returns error if the document exists but does not decode.
    pub fn get_feature_flags(&self) -> Result<Option<FeatureFlags>, StorageError> {
        self.get_document(FEATURES_DOCUMENT_PATH)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(StorageError::from)
    }

    /// # Errors
    /// Returns error if the write fails.
    pub fn save_feature_flags(&self, flags: &FeatureFlags) -> Result<(), StorageError> {
        self.set_document(FEATURES_DOCUMENT_PATH, &serde_json::to_value(flags)?)
    }
}
