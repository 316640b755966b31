use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};

use super::{Storage, get_conn, parse_timestamp};
use crate::error::StorageError;
use crate::types::AccountRecord;

const ACCOUNT_COLUMNS: &str =
    "uid, identifier, password_hash, password_salt, created_at, password_updated_at";

fn row_to_account(row: &Row<'_>) -> rusqlite::Result<AccountRecord> {
    let created_at: String = row.get(4)?;
    let password_updated_at: String = row.get(5)?;
    Ok(AccountRecord {
        uid: row.get(0)?,
        identifier: row.get(1)?,
        password_hash: row.get(2)?,
        password_salt: row.get(3)?,
        created_at: parse_timestamp(4, &created_at)?,
        password_updated_at: parse_timestamp(5, &password_updated_at)?,
    })
}

impl Storage {
    /// # Errors
    /// Returns `Duplicate` when the identifier is already registered.
    pub fn insert_account(&self, account: &AccountRecord) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            &format!("INSERT INTO accounts ({ACCOUNT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                account.uid,
                account.identifier,
                account.password_hash,
                account.password_salt,
                account.created_at.to_rfc3339(),
                account.password_updated_at.to_rfc3339(),
            ],
        )?;
        tracing::info!(uid = %account.uid, "account created");
        Ok(())
    }

    /// # Errors
    /// Returns error if the query fails.
    pub fn get_account_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<AccountRecord>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let account = conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE identifier = ?1"),
                params![identifier],
                row_to_account,
            )
            .optional()?;
        Ok(account)
    }

    /// # Errors
    /// Returns error if the query fails.
    pub fn get_account(&self, uid: &str) -> Result<Option<AccountRecord>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let account = conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE uid = ?1"),
                params![uid],
                row_to_account,
            )
            .optional()?;
        Ok(account)
    }

    /// # Errors
    /// Returns `NotFound` for an unknown uid.
    pub fn update_password(
        &self,
        uid: &str,
        password_hash: &str,
        password_salt: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        let changed = conn.execute(
            "UPDATE accounts SET password_hash = ?1, password_salt = ?2, password_updated_at = ?3
               WHERE uid = ?4",
            params![password_hash, password_salt, updated_at.to_rfc3339(), uid],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound { entity: "account", id: uid.to_owned() });
        }
        Ok(())
    }
}
