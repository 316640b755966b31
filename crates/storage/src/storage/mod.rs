//! `SQLite` storage implementation
//!
//! All methods are synchronous; [`crate::sqlite_async`] moves them onto the
//! blocking pool behind the async store traits.

mod accounts;
mod documents;
mod videos;
mod watcher;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use rusqlite::types::Type;
use tokio::sync::broadcast;
use watchtrack_core::constants::DEFAULT_CHANGE_POLL_MS;

use self::watcher::ExternalChangeWatcher;
use crate::change_feed::{ChangeFeed, CollectionChange};
use crate::error::StorageError;
use crate::migrations;

/// Type alias for pooled connection
pub(crate) type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Main storage struct wrapping `SQLite` connection pool
#[derive(Clone, Debug)]
pub struct Storage {
    pub(crate) pool: Pool<SqliteConnectionManager>,
    pub(crate) changes: ChangeFeed,
    external: Option<Arc<ExternalChangeWatcher>>,
}

/// Get a connection from the pool
pub(crate) fn get_conn(pool: &Pool<SqliteConnectionManager>) -> Result<PooledConn, StorageError> {
    Ok(pool.get()?)
}

/// Parse an RFC 3339 column, surfacing bad values as a conversion failure.
pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Per-connection settings for concurrent access
fn init_connection(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA busy_timeout = 30000;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;
    Ok(())
}

impl Storage {
    /// Open (or create) the database at `db_path` and run migrations.
    ///
    /// Commits from other processes are picked up at the default poll
    /// interval once something subscribes to changes.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built or a migration fails.
    pub fn new(db_path: &Path, pool_size: u32) -> Result<Self, StorageError> {
        Self::open(db_path, pool_size, Some(Duration::from_millis(DEFAULT_CHANGE_POLL_MS)))
    }

    /// Like [`Storage::new`] with an explicit poll interval; `None` limits
    /// the change feed to writes made through this storage.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built or a migration fails.
    pub fn open(
        db_path: &Path,
        pool_size: u32,
        change_poll: Option<Duration>,
    ) -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::file(db_path).with_init(init_connection);
        let pool = Pool::builder().max_size(pool_size.max(1)).build(manager)?;

        // Run migrations on first connection
        let conn = pool.get()?;
        migrations::run_migrations(&conn).map_err(|e| StorageError::Migration(e.to_string()))?;
        drop(conn);

        tracing::info!(pool_size, path = %db_path.display(), "Storage initialized with connection pool");

        let external = change_poll.map(|every| Arc::new(ExternalChangeWatcher::new(db_path, every)));
        Ok(Self { pool, changes: ChangeFeed::new(), external })
    }

    /// Change feed shared by all clones of this storage.
    #[must_use]
    pub fn changes(&self) -> &ChangeFeed {
        &self.changes
    }

    /// Subscribe to the change feed, starting external polling if enabled.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CollectionChange> {
        let rx = self.changes.subscribe();
        if let Some(external) = &self.external {
            external.ensure_started(&self.changes);
        }
        rx
    }
}
