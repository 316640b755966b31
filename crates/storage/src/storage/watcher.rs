//! Detects commits made through other connections to the same database file.
//!
//! `PRAGMA data_version` on a connection changes whenever any other
//! connection commits, including connections in other processes. A dedicated
//! connection polls it and turns every change into an external collection
//! change on the feed.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use rusqlite::Connection;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::change_feed::ChangeFeed;

#[derive(Debug)]
pub(crate) struct ExternalChangeWatcher {
    db_path: PathBuf,
    interval: Duration,
    task: OnceLock<JoinHandle<()>>,
}

fn open_watch_connection(db_path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(conn)
}

fn data_version(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("PRAGMA data_version", [], |row| row.get(0))
}

impl ExternalChangeWatcher {
    pub(crate) fn new(db_path: &Path, interval: Duration) -> Self {
        Self { db_path: db_path.to_path_buf(), interval, task: OnceLock::new() }
    }

    /// Start polling on the current runtime, once.
    ///
    /// The baseline version is read before returning, so a caller that
    /// subscribes and then reads cannot miss a commit in between.
    pub(crate) fn ensure_started(&self, feed: &ChangeFeed) {
        if self.task.get().is_some() {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no tokio runtime, external change polling not started");
            return;
        };
        let started = open_watch_connection(&self.db_path)
            .and_then(|conn| data_version(&conn).map(|version| (conn, version)));
        let (conn, baseline) = match started {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(error = %e, path = %self.db_path.display(), "external change polling unavailable");
                return;
            },
        };
        let handle = runtime.spawn(poll(conn, baseline, self.interval, feed.clone()));
        if let Err(duplicate) = self.task.set(handle) {
            duplicate.abort();
        }
    }
}

impl Drop for ExternalChangeWatcher {
    fn drop(&mut self) {
        if let Some(task) = self.task.get() {
            task.abort();
        }
    }
}

async fn poll(mut conn: Connection, mut seen: i64, every: Duration, feed: ChangeFeed) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let read = tokio::task::spawn_blocking(move || {
            let version = data_version(&conn);
            (conn, version)
        })
        .await;
        let version = match read {
            Ok((returned, version)) => {
                conn = returned;
                version
            },
            Err(e) => {
                tracing::warn!(error = %e, "external change poll task failed, stopping");
                return;
            },
        };
        match version {
            Ok(version) if version != seen => {
                tracing::debug!(version, "database changed by another connection");
                seen = version;
                feed.publish_external();
            },
            Ok(_) => {},
            Err(e) => tracing::warn!(error = %e, "external change poll failed"),
        }
    }
}
