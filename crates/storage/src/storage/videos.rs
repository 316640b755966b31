use chrono::SecondsFormat;
use rusqlite::{OptionalExtension, Row, params};
use watchtrack_core::{NewVideo, VideoProgress, name_key};

use super::{Storage, get_conn, parse_timestamp};
use crate::batch::{WriteBatch, WriteOp};
use crate::error::StorageError;

const VIDEO_COLUMNS: &str = "id, user_id, name, episode, created_at";

fn row_to_video(row: &Row<'_>) -> rusqlite::Result<VideoProgress> {
    let created_at: String = row.get(4)?;
    Ok(VideoProgress {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        episode: row.get(3)?,
        created_at: parse_timestamp(4, &created_at)?,
    })
}

fn insert_video(conn: &rusqlite::Connection, id: &str, video: &NewVideo) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO videos (id, user_id, name, name_key, episode, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            video.user_id,
            video.name,
            name_key(&video.name),
            video.episode,
            video.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        ],
    )?;
    Ok(())
}

impl Storage {
    /// List a user's videos, oldest first.
    ///
    /// # Errors
    /// Returns error if the query fails or a row cannot be decoded.
    pub fn list_videos(&self, user_id: &str) -> Result<Vec<VideoProgress>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE user_id = ?1 ORDER BY created_at, id"
        ))?;
        let videos = stmt
            .query_map(params![user_id], row_to_video)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(videos)
    }

    /// # Errors
    /// Returns error if the query fails.
    pub fn get_video(&self, user_id: &str, id: &str) -> Result<Option<VideoProgress>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let video = conn
            .query_row(
                &format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE user_id = ?1 AND id = ?2"),
                params![user_id, id],
                row_to_video,
            )
            .optional()?;
        Ok(video)
    }

    /// # Errors
    /// Returns error if the query fails.
    pub fn find_video_by_name(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<Option<VideoProgress>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let video = conn
            .query_row(
                &format!(
                    "SELECT {VIDEO_COLUMNS} FROM videos
                       WHERE user_id = ?1 AND name_key = ?2
                       ORDER BY created_at, id LIMIT 1"
                ),
                params![user_id, name_key(name)],
                row_to_video,
            )
            .optional()?;
        Ok(video)
    }

    /// # Errors
    /// Returns error if the insert fails.
    pub fn create_video(&self, video: &NewVideo) -> Result<VideoProgress, StorageError> {
        self.create_video_with_id(&uuid::Uuid::new_v4().to_string(), video)
    }

    /// # Errors
    /// Returns error if the insert fails.
    pub fn create_video_with_id(
        &self,
        id: &str,
        video: &NewVideo,
    ) -> Result<VideoProgress, StorageError> {
        let conn = get_conn(&self.pool)?;
        insert_video(&conn, id, video)?;
        tracing::debug!(user_id = %video.user_id, id, name = %video.name, "video created");
        self.changes.publish(&video.user_id);
        Ok(video.clone().into_video(id.to_owned()))
    }

    /// # Errors
    /// Returns `NotFound` if no such record exists for the user.
    pub fn update_episode(&self, user_id: &str, id: &str, episode: u32) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        let changed = conn.execute(
            "UPDATE videos SET episode = ?1 WHERE user_id = ?2 AND id = ?3",
            params![episode, user_id, id],
        )?;
        if changed == 0 {
            return Err(StorageError::video_not_found(id));
        }
        tracing::debug!(user_id, id, episode, "episode updated");
        self.changes.publish(user_id);
        Ok(())
    }

    /// # Errors
    /// Returns error if the delete fails.
    pub fn delete_video(&self, user_id: &str, id: &str) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        let deleted =
            conn.execute("DELETE FROM videos WHERE user_id = ?1 AND id = ?2", params![user_id, id])?;
        if deleted > 0 {
            tracing::debug!(user_id, id, "video deleted");
            self.changes.publish(user_id);
        }
        Ok(deleted > 0)
    }

    /// Apply every operation in one transaction.
    ///
    /// # Errors
    /// The first failing operation rolls back the whole batch.
    pub fn commit_batch(&self, batch: &WriteBatch) -> Result<usize, StorageError> {
        if batch.is_empty() {
            return Ok(0);
        }
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        for op in batch.ops() {
            match op {
                WriteOp::Set { id, video } => insert_video(&tx, id, video)?,
                WriteOp::UpdateEpisode { user_id, id, episode } => {
                    let changed = tx.execute(
                        "UPDATE videos SET episode = ?1 WHERE user_id = ?2 AND id = ?3",
                        params![episode, user_id, id],
                    )?;
                    if changed == 0 {
                        return Err(StorageError::video_not_found(id));
                    }
                },
                WriteOp::Delete { user_id, id } => {
                    tx.execute(
                        "DELETE FROM videos WHERE user_id = ?1 AND id = ?2",
                        params![user_id, id],
                    )?;
                },
            }
        }
        tx.commit()?;
        tracing::debug!(ops = batch.len(), "batch committed");
        self.changes.publish_all(&batch.affected_users());
        Ok(batch.len())
    }
}
