//! Atomic multi-document writes.
//!
//! A batch is applied all-or-nothing: if any operation fails the store
//! discards every other operation in the same batch.

use std::collections::BTreeSet;

use watchtrack_core::NewVideo;

/// One write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Create (or overwrite) the document `users/{video.user_id}/videos/{id}`.
    Set { id: String, video: NewVideo },
    /// Set the episode of an existing document. Fails the batch if missing.
    UpdateEpisode { user_id: String, id: String, episode: u32 },
    /// Remove a document. Deleting a missing document is not an error.
    Delete { user_id: String, id: String },
}

impl WriteOp {
    #[must_use]
    pub fn user_id(&self) -> &str {
        match self {
            Self::Set { video, .. } => &video.user_id,
            Self::UpdateEpisode { user_id, .. } | Self::Delete { user_id, .. } => user_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a new document and return the id allocated for it.
    pub fn set(&mut self, video: NewVideo) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.ops.push(WriteOp::Set { id: id.clone(), video });
        id
    }

    pub fn update_episode(&mut self, user_id: &str, id: &str, episode: u32) {
        self.ops.push(WriteOp::UpdateEpisode {
            user_id: user_id.to_owned(),
            id: id.to_owned(),
            episode,
        });
    }

    pub fn delete(&mut self, user_id: &str, id: &str) {
        self.ops.push(WriteOp::Delete { user_id: user_id.to_owned(), id: id.to_owned() });
    }

    #[must_use]
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Users whose collections this batch touches, for change notification.
    #[must_use]
    pub fn affected_users(&self) -> BTreeSet<String> {
        self.ops.iter().map(|op| op.user_id().to_owned()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_allocates_distinct_ids() {
        let mut batch = WriteBatch::new();
        let a = batch.set(NewVideo::new("Arcane", 1, "u1").unwrap());
        let b = batch.set(NewVideo::new("Arcane", 1, "u1").unwrap());
        assert_ne!(a, b);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn affected_users_are_deduplicated() {
        let mut batch = WriteBatch::new();
        batch.delete("u1", "a");
        batch.delete("u1", "b");
        batch.update_episode("u2", "c", 3);
        let users: Vec<String> = batch.affected_users().into_iter().collect();
        assert_eq!(users, vec!["u1".to_owned(), "u2".to_owned()]);
    }
}
