use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// One tracked show for one user, addressed as `users/{user_id}/videos/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProgress {
    pub id: String,
    pub name: String,
    pub episode: u32,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl VideoProgress {
    /// Whether `other` names the same show under the soft-unique name rule.
    #[must_use]
    pub fn has_name(&self, other: &str) -> bool {
        name_key(&self.name) == name_key(other)
    }

    /// Episode after an increment.
    #[must_use]
    pub const fn next_episode(&self) -> u32 {
        self.episode.saturating_add(1)
    }

    /// Episode after a decrement, `None` when already at zero.
    #[must_use]
    pub const fn previous_episode(&self) -> Option<u32> {
        self.episode.checked_sub(1)
    }

    /// Copy of this record re-owned by `user_id`, keeping name, episode and
    /// creation time. The store assigns a fresh id on write.
    #[must_use]
    pub fn reowned(&self, user_id: &str) -> NewVideo {
        NewVideo {
            name: self.name.clone(),
            episode: self.episode,
            user_id: user_id.to_owned(),
            created_at: self.created_at,
        }
    }
}

/// Fields of a record about to be created. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVideo {
    pub name: String,
    pub episode: u32,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl NewVideo {
    /// Validate `name` and stamp the creation time, truncated to the
    /// microsecond precision the stores keep.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyName`] for a blank name.
    pub fn new(name: &str, episode: u32, user_id: &str) -> Result<Self, ValidationError> {
        let name = validate_name(name)?;
        Ok(Self { name, episode, user_id: user_id.to_owned(), created_at: Utc::now().trunc_subsecs(6) })
    }

    /// Attach the store-assigned id.
    #[must_use]
    pub fn into_video(self, id: String) -> VideoProgress {
        VideoProgress {
            id,
            name: self.name,
            episode: self.episode,
            user_id: self.user_id,
            created_at: self.created_at,
        }
    }
}

/// Comparison key for the soft-unique name rule: trimmed and lowercased.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trim a display name and reject it when nothing is left.
///
/// # Errors
/// Returns [`ValidationError::EmptyName`] for a blank name.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_owned())
}
