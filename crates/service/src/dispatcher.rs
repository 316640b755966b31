//! Translates user intents into store writes for one user's collection.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tokio::sync::{mpsc, oneshot};
use watchtrack_core::{
    FeatureFlags, InterchangeEntry, NewVideo, ParsedImport, VideoProgress, export_json, name_key,
    parse_import,
};
use watchtrack_storage::{StorageBackend, VideoStore, WriteBatch};

use crate::error::ServiceError;
use crate::events::ErrorChannel;

/// Result of [`MutationDispatcher::add_or_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Created(VideoProgress),
    /// An existing record with the same name had its episode overwritten.
    Updated { id: String, episode: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Every entry becomes a new record.
    Append,
    /// Entries whose name already exists update that record instead.
    #[default]
    Merge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
}

impl ImportSummary {
    #[must_use]
    pub const fn written(&self) -> usize {
        self.added.saturating_add(self.updated)
    }
}

/// Resolves once a queued write has been applied or its failure published.
pub type PendingWrite = oneshot::Receiver<()>;

enum WriteIntent {
    AddOrUpdate { id: String, name: String, episode: u32 },
    UpdateEpisode { id: String, episode: u32 },
    Delete { id: String },
}

impl WriteIntent {
    const fn operation(&self) -> &'static str {
        match self {
            Self::AddOrUpdate { .. } => "add",
            Self::UpdateEpisode { .. } => "update episode",
            Self::Delete { .. } => "delete",
        }
    }
}

struct QueuedWrite {
    intent: WriteIntent,
    done: oneshot::Sender<()>,
}

/// Clones share one write queue, drained in order by a single task.
#[derive(Clone)]
pub struct MutationDispatcher {
    storage: Arc<StorageBackend>,
    user_id: String,
    flags: FeatureFlags,
    errors: ErrorChannel,
    queue: Arc<OnceLock<mpsc::UnboundedSender<QueuedWrite>>>,
}

impl MutationDispatcher {
    #[must_use]
    pub fn new(
        storage: Arc<StorageBackend>,
        user_id: impl Into<String>,
        flags: FeatureFlags,
        errors: ErrorChannel,
    ) -> Self {
        Self { storage, user_id: user_id.into(), flags, errors, queue: Arc::new(OnceLock::new()) }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub const fn flags(&self) -> FeatureFlags {
        self.flags
    }

    pub(crate) const fn storage(&self) -> &Arc<StorageBackend> {
        &self.storage
    }

    pub(crate) const fn errors(&self) -> &ErrorChannel {
        &self.errors
    }

    pub async fn list(&self) -> Result<Vec<VideoProgress>, ServiceError> {
        Ok(self.storage.list_videos(&self.user_id).await?)
    }

    /// Create a record, or overwrite the episode of the one already carrying
    /// this name. The lookup and the write are separate store calls, so two
    /// concurrent writers can still both create.
    pub async fn add_or_update(&self, name: &str, episode: u32) -> Result<AddOutcome, ServiceError> {
        self.add_or_update_with_id(&uuid::Uuid::new_v4().to_string(), name, episode).await
    }

    /// [`Self::add_or_update`] where a created record takes `id`.
    pub async fn add_or_update_with_id(
        &self,
        id: &str,
        name: &str,
        episode: u32,
    ) -> Result<AddOutcome, ServiceError> {
        let video = NewVideo::new(name, episode, &self.user_id)?;
        if let Some(existing) = self.storage.find_video_by_name(&self.user_id, &video.name).await? {
            self.storage.update_episode(&self.user_id, &existing.id, episode).await?;
            tracing::debug!(id = %existing.id, episode, "episode updated by name");
            return Ok(AddOutcome::Updated { id: existing.id, episode });
        }
        let created = self.storage.create_video_with_id(id, &video).await?;
        tracing::debug!(id = %created.id, name = %created.name, "video created");
        Ok(AddOutcome::Created(created))
    }

    pub async fn update_episode(&self, id: &str, episode: u32) -> Result<(), ServiceError> {
        self.storage.update_episode(&self.user_id, id, episode).await?;
        Ok(())
    }

    /// Returns `false` when there was nothing to delete.
    pub async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        Ok(self.storage.delete_video(&self.user_id, id).await?)
    }

    /// Remove every record of the user in one atomic batch.
    pub async fn delete_all(&self) -> Result<usize, ServiceError> {
        if !self.flags.is_delete_all_enabled {
            return Err(ServiceError::FeatureDisabled("delete all"));
        }
        let videos = self.storage.list_videos(&self.user_id).await?;
        if videos.is_empty() {
            return Ok(0);
        }
        let mut batch = WriteBatch::new();
        for video in &videos {
            batch.delete(&self.user_id, &video.id);
        }
        let removed = self.storage.commit(&batch).await?;
        tracing::info!(user_id = %self.user_id, removed, "collection cleared");
        Ok(removed)
    }

    /// Parse an interchange document and write its valid entries atomically.
    pub async fn bulk_import(&self, text: &str, mode: ImportMode) -> Result<ImportSummary, ServiceError> {
        let parsed = parse_import(text)?;
        self.import_entries(parsed, mode).await
    }

    pub async fn import_entries(
        &self,
        parsed: ParsedImport,
        mode: ImportMode,
    ) -> Result<ImportSummary, ServiceError> {
        let mut summary = ImportSummary { skipped: parsed.skipped, ..ImportSummary::default() };
        let mut batch = WriteBatch::new();
        match mode {
            ImportMode::Append => {
                for entry in parsed.entries {
                    batch.set(NewVideo::new(&entry.name, entry.episode, &self.user_id)?);
                    summary.added = summary.added.saturating_add(1);
                }
            },
            ImportMode::Merge => {
                let existing = self.existing_ids_by_name().await?;
                for entry in collapse_by_name(parsed.entries) {
                    if let Some(id) = existing.get(&name_key(&entry.name)) {
                        batch.update_episode(&self.user_id, id, entry.episode);
                        summary.updated = summary.updated.saturating_add(1);
                    } else {
                        batch.set(NewVideo::new(&entry.name, entry.episode, &self.user_id)?);
                        summary.added = summary.added.saturating_add(1);
                    }
                }
            },
        }
        if !batch.is_empty() {
            self.storage.commit(&batch).await?;
        }
        tracing::info!(
            user_id = %self.user_id,
            added = summary.added,
            updated = summary.updated,
            skipped = summary.skipped,
            ?mode,
            "import finished"
        );
        Ok(summary)
    }

    /// Pretty-printed interchange document of the whole collection.
    pub async fn export(&self) -> Result<String, ServiceError> {
        let videos = self.storage.list_videos(&self.user_id).await?;
        Ok(export_json(&videos)?)
    }

    /// First record per name key, matching what a by-name lookup would find.
    async fn existing_ids_by_name(&self) -> Result<HashMap<String, String>, ServiceError> {
        let mut ids = HashMap::new();
        for video in self.storage.list_videos(&self.user_id).await? {
            ids.entry(name_key(&video.name)).or_insert(video.id);
        }
        Ok(ids)
    }

    pub fn spawn_add_or_update(&self, name: &str, episode: u32) -> PendingWrite {
        self.spawn_add_or_update_with_id(&uuid::Uuid::new_v4().to_string(), name, episode)
    }

    pub fn spawn_add_or_update_with_id(&self, id: &str, name: &str, episode: u32) -> PendingWrite {
        self.enqueue(WriteIntent::AddOrUpdate {
            id: id.to_owned(),
            name: name.to_owned(),
            episode,
        })
    }

    pub fn spawn_update_episode(&self, id: &str, episode: u32) -> PendingWrite {
        self.enqueue(WriteIntent::UpdateEpisode { id: id.to_owned(), episode })
    }

    pub fn spawn_delete(&self, id: &str) -> PendingWrite {
        self.enqueue(WriteIntent::Delete { id: id.to_owned() })
    }

    /// Queue a write behind every write queued before it. Failures go to the
    /// error channel. Must be called inside a tokio runtime.
    fn enqueue(&self, intent: WriteIntent) -> PendingWrite {
        let (done, pending) = oneshot::channel();
        let queue = self.queue.get_or_init(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(self.worker().drain(rx));
            tx
        });
        if let Err(mpsc::error::SendError(rejected)) = queue.send(QueuedWrite { intent, done }) {
            self.errors.write_failed(rejected.intent.operation(), "Write queue closed".to_owned());
            rejected.done.send(()).ok();
        }
        pending
    }

    /// A clone without the queue handle, so the worker does not keep its own
    /// channel open.
    fn worker(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            user_id: self.user_id.clone(),
            flags: self.flags,
            errors: self.errors.clone(),
            queue: Arc::new(OnceLock::new()),
        }
    }

    async fn drain(self, mut rx: mpsc::UnboundedReceiver<QueuedWrite>) {
        while let Some(QueuedWrite { intent, done }) = rx.recv().await {
            if let Err(e) = self.apply(&intent).await {
                tracing::warn!(user_id = %self.user_id, operation = intent.operation(), error = %e, "queued write failed");
                self.errors.write_failed(intent.operation(), e.user_message());
            }
            done.send(()).ok();
        }
        tracing::debug!(user_id = %self.user_id, "write queue closed");
    }

    async fn apply(&self, intent: &WriteIntent) -> Result<(), ServiceError> {
        match intent {
            WriteIntent::AddOrUpdate { id, name, episode } => {
                self.add_or_update_with_id(id, name, *episode).await?;
            },
            WriteIntent::UpdateEpisode { id, episode } => self.update_episode(id, *episode).await?,
            WriteIntent::Delete { id } => {
                self.delete(id).await?;
            },
        }
        Ok(())
    }
}

/// One entry per name key in first-seen order, carrying the last entry's
/// name and episode.
fn collapse_by_name(entries: Vec<InterchangeEntry>) -> Vec<InterchangeEntry> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut collapsed: Vec<InterchangeEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        let key = name_key(&entry.name);
        if let Some(&pos) = positions.get(&key) {
            if let Some(slot) = collapsed.get_mut(pos) {
                *slot = entry;
            }
        } else {
            positions.insert(key, collapsed.len());
            collapsed.push(entry);
        }
    }
    collapsed
}
