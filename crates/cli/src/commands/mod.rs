pub(crate) mod account;
pub(crate) mod flags;
pub(crate) mod transfer;
pub(crate) mod videos;
pub(crate) mod watch;

use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::sync::broadcast;
use watchtrack_core::{AppConfig, PhoneEmailScheme, VideoProgress};
use watchtrack_service::{
    AccountService, AppEvent, ConfigService, ErrorChannel, Identity, LocalIdentityProvider,
    MutationDispatcher, ServiceError,
};
use watchtrack_storage::StorageBackend;

use crate::{Credentials, ensure_db_dir};

/// Everything a command needs, opened once per invocation.
pub(crate) struct Context {
    pub(crate) storage: Arc<StorageBackend>,
    pub(crate) errors: ErrorChannel,
    accounts: AccountService,
}

impl Context {
    pub(crate) fn open(config: AppConfig) -> Result<Self> {
        ensure_db_dir(&config.db_path)?;
        let storage = Arc::new(StorageBackend::open_sqlite(
            &config.db_path,
            config.db_pool_size,
            config.change_poll_interval(),
        )?);
        let provider = LocalIdentityProvider::new(Arc::clone(&storage), config.recent_login_secs);
        let accounts = AccountService::new(
            Arc::new(provider),
            Arc::new(PhoneEmailScheme::new(config.email_domain)),
        );
        Ok(Self { storage, errors: ErrorChannel::new(), accounts })
    }

    pub(crate) const fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    pub(crate) async fn sign_in(&self, creds: &Credentials) -> Result<Identity> {
        self.accounts.sign_in(&creds.phone, &creds.password).await.map_err(user_facing)
    }

    /// Sign in and bind a dispatcher to that user with the stored flags.
    pub(crate) async fn dispatcher(&self, creds: &Credentials) -> Result<MutationDispatcher> {
        let identity = self.sign_in(creds).await?;
        let flags = ConfigService::new(Arc::clone(&self.storage)).load().await.map_err(user_facing)?;
        Ok(MutationDispatcher::new(Arc::clone(&self.storage), identity.uid, flags, self.errors.clone()))
    }
}

/// Turn a service error into the message shown on the terminal.
pub(crate) fn user_facing(err: ServiceError) -> anyhow::Error {
    tracing::debug!(error = %err, "command failed");
    anyhow!(err.user_message())
}

/// First record carrying `name` under the soft-unique name rule.
pub(crate) fn find_by_name(videos: &[VideoProgress], name: &str) -> Result<VideoProgress> {
    videos
        .iter()
        .find(|v| v.has_name(name))
        .cloned()
        .ok_or_else(|| anyhow!("You are not tracking \"{}\".", name.trim()))
}

/// Fail if a detached write reported an error.
pub(crate) fn drain_failures(events: &mut broadcast::Receiver<AppEvent>) -> Result<()> {
    let mut failure = None;
    while let Ok(event) = events.try_recv() {
        if let AppEvent::WriteFailed { message, .. } = event {
            failure = Some(message);
        }
    }
    failure.map_or(Ok(()), |message| Err(anyhow!(message)))
}

pub(crate) fn print_videos(videos: &[VideoProgress]) {
    let width = videos.iter().map(|v| v.name.chars().count()).max().unwrap_or(0);
    for video in videos {
        println!("{:<width$}  {}", video.name, video.episode);
    }
}
