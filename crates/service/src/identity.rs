//! Identity boundary and a local, store-backed implementation.
//!
//! [`LocalIdentityProvider`] keeps accounts in the document store with
//! argon2id password hashes. Sessions are plain [`Identity`] values; the
//! provider only checks their age for sensitive operations.

use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;
use watchtrack_core::constants::MIN_PASSWORD_LEN;
use watchtrack_storage::{AccountRecord, AccountStore, StorageBackend, StorageError};

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub identifier: String,
    pub signed_in_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid credential")]
    InvalidCredential,

    #[error("identifier already registered")]
    IdentifierInUse,

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("a recent sign-in is required")]
    RequiresRecentLogin,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("account store: {0}")]
    Storage(#[from] StorageError),
}

impl IdentityError {
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredential => "Wrong phone number or password.",
            Self::IdentifierInUse => "This phone number is already registered.",
            Self::WeakPassword { .. } => "Password must be at least 6 characters.",
            Self::RequiresRecentLogin => {
                "For security, please sign out and sign in again before changing your password."
            },
            Self::Hashing(_) | Self::Storage(_) => "Something went wrong. Please try again.",
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, identifier: &str, password: &str) -> Result<Identity, IdentityError>;

    async fn sign_in(&self, identifier: &str, password: &str) -> Result<Identity, IdentityError>;

    async fn sign_out(&self, identity: &Identity) -> Result<(), IdentityError>;

    /// May refuse with [`IdentityError::RequiresRecentLogin`].
    async fn update_password(
        &self,
        identity: &Identity,
        new_password: &str,
    ) -> Result<(), IdentityError>;
}

/// Argon2id cost parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KdfParams {
    pub m_cost_kib: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost_kib: Params::DEFAULT_M_COST,
            t_cost: Params::DEFAULT_T_COST,
            p_cost: Params::DEFAULT_P_COST,
        }
    }
}

impl KdfParams {
    /// Cheap parameters for tests.
    #[must_use]
    pub const fn for_test() -> Self {
        Self { m_cost_kib: 1024, t_cost: 1, p_cost: 1 }
    }
}

fn derive_hash(password: &str, salt: &[u8], params: &KdfParams) -> Result<[u8; HASH_LEN], IdentityError> {
    let argon_params = Params::new(params.m_cost_kib, params.t_cost, params.p_cost, Some(HASH_LEN))
        .map_err(|e| IdentityError::Hashing(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut output = [0u8; HASH_LEN];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut output)
        .map_err(|e| IdentityError::Hashing(e.to_string()))?;
    Ok(output)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub struct LocalIdentityProvider {
    storage: Arc<StorageBackend>,
    kdf: KdfParams,
    recent_login: Duration,
}

impl LocalIdentityProvider {
    #[must_use]
    pub fn new(storage: Arc<StorageBackend>, recent_login_secs: i64) -> Self {
        Self { storage, kdf: KdfParams::default(), recent_login: Duration::seconds(recent_login_secs) }
    }

    #[must_use]
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Fresh salt and hash, base64 encoded for storage.
    async fn hash_password(&self, password: &str) -> Result<(String, String), IdentityError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let hash = self.hash_with_salt(password, salt.to_vec()).await?;
        Ok((STANDARD.encode(hash), STANDARD.encode(salt)))
    }

    async fn hash_with_salt(&self, password: &str, salt: Vec<u8>) -> Result<[u8; HASH_LEN], IdentityError> {
        let password = password.to_owned();
        let kdf = self.kdf.clone();
        tokio::task::spawn_blocking(move || derive_hash(&password, &salt, &kdf))
            .await
            .map_err(|e| IdentityError::Hashing(e.to_string()))?
    }

    fn check_strength(password: &str) -> Result<(), IdentityError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(IdentityError::WeakPassword { min: MIN_PASSWORD_LEN });
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_up(&self, identifier: &str, password: &str) -> Result<Identity, IdentityError> {
        Self::check_strength(password)?;
        if self.storage.get_account_by_identifier(identifier).await?.is_some() {
            return Err(IdentityError::IdentifierInUse);
        }
        let (password_hash, password_salt) = self.hash_password(password).await?;
        let now = Utc::now();
        let account = AccountRecord {
            uid: uuid::Uuid::new_v4().to_string(),
            identifier: identifier.to_owned(),
            password_hash,
            password_salt,
            created_at: now,
            password_updated_at: now,
        };
        match self.storage.insert_account(&account).await {
            Ok(()) => {},
            Err(e) if e.is_duplicate() => return Err(IdentityError::IdentifierInUse),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(uid = %account.uid, "account registered");
        Ok(Identity { uid: account.uid, identifier: account.identifier, signed_in_at: now })
    }

    async fn sign_in(&self, identifier: &str, password: &str) -> Result<Identity, IdentityError> {
        let Some(account) = self.storage.get_account_by_identifier(identifier).await? else {
            return Err(IdentityError::InvalidCredential);
        };
        let salt = STANDARD
            .decode(&account.password_salt)
            .map_err(|e| IdentityError::Hashing(format!("stored salt: {e}")))?;
        let expected = STANDARD
            .decode(&account.password_hash)
            .map_err(|e| IdentityError::Hashing(format!("stored hash: {e}")))?;
        let actual = self.hash_with_salt(password, salt).await?;
        if !constant_time_eq(&actual, &expected) {
            tracing::debug!(uid = %account.uid, "sign-in rejected");
            return Err(IdentityError::InvalidCredential);
        }
        Ok(Identity { uid: account.uid, identifier: account.identifier, signed_in_at: Utc::now() })
    }

    async fn sign_out(&self, identity: &Identity) -> Result<(), IdentityError> {
        tracing::info!(uid = %identity.uid, "signed out");
        Ok(())
    }

    async fn update_password(
        &self,
        identity: &Identity,
        new_password: &str,
    ) -> Result<(), IdentityError> {
        if Utc::now().signed_duration_since(identity.signed_in_at) > self.recent_login {
            return Err(IdentityError::RequiresRecentLogin);
        }
        Self::check_strength(new_password)?;
        let (password_hash, password_salt) = self.hash_password(new_password).await?;
        self.storage
            .update_password(&identity.uid, &password_hash, &password_salt, Utc::now())
            .await?;
        tracing::info!(uid = %identity.uid, "password changed");
        Ok(())
    }
}
