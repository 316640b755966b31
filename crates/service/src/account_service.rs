use std::sync::Arc;

use watchtrack_core::{
    CredentialScheme, ValidationError, validate_password, validate_password_change,
};

use crate::error::ServiceError;
use crate::identity::{Identity, IdentityProvider};

/// Sign-up, sign-in and password management over pluggable login and
/// identity implementations.
pub struct AccountService {
    provider: Arc<dyn IdentityProvider>,
    scheme: Arc<dyn CredentialScheme>,
}

impl AccountService {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, scheme: Arc<dyn CredentialScheme>) -> Self {
        Self { provider, scheme }
    }

    pub async fn sign_up(&self, phone: &str, password: &str) -> Result<Identity, ServiceError> {
        let identifier = self.scheme.identifier_for(phone)?;
        validate_password(password)?;
        Ok(self.provider.sign_up(&identifier, password).await?)
    }

    pub async fn sign_in(&self, phone: &str, password: &str) -> Result<Identity, ServiceError> {
        let identifier = self.scheme.identifier_for(phone)?;
        if password.is_empty() {
            return Err(ValidationError::MissingField { field: "password" }.into());
        }
        Ok(self.provider.sign_in(&identifier, password).await?)
    }

    pub async fn sign_out(&self, identity: &Identity) -> Result<(), ServiceError> {
        Ok(self.provider.sign_out(identity).await?)
    }

    /// Both fields are validated locally before the provider is asked.
    pub async fn change_password(
        &self,
        identity: &Identity,
        new_password: &str,
        confirm: &str,
    ) -> Result<(), ServiceError> {
        validate_password_change(new_password, confirm)?;
        Ok(self.provider.update_password(identity, new_password).await?)
    }
}
