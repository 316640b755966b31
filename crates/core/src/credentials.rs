//! Login input validation and the phone-derived identifier convention.
//!
//! Deriving an email-like identifier from a phone number is a demo-grade
//! shortcut. It lives behind [`CredentialScheme`] so deployments can swap it.

use crate::ValidationError;
use crate::constants::{MIN_PASSWORD_LEN, MIN_PHONE_LEN};

/// Maps what the user types at the login prompt to the identity provider's key.
pub trait CredentialScheme: Send + Sync {
    /// Provider identifier for the given login.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] when the login is not acceptable.
    fn identifier_for(&self, login: &str) -> Result<String, ValidationError>;
}

/// `{phone}@{domain}` identifiers.
#[derive(Debug, Clone)]
pub struct PhoneEmailScheme {
    domain: String,
}

impl PhoneEmailScheme {
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self { domain: domain.into() }
    }
}

impl CredentialScheme for PhoneEmailScheme {
    fn identifier_for(&self, login: &str) -> Result<String, ValidationError> {
        let phone = validate_phone(login)?;
        Ok(format!("{phone}@{}", self.domain))
    }
}

/// Trim a phone number and enforce the minimum length.
///
/// # Errors
/// Returns [`ValidationError::PhoneTooShort`] or [`ValidationError::MissingField`].
pub fn validate_phone(phone: &str) -> Result<&str, ValidationError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(ValidationError::MissingField { field: "phone" });
    }
    if phone.chars().count() < MIN_PHONE_LEN {
        return Err(ValidationError::PhoneTooShort { min: MIN_PHONE_LEN });
    }
    Ok(phone)
}

/// Enforce the minimum password length.
///
/// # Errors
/// Returns [`ValidationError::PasswordTooShort`].
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort { min: MIN_PASSWORD_LEN });
    }
    Ok(())
}

/// Validate a new password and its confirmation.
///
/// # Errors
/// Length is checked on both fields before the match.
pub fn validate_password_change(new: &str, confirm: &str) -> Result<(), ValidationError> {
    validate_password(new)?;
    validate_password(confirm)?;
    if new != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}
