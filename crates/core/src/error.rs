use thiserror::Error;

/// Input rejected before anything reaches the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("video name is required")]
    EmptyName,

    #[error("phone number must be at least {min} characters")]
    PhoneTooShort { min: usize },

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("password confirmation does not match")]
    PasswordMismatch,

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("source and target owner must differ")]
    SameOwner,
}

/// Failures parsing or producing the JSON interchange document.
#[derive(Error, Debug)]
pub enum InterchangeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("import file must contain a JSON array")]
    NotAnArray,

    #[error("there is no progress to export")]
    NothingToExport,
}
