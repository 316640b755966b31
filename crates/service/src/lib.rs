//! Service layer for watchtrack
//!
//! The collection view model and mutation dispatcher that sit between a
//! presentation surface and the document store, plus account, config and
//! owner-migration services.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod account_service;
mod config_service;
mod dispatcher;
mod error;
mod events;
mod identity;
mod migration_service;
mod view_model;

pub use account_service::AccountService;
pub use config_service::ConfigService;
pub use dispatcher::{AddOutcome, ImportMode, ImportSummary, MutationDispatcher, PendingWrite};
pub use error::ServiceError;
pub use events::{AppEvent, ErrorChannel};
pub use identity::{Identity, IdentityError, IdentityProvider, KdfParams, LocalIdentityProvider};
pub use migration_service::{MigrationOutcome, MigrationService};
pub use view_model::{CollectionSnapshot, CollectionViewModel};
