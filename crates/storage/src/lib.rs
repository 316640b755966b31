//! Storage layer for watchtrack
//!
//! A small document-store abstraction: user-scoped video collections at
//! `users/{uid}/videos/{id}`, a `config/features` document, local accounts,
//! atomic write batches and a change feed that drives live queries.
//!
//! Two backends sit behind [`StorageBackend`]: SQLite (durable, default) and
//! an in-memory store with fault injection.

mod backend;
mod batch;
mod change_feed;
mod error;
mod live_query;
mod memory;
#[cfg(feature = "sqlite")]
mod migrations;
#[cfg(feature = "sqlite")]
mod sqlite_async;
#[cfg(feature = "sqlite")]
mod storage;
#[cfg(test)]
mod tests;
pub mod traits;
mod types;

pub use backend::StorageBackend;
pub use batch::{WriteBatch, WriteOp};
pub use change_feed::{ChangeFeed, CollectionChange};
pub use error::StorageError;
pub use live_query::LiveQuery;
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use storage::Storage;
pub use traits::{AccountStore, ChangeSource, ConfigStore, VideoStore};
pub use types::AccountRecord;
