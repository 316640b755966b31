//! Storage backend trait abstraction
//!
//! Async domain traits for the document store, implemented by every backend
//! and by the enum-dispatching [`crate::StorageBackend`].

pub mod account;
pub mod config;
pub mod video;

pub use account::AccountStore;
pub use config::ConfigStore;
pub use video::{ChangeSource, VideoStore};
