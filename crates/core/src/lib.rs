//! Core types for watchtrack
//!
//! Domain records, validation rules and the JSON interchange format shared by
//! the storage, service and CLI crates.

pub mod constants;
mod config;
mod credentials;
mod error;
mod feature_flags;
mod filter;
mod interchange;
mod video;

pub use config::*;
pub use credentials::*;
pub use error::*;
pub use feature_flags::*;
pub use filter::*;
pub use interchange::*;
pub use video::*;
