//! Shared configuration, error types, and identifiers for relq crates.
//!
//! Architecture role:
//! - defines session configuration passed across layers
//! - provides common [`RelqError`] / [`Result`] contracts
//! - hosts typed identifiers used for staged-table naming
//!
//! Key modules:
//! - [`config`]
//! - [`error`]
//! - [`ids`]

pub mod config;
pub mod error;
pub mod ids;

pub use config::{SessionConfig, WindowOrderPolicy};
pub use error::{RelqError, Result};
pub use ids::*;
