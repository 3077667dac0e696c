//! Domain model for seltrace
//!
//! Core newtypes and structured errors shared across the engine.

pub mod errors;
pub mod types;

pub use errors::{DiscoveryError, InstallError};
pub use types::HookId;
