//! Entry hook installation.
//!
//! The only component with an observable side effect: a successfully
//! installed hook emits one trace event per intercepted invocation,
//! at entry time, for the remainder of the process. There is no
//! uninstall.

pub mod installer;
pub mod registry;

pub use installer::install;
pub use registry::{HookRecord, HookRegistry};
