//! Structured error types for seltrace
//!
//! Using thiserror for automatic Display implementation and error
//! chaining. Per-value description failures are deliberately absent:
//! they are recovered at the point of capture and never surface here.

use seltrace_runtime::{AttachError, EnumerateError};
use thiserror::Error;

/// Installation failure for one (class, selector) pair. Checks run in
/// declaration order and the first failing check is the reported
/// variant; no partial side effect remains.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Class {class} not found in the live class table")]
    ClassNotFound { class: String },

    #[error("{class} declares no method {selector}")]
    SelectorNotFound { class: String, selector: String },

    #[error("Failed to attach probe for {class} {selector}: {source}")]
    Attach {
        class: String,
        selector: String,
        #[source]
        source: AttachError,
    },
}

impl InstallError {
    /// The class the failed installation was aimed at.
    #[must_use]
    pub fn class(&self) -> &str {
        match self {
            InstallError::ClassNotFound { class }
            | InstallError::SelectorNotFound { class, .. }
            | InstallError::Attach { class, .. } => class,
        }
    }
}

/// The discovery pass itself could not run. Fatal to that pass only;
/// hook installation is independent and proceeds.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Class enumeration failed: {0}")]
    Enumerate(#[from] EnumerateError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use seltrace_runtime::ImplAddr;

    #[test]
    fn test_install_error_display() {
        let err = InstallError::ClassNotFound { class: "NoSuchClass".to_string() };
        assert_eq!(err.to_string(), "Class NoSuchClass not found in the live class table");
    }

    #[test]
    fn test_attach_error_keeps_underlying_cause() {
        let err = InstallError::Attach {
            class: "LanguageSwitchView".to_string(),
            selector: "- setLanguage:".to_string(),
            source: AttachError::UnknownAddress { addr: ImplAddr(0xdead) },
        };
        assert!(err.to_string().contains("LanguageSwitchView"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_names_the_offending_pair() {
        let err = InstallError::SelectorNotFound {
            class: "SwitchControl".to_string(),
            selector: "- setOn:".to_string(),
        };
        assert_eq!(err.class(), "SwitchControl");
        assert!(err.to_string().contains("- setOn:"));
    }
}
