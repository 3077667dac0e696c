//! Operator-supplied trace plan.
//!
//! The orchestration layer feeds the engine two inputs: keyword
//! filters for the discovery pass and an ordered list of (class,
//! selector) pairs for eager installation. Both live in one JSON file:
//!
//! ```json
//! {
//!   "keywords": ["InputMode", "Language", "Switch"],
//!   "hooks": [
//!     { "class": "LanguageSwitchView", "selector": "- setLanguage:" }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One (class, selector) pair to hook eagerly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HookSpec {
    pub class: String,
    pub selector: String,
}

/// The full plan: discovery keywords plus the hook list. Either half
/// may be empty; they drive independent components.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TracePlan {
    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub hooks: Vec<HookSpec>,
}

impl TracePlan {
    /// Parse a plan file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid
    /// plan JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid trace plan in {}", path.display()))
    }
}
