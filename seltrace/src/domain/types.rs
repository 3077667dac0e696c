//! Core domain newtypes.

use std::fmt;

/// Identity of one installed hook in the append-only registry.
/// Repeated installation of the same (class, selector) pair yields
/// distinct ids; nothing deduplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(pub u64);

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HOOK:{}", self.0)
    }
}
