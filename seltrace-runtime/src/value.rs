//! Captured call slots and their textual renderings.

use std::fmt;

/// One raw captured slot: the bit pattern of a receiver or argument as
/// it appeared in the call's argument layout.
///
/// Opaque to the engine. Only the runtime can decide whether the bits
/// are an object handle; a primitive integer travelling through a slot
/// looks exactly the same until [`DispatchRuntime::describe`] rejects
/// it.
///
/// [`DispatchRuntime::describe`]: crate::DispatchRuntime::describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawValue(pub u64);

impl RawValue {
    /// The null slot. Also what a probe reads when it inspects a slot
    /// the caller never materialized.
    pub const NULL: RawValue = RawValue(0);
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Human-readable rendering of a captured value.
///
/// Always non-empty: either the runtime's native object-to-text
/// conversion, or the deterministic fallback form of the raw slot
/// (its hex bit pattern). Construction never fails and never
/// propagates a conversion failure past the value it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description(String);

impl Description {
    /// Wrap a successful native conversion. An empty conversion result
    /// degrades to the fallback form so the description is never blank.
    #[must_use]
    pub fn native(text: impl Into<String>, raw: RawValue) -> Self {
        let text = text.into();
        if text.is_empty() {
            Self::fallback(raw)
        } else {
            Description(text)
        }
    }

    /// Deterministic rendering of the raw slot itself, used whenever
    /// native conversion is unavailable or fails.
    #[must_use]
    pub fn fallback(raw: RawValue) -> Self {
        Description(raw.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
