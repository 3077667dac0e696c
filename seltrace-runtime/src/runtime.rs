//! The seam between the tracing engine and a live dispatch runtime.
//!
//! The engine never assumes static binding: everything is a run-time
//! lookup by (class name, selector text) against whatever the runtime
//! reports as currently loaded.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::{ClassDescriptor, RawValue};

/// Resolved entry point of one (class, selector) implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImplAddr(pub u64);

impl fmt::Display for ImplAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Slot layout of one dispatched call, as an entry probe sees it:
/// slot 0 is the receiver, slot 1 the selector handle, slots 2.. the
/// positional arguments in call order.
#[derive(Debug, Clone)]
pub struct CallFrame {
    slots: Vec<RawValue>,
}

impl CallFrame {
    /// Index of the first positional argument slot.
    pub const FIRST_ARG_SLOT: usize = 2;

    #[must_use]
    pub fn new(receiver: RawValue, selector_handle: RawValue, args: &[RawValue]) -> Self {
        let mut slots = Vec::with_capacity(Self::FIRST_ARG_SLOT + args.len());
        slots.push(receiver);
        slots.push(selector_handle);
        slots.extend_from_slice(args);
        CallFrame { slots }
    }

    /// The implicit first argument of the dispatch: the object the
    /// operation was invoked on.
    #[must_use]
    pub fn receiver(&self) -> RawValue {
        self.slots[0]
    }

    /// Positional argument `index` (0-based). A slot past what the
    /// caller materialized reads as the null slot, the way a register
    /// read past the populated arguments would.
    #[must_use]
    pub fn arg(&self, index: usize) -> RawValue {
        self.slots.get(Self::FIRST_ARG_SLOT + index).copied().unwrap_or(RawValue::NULL)
    }
}

/// Entry probe callback. Fires on whatever thread the intercepted call
/// executes on, before the implementation body runs. Implementations
/// must not share mutable state across probes.
pub type EntryProbe = Arc<dyn Fn(&CallFrame) + Send + Sync>;

#[derive(Error, Debug)]
pub enum EnumerateError {
    #[error("Class table walk failed: {0}")]
    TableWalk(String),
}

#[derive(Error, Debug)]
pub enum AttachError {
    #[error("No code at implementation address {addr}")]
    UnknownAddress { addr: ImplAddr },

    #[error("Implementation at {addr} rejected the probe: {reason}")]
    Rejected { addr: ImplAddr, reason: String },
}

#[derive(Error, Debug)]
pub enum DescribeError {
    #[error("{value} is not an object handle")]
    NotAnObject { value: RawValue },
}

/// A live runtime with dynamic, string-keyed message dispatch.
///
/// All methods are metadata reads except [`attach_entry_probe`], the
/// one primitive with a lasting side effect. Probes are one-shot to
/// install and live for the remainder of the process; there is no
/// detach.
///
/// [`attach_entry_probe`]: DispatchRuntime::attach_entry_probe
pub trait DispatchRuntime: Send + Sync {
    /// Walk the currently loaded classes exactly once. The walk is not
    /// restartable; re-calling re-walks a table that may have changed.
    ///
    /// # Errors
    /// Returns an error if the table itself cannot be walked. Fatal to
    /// the enumeration only, never to the process.
    fn loaded_classes(&self) -> Result<Vec<ClassDescriptor>, EnumerateError>;

    /// Look up one class by exact name.
    fn lookup_class(&self, name: &str) -> Option<ClassDescriptor>;

    /// Resolve a selector declared directly by `class` to its
    /// implementation entry point. Inherited declarations do not
    /// resolve.
    fn resolve_method(&self, class: &str, selector: &str) -> Option<ImplAddr>;

    /// Attach an entry probe at a resolved implementation address.
    /// Repeated attachment at the same address stacks independent
    /// probes; nothing deduplicates.
    ///
    /// # Errors
    /// Returns an error if the probe primitive rejects the address.
    /// No partial side effect remains on failure.
    fn attach_entry_probe(&self, addr: ImplAddr, probe: EntryProbe) -> Result<(), AttachError>;

    /// Native object-to-text conversion for one captured slot.
    ///
    /// # Errors
    /// Fails routinely for slots that are not object handles (primitive
    /// integers, foreign pointers). Callers degrade to the raw slot's
    /// fallback rendering, never propagate.
    fn describe(&self, value: RawValue) -> Result<String, DescribeError>;
}
