//! # Shared Runtime Model (engine ↔ dispatch runtime)
//!
//! Defines the data model and the seam between the tracing engine and a
//! live string-keyed dispatch runtime: class/method snapshots, selector
//! arity, raw call slots, human-readable descriptions, and the
//! [`DispatchRuntime`] trait the engine drives.
//!
//! ## Key Types
//!
//! - [`DispatchRuntime`] - Trait a live runtime implements (class table
//!   walk, method resolution, probe attachment, native value-to-text)
//! - [`ClassDescriptor`] / [`MethodDescriptor`] - Read-only snapshots of
//!   one loaded class and its own (non-inherited) methods
//! - [`CallFrame`] - Slot layout of one dispatched call as seen by an
//!   entry probe
//! - [`RawValue`] / [`Description`] - One captured slot and its
//!   guaranteed-non-failing textual rendering
//! - [`TableRuntime`] - In-memory implementation backing tests, demos,
//!   and replay

pub mod class;
pub mod runtime;
pub mod selector;
pub mod table;
pub mod value;

pub use class::{ClassDescriptor, MethodDescriptor};
pub use runtime::{
    AttachError, CallFrame, DescribeError, DispatchRuntime, EntryProbe, EnumerateError, ImplAddr,
};
pub use table::{DispatchError, MethodBody, TableRuntime};
pub use value::{Description, RawValue};
