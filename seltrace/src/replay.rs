//! Class-table images and recorded call logs.
//!
//! A `RuntimeImage` is a JSON snapshot of a live class table; a
//! `CallLog` is a recording of invocations. Together they let the
//! binary exercise the full pipeline in-process: build a
//! [`TableRuntime`] from the image, install hooks against it, then push
//! the recorded calls through dispatch so the probes fire exactly as
//! they would in the observed process.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;
use seltrace_runtime::{RawValue, TableRuntime};

/// One class in an image: name, optional superclass link, own
/// selectors in declaration order.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassImage {
    pub name: String,

    #[serde(default)]
    pub superclass: Option<String>,

    #[serde(default)]
    pub methods: Vec<String>,
}

/// Snapshot of a class table.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeImage {
    pub classes: Vec<ClassImage>,
}

impl RuntimeImage {
    /// Parse an image file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid
    /// image JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read image file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid runtime image in {}", path.display()))
    }

    /// Populate a fresh table runtime from this image. Classes land in
    /// listed order; a superclass named but never listed simply ends
    /// the chain at dispatch time.
    #[must_use]
    pub fn build(&self) -> TableRuntime {
        let runtime = TableRuntime::new();
        for class in &self.classes {
            runtime.define_class(&class.name, class.superclass.as_deref());
        }
        for class in &self.classes {
            for selector in &class.methods {
                // The class was just defined; the insert cannot miss.
                let _ = runtime.define_method(&class.name, selector);
            }
        }
        runtime
    }
}

/// One recorded slot: either a named object (interned once per name,
/// with the given text as its native description) or raw foreign bits.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SlotImage {
    Object { object: String },
    Raw(u64),
}

/// One recorded invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct CallRecord {
    pub class: String,
    pub selector: String,
    pub receiver: SlotImage,

    #[serde(default)]
    pub args: Vec<SlotImage>,
}

/// A recorded sequence of invocations.
#[derive(Debug, Clone, Deserialize)]
pub struct CallLog {
    pub calls: Vec<CallRecord>,
}

impl CallLog {
    /// Parse a call log file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid
    /// call log JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read call log {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid call log in {}", path.display()))
    }
}

/// Outcome of one replay pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub dispatched: usize,
    pub undeliverable: usize,
}

/// Push every recorded call through dispatch. An undeliverable call
/// (unknown class or unrecognized selector) is logged and skipped;
/// the rest of the log proceeds.
pub fn replay(runtime: &TableRuntime, log: &CallLog) -> ReplayStats {
    let mut objects: HashMap<String, RawValue> = HashMap::new();
    let mut stats = ReplayStats::default();
    for call in &log.calls {
        let receiver = intern(runtime, &mut objects, &call.receiver);
        let args: Vec<RawValue> =
            call.args.iter().map(|slot| intern(runtime, &mut objects, slot)).collect();
        match runtime.dispatch(&call.class, &call.selector, receiver, &args) {
            Ok(()) => stats.dispatched += 1,
            Err(err) => {
                warn!("Undeliverable call: {err}");
                stats.undeliverable += 1;
            }
        }
    }
    stats
}

/// Raw slots pass through untouched; named objects are registered once
/// and reuse the same handle on every later appearance, so a recorded
/// receiver keeps its identity across calls.
fn intern(
    runtime: &TableRuntime,
    objects: &mut HashMap<String, RawValue>,
    slot: &SlotImage,
) -> RawValue {
    match slot {
        SlotImage::Raw(bits) => RawValue(*bits),
        SlotImage::Object { object } => {
            if let Some(handle) = objects.get(object) {
                *handle
            } else {
                let handle = runtime.register_object(object);
                objects.insert(object.clone(), handle);
                handle
            }
        }
    }
}
