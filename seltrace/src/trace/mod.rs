//! Trace events, their fixed textual layout, and sinks.
//!
//! Events are transient: rendered, written, dropped. The stream is
//! append-only; nothing here persists or post-processes it.

use std::fmt::Write as _;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use seltrace_runtime::Description;

/// One intercepted invocation: emitted at entry time, before the
/// implementation body runs. Return values are out of scope.
#[derive(Debug, Clone)]
pub struct TraceEvent {
    pub class: String,
    pub selector: String,
    pub receiver: Description,
    /// One description per positional argument, in call order. Length
    /// always equals the selector's arity.
    pub args: Vec<Description>,
}

impl TraceEvent {
    /// Fixed layout: a header line identifying class, selector, and
    /// receiver, then one indented line per positional argument with
    /// its ordinal position.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "[+] {} {} self={}", self.class, self.selector, self.receiver);
        for (i, arg) in self.args.iter().enumerate() {
            let _ = writeln!(out, "    arg{i}: {arg}");
        }
        out
    }
}

/// Where probes deliver events. Probes fire on arbitrary threads, so a
/// sink must tolerate concurrent emission without corrupting event
/// boundaries.
pub trait TraceSink: Send + Sync {
    fn emit(&self, event: &TraceEvent);
}

/// Renders each event to one string and writes it in a single locked
/// write, so concurrent probes never interleave fields of different
/// events on the stream.
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        WriterSink { writer: Mutex::new(writer) }
    }
}

impl<W: Write + Send> TraceSink for WriterSink<W> {
    fn emit(&self, event: &TraceEvent) {
        let block = event.render();
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        // A failed write must not propagate into the probe.
        let _ = writer.write_all(block.as_bytes());
        let _ = writer.flush();
    }
}

/// Collects events in memory. Test sink.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<TraceEvent>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TraceSink for MemorySink {
    fn emit(&self, event: &TraceEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event.clone());
    }
}
