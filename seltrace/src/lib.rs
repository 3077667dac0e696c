//! # seltrace - Method Entry Tracing for String-Keyed Dispatch Runtimes
//!
//! seltrace attaches read-only entry probes to methods of a live
//! object runtime that dispatches by (class name, selector text). It
//! never modifies behavior or return values; each intercepted call is
//! rendered as one trace block on the stream and execution continues
//! unchanged.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │            Live Dispatch Runtime (class table)           │
//! │        seltrace_runtime::DispatchRuntime (the seam)      │
//! └──────────────┬──────────────────────────┬────────────────┘
//!                │ metadata reads           │ probe attach + calls
//!                ▼                          ▼
//!       ┌──────────────┐           ┌──────────────┐
//!       │  Discovery   │           │    Hooks     │
//!       │  (scanner)   │           │ (installer + │
//!       │              │           │  registry)   │
//!       └──────┬───────┘           └──────┬───────┘
//!              │ report                   │ TraceEvents
//!              ▼                          ▼
//!       ┌──────────────┐           ┌──────────────┐
//!       │   stdout     │           │  TraceSink   │
//!       └──────────────┘           └──────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`discovery`]: keyword-filtered survey of the class table.
//!   Read-only and advisory; reports classes whose name and own
//!   selectors both match, then a completion marker.
//!
//! - [`hooks`]: the only component with a lasting side effect.
//!   `installer` resolves a (class, selector) pair, derives arity from
//!   the selector shape, and attaches an entry probe; `registry` keeps
//!   the append-only arena of installed hooks.
//!
//! - [`trace`]: trace events, the fixed textual layout, and sinks that
//!   tolerate concurrent probes without interleaving events.
//!
//! - [`plan`]: operator configuration - keyword filters and the ordered
//!   list of (class, selector) pairs to install eagerly.
//!
//! - [`replay`]: class-table images and recorded call logs for driving
//!   an in-process table runtime, the non-attached analog of tracing a
//!   live target.
//!
//! - [`cli`] / [`domain`]: argument parsing, core error types.
//!
//! ## Typical Usage
//!
//! ```bash
//! # Survey a class-table image and trace a recorded call log
//! seltrace --image runtime.json --plan plan.json --calls calls.json
//!
//! # Install hooks only, skip the discovery pass
//! seltrace --image runtime.json --plan plan.json --skip-discovery
//! ```

pub mod cli;
pub mod discovery;
pub mod domain;
pub mod hooks;
pub mod plan;
pub mod replay;
pub mod trace;
