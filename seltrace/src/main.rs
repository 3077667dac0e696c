//! # seltrace - Main Entry Point
//!
//! Loads a class-table image and a trace plan, runs the advisory
//! discovery pass, installs the planned hooks, and (optionally) replays
//! a recorded call log through them. The discovery report and the trace
//! stream go to stdout; per-hook statuses and the run summary go
//! through the log and stderr.

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::warn;
use std::sync::Arc;

use seltrace::cli::Args;
use seltrace::discovery::{discover, write_report};
use seltrace::hooks::HookRegistry;
use seltrace::plan::TracePlan;
use seltrace::replay::{replay, CallLog, RuntimeImage};
use seltrace::trace::{TraceSink, WriterSink};
use seltrace_runtime::DispatchRuntime;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.to_string().to_lowercase().contains("nothing to do") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;

    let plan = TracePlan::from_file(&args.plan)?;
    if plan.keywords.is_empty() && plan.hooks.is_empty() {
        bail!(
            "Nothing to do: the plan has no keywords and no hooks.\n\n\
             Add a \"keywords\" list for discovery or a \"hooks\" list\n\
             of {{class, selector}} pairs to {}",
            args.plan.display()
        );
    }

    let image = RuntimeImage::from_file(&args.image)?;
    let table = Arc::new(image.build());
    let runtime: Arc<dyn DispatchRuntime> = Arc::clone(&table) as Arc<dyn DispatchRuntime>;

    if !quiet {
        println!("seltrace v{}", env!("CARGO_PKG_VERSION"));
        println!("image: {} ({} classes)", args.image.display(), image.classes.len());
    }

    // Advisory discovery pass. A failure here is fatal to the pass
    // only; installation below is independent and proceeds.
    if !args.skip_discovery && !plan.keywords.is_empty() {
        match discover(runtime.as_ref(), &plan.keywords) {
            Ok(discovery) => {
                let stdout = std::io::stdout();
                write_report(&mut stdout.lock(), &plan.keywords, discovery)
                    .context("Failed to write discovery report")?;
            }
            Err(e) => warn!("Discovery pass failed: {e}"),
        }
    }

    let sink: Arc<dyn TraceSink> = Arc::new(WriterSink::new(std::io::stdout()));
    let mut registry = HookRegistry::new(Arc::clone(&runtime), sink);
    let statuses = registry.install_all(&plan.hooks);
    let installed = statuses.iter().filter(|s| s.is_ok()).count();

    if !quiet {
        println!("hooks: {installed}/{} installed", plan.hooks.len());
    }

    if let Some(ref calls_path) = args.calls {
        let log = CallLog::from_file(calls_path)?;
        let stats = replay(&table, &log);
        eprintln!(
            "replayed: {} calls ({} undeliverable), {} hooks live",
            stats.dispatched,
            stats.undeliverable,
            registry.len()
        );
    }

    Ok(())
}
