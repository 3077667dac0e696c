//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "seltrace",
    about = "Trace method entries in a string-keyed dispatch runtime",
    after_help = "\
EXAMPLES:
    seltrace --image runtime.json --plan plan.json                     Discovery only
    seltrace --image runtime.json --plan plan.json --calls calls.json  Hook and trace a call log
    seltrace --image runtime.json --plan plan.json --skip-discovery    Hooks only"
)]
pub struct Args {
    /// Class-table image to load (JSON snapshot of the observed runtime)
    #[arg(long, value_name = "FILE")]
    pub image: PathBuf,

    /// Trace plan: keyword filters and (class, selector) hook pairs
    #[arg(long, value_name = "FILE")]
    pub plan: PathBuf,

    /// Recorded call log to replay through the installed hooks
    #[arg(long, value_name = "FILE")]
    pub calls: Option<PathBuf>,

    /// Skip the discovery pass (install hooks only)
    #[arg(long)]
    pub skip_discovery: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}
