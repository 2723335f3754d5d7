//! Command-line interface for sf.

pub mod commands;

use std::path::PathBuf;

use clap::Parser;

pub use commands::Commands;

#[derive(Parser, Debug)]
#[command(name = "sf", version, about = "Compose skill packages onto a base codebase")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root (defaults to the nearest ancestor with engine state,
    /// else the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub project_root: Option<PathBuf>,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}
