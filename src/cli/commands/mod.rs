//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod backup;
pub mod replay;
pub mod resolution;

use crate::app::AppContext;
use crate::error::Result;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reset the working tree to base and reapply skills in order
    Replay(replay::ReplayArgs),

    /// Manage the ad hoc backup set
    Backup(backup::BackupArgs),

    /// Inspect and approve conflict resolutions
    Resolution(resolution::ResolutionArgs),
}

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Replay(args) => replay::run(ctx, args),
        Commands::Backup(args) => backup::run(ctx, args),
        Commands::Resolution(args) => resolution::run(ctx, args),
    }
}
