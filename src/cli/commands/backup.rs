//! sf backup - manage the ad hoc backup set

use clap::{Args, Subcommand};

use crate::app::AppContext;
use crate::error::Result;
use crate::snapshot::SnapshotStore;

#[derive(Args, Debug)]
pub struct BackupArgs {
    #[command(subcommand)]
    pub action: BackupAction,
}

#[derive(Subcommand, Debug)]
pub enum BackupAction {
    /// Snapshot the given files before a risky operation
    Create {
        /// Project-relative paths to back up (missing paths are skipped)
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,
    },
    /// Copy every backed-up file back into the working tree
    Restore,
    /// Discard the current backup set
    Clear,
}

pub fn run(ctx: &AppContext, args: &BackupArgs) -> Result<()> {
    let store = SnapshotStore::new(&ctx.layout);
    match &args.action {
        BackupAction::Create { paths } => {
            store.create_backup(paths)?;
            if !ctx.robot_mode {
                println!("backed up {} path(s)", paths.len());
            }
        }
        BackupAction::Restore => {
            store.restore_backup()?;
            if !ctx.robot_mode {
                println!("backup restored");
            }
        }
        BackupAction::Clear => {
            store.clear_backup()?;
            if !ctx.robot_mode {
                println!("backup cleared");
            }
        }
    }
    Ok(())
}
