//! sf resolution - inspect and approve conflict resolutions

use clap::{Args, Subcommand};

use crate::CORE_VERSION;
use crate::app::AppContext;
use crate::error::{Result, SfError};
use crate::resolution::{ResolutionEntry, ResolutionMeta, find_resolution_dir, save_resolution};

#[derive(Args, Debug)]
pub struct ResolutionArgs {
    #[command(subcommand)]
    pub action: ResolutionAction,
}

#[derive(Subcommand, Debug)]
pub enum ResolutionAction {
    /// Print the cached resolution directory for a skill set, if any
    Find {
        #[arg(required = true, value_name = "SKILL")]
        skills: Vec<String>,
    },
    /// Record the hand-merged working file as the approved resolution for
    /// the most recent conflict on a path
    Approve {
        /// Project-relative path that conflicted
        rel_path: String,
        /// Comma-separated skill set the conflict arose under
        #[arg(long, value_delimiter = ',', required = true)]
        skills: Vec<String>,
    },
}

pub fn run(ctx: &AppContext, args: &ResolutionArgs) -> Result<()> {
    match &args.action {
        ResolutionAction::Find { skills } => {
            match find_resolution_dir(skills, &ctx.layout) {
                Some(dir) => println!("{}", dir.display()),
                None => println!("not found"),
            }
            Ok(())
        }
        ResolutionAction::Approve { rel_path, skills } => approve(ctx, rel_path, skills),
    }
}

fn approve(ctx: &AppContext, rel_path: &str, skills: &[String]) -> Result<()> {
    let preimage_path = ctx
        .layout
        .conflicts_dir()
        .join(format!("{rel_path}.preimage"));
    if !preimage_path.exists() {
        return Err(SfError::Config(format!(
            "no pending conflict recorded for {rel_path}; run sf replay first"
        )));
    }
    let preimage = std::fs::read_to_string(&preimage_path)?;

    let resolved_path = ctx.project_root.join(rel_path);
    if !resolved_path.exists() {
        return Err(SfError::Config(format!(
            "{rel_path} does not exist in the working tree"
        )));
    }
    let resolution = std::fs::read_to_string(&resolved_path)?;

    let dir = save_resolution(
        skills,
        &[ResolutionEntry {
            rel_path: rel_path.to_string(),
            preimage,
            resolution,
        }],
        ResolutionMeta {
            core_version: Some(CORE_VERSION.to_string()),
            ..ResolutionMeta::default()
        },
        &ctx.layout,
    )?;
    std::fs::remove_file(&preimage_path)?;

    if !ctx.robot_mode {
        println!("resolution saved to {}", dir.display());
    }
    Ok(())
}
