//! sf replay - reset to base and reapply skills in order

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use crate::app::AppContext;
use crate::engine::{ReplayEngine, ReplayRequest, ReplayResult};
use crate::error::{Result, SfError};
use crate::manifest::MANIFEST_FILE;

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Skills to apply, in order
    #[arg(required = true, value_name = "SKILL")]
    pub skills: Vec<String>,
}

pub fn run(ctx: &AppContext, args: &ReplayArgs) -> Result<()> {
    let mut skill_dirs = BTreeMap::new();
    for name in &args.skills {
        if let Some(dir) = find_skill_dir(name, &ctx.layout.skills_dir) {
            debug!(skill = %name, dir = %dir.display(), "discovered skill package");
            skill_dirs.insert(name.clone(), dir);
        }
    }

    let request = ReplayRequest {
        skills: args.skills.clone(),
        skill_dirs,
        project_root: ctx.project_root.clone(),
    };
    let engine = ReplayEngine::new(ctx.layout.clone());
    let result = engine.replay(&request)?;

    stash_conflict_preimages(ctx, &result)?;

    if ctx.robot_mode {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|err| SfError::Serialization(err.to_string()))?;
        println!("{json}");
    } else {
        print_result(ctx, &result);
    }

    if result.success {
        Ok(())
    } else {
        Err(SfError::ReplayFailed(
            result
                .error
                .unwrap_or_else(|| "one or more skills failed".to_string()),
        ))
    }
}

/// Locate a skill package directory by name under the skills root.
#[must_use]
pub fn find_skill_dir(name: &str, skills_dir: &Path) -> Option<PathBuf> {
    let dir = skills_dir.join(name);
    if dir.join(MANIFEST_FILE).is_file() {
        Some(dir)
    } else {
        None
    }
}

/// Persist each conflict's reconstructed preimage so `sf resolution approve`
/// can pair it with the hand-merged file later.
fn stash_conflict_preimages(ctx: &AppContext, result: &ReplayResult) -> Result<()> {
    for outcome in result.per_skill.values() {
        for conflict in &outcome.conflicts {
            let path = ctx
                .layout
                .conflicts_dir()
                .join(format!("{}.preimage", conflict.rel_path));
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &conflict.preimage)?;
        }
    }
    Ok(())
}

fn print_result(ctx: &AppContext, result: &ReplayResult) {
    for (name, outcome) in &result.per_skill {
        if outcome.success {
            println!("applied {name}");
        } else {
            println!(
                "failed  {name}: {}",
                outcome.error.as_deref().unwrap_or("unknown error")
            );
            for conflict in &outcome.conflicts {
                println!(
                    "        conflict in {} (preimage saved under {})",
                    conflict.rel_path,
                    ctx.layout.conflicts_dir().display()
                );
                println!(
                    "        hand-merge the file, then run: sf resolution approve {} --skills {}",
                    conflict.rel_path,
                    result
                        .per_skill
                        .keys()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(",")
                );
            }
        }
    }
}
