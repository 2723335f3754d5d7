use std::path::{Path, PathBuf};

use crate::config::{Config, Layout};
use crate::error::Result;

pub struct AppContext {
    pub project_root: PathBuf,
    pub config: Config,
    pub layout: Layout,
    pub robot_mode: bool,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let project_root = match &cli.project_root {
            Some(root) => root.clone(),
            None => Self::find_project_root()?,
        };
        let config = Config::load(&project_root)?;
        let layout = config.layout(&project_root);

        Ok(Self {
            project_root,
            config,
            layout,
            robot_mode: cli.robot,
            verbosity: cli.verbose,
        })
    }

    /// The nearest ancestor carrying engine state, or the cwd itself for a
    /// project that has never been replayed.
    fn find_project_root() -> Result<PathBuf> {
        if let Ok(root) = std::env::var("SF_PROJECT_ROOT") {
            return Ok(PathBuf::from(root));
        }
        let cwd = std::env::current_dir()?;
        if let Some(found) = find_upwards(&cwd, ".skillfuse")? {
            return Ok(found);
        }
        Ok(cwd)
    }
}

fn find_upwards(start: &Path, name: &str) -> Result<Option<PathBuf>> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(name).is_dir() {
            return Ok(Some(dir.to_path_buf()));
        }
        current = dir.parent();
    }
    Ok(None)
}
