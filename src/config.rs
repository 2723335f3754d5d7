//! Project layout configuration.
//!
//! All engine state lives under fixed, configurable directories relative to
//! the project root. Defaults match the shipped layout; a `skillfuse.toml`
//! at the project root may override individual fields.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SfError};

pub const CONFIG_FILE: &str = "skillfuse.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hidden per-project state root (base snapshot, backup set,
    /// project-level resolutions, pending conflict preimages).
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
    /// Where skill packages live: `<skills_dir>/<name>/manifest.yaml`.
    #[serde(default = "default_skills_dir")]
    pub skills_dir: String,
    /// Read-only resolutions bundled with the distribution. Entries here
    /// always win over project-level ones for the same cache key.
    #[serde(default = "default_shipped_resolutions_dir")]
    pub shipped_resolutions_dir: String,
}

fn default_state_dir() -> String {
    ".skillfuse".to_string()
}

fn default_skills_dir() -> String {
    "skills".to_string()
}

fn default_shipped_resolutions_dir() -> String {
    "resolutions".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            skills_dir: default_skills_dir(),
            shipped_resolutions_dir: default_shipped_resolutions_dir(),
        }
    }
}

impl Config {
    pub fn load(project_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let path = project_root.join(CONFIG_FILE);
        if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|err| SfError::Config(format!("read {}: {err}", path.display())))?;
            config = toml::from_str(&raw)
                .map_err(|err| SfError::Config(format!("parse {}: {err}", path.display())))?;
        }

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("SF_STATE_DIR") {
            if !dir.is_empty() {
                self.state_dir = dir;
            }
        }
    }

    pub fn layout(&self, project_root: &Path) -> Layout {
        Layout {
            project_root: project_root.to_path_buf(),
            state_dir: project_root.join(&self.state_dir),
            skills_dir: project_root.join(&self.skills_dir),
            shipped_resolutions_dir: project_root.join(&self.shipped_resolutions_dir),
        }
    }
}

/// Resolved absolute paths for one project.
#[derive(Debug, Clone)]
pub struct Layout {
    pub project_root: PathBuf,
    pub state_dir: PathBuf,
    pub skills_dir: PathBuf,
    pub shipped_resolutions_dir: PathBuf,
}

impl Layout {
    /// Layout with default directory names, used by the engine's library
    /// entry points when no config file is consulted.
    #[must_use]
    pub fn with_defaults(project_root: &Path) -> Self {
        Config::default().layout(project_root)
    }

    #[must_use]
    pub fn base_dir(&self) -> PathBuf {
        self.state_dir.join("base")
    }

    #[must_use]
    pub fn backup_dir(&self) -> PathBuf {
        self.state_dir.join("backup")
    }

    #[must_use]
    pub fn resolutions_dir(&self) -> PathBuf {
        self.state_dir.join("resolutions")
    }

    #[must_use]
    pub fn conflicts_dir(&self) -> PathBuf {
        self.state_dir.join("conflicts")
    }

    /// Ledger of paths added by the most recent replay, used to sweep
    /// stale additions before the next one.
    #[must_use]
    pub fn added_paths_file(&self) -> PathBuf {
        self.state_dir.join("added_paths.yaml")
    }

    #[must_use]
    pub fn skill_dir(&self, name: &str) -> PathBuf {
        self.skills_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_no_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.state_dir, ".skillfuse");
        assert_eq!(config.skills_dir, "skills");
        assert_eq!(config.shipped_resolutions_dir, "resolutions");
    }

    #[test]
    fn config_file_overrides_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "state_dir = \".fuse-state\"\n",
        )
        .unwrap();

        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.state_dir, ".fuse-state");
        // Unset fields keep their defaults.
        assert_eq!(config.skills_dir, "skills");
    }

    #[test]
    fn layout_joins_project_root() {
        let layout = Layout::with_defaults(Path::new("/proj"));
        assert_eq!(layout.base_dir(), Path::new("/proj/.skillfuse/base"));
        assert_eq!(layout.backup_dir(), Path::new("/proj/.skillfuse/backup"));
        assert_eq!(
            layout.skill_dir("telegram"),
            Path::new("/proj/skills/telegram")
        );
    }
}
