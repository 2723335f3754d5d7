//! Persistent cache of hand-approved conflict resolutions.
//!
//! Entries are keyed by the set of skills whose combination produced the
//! conflict: names sorted, deduplicated and joined with `+`. Two roots are
//! consulted: the shipped root bundled with the distribution (read-only,
//! authoritative) and the project-level root written by [`save_resolution`].
//! Shipped entries always win for the same key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Layout;
use crate::error::{Result, SfError};

pub const META_FILE: &str = "meta.yaml";
pub const PREIMAGE_SUFFIX: &str = ".preimage";
pub const RESOLUTION_SUFFIX: &str = ".resolution";

/// One cached file resolution: the conflicted content the engine
/// reconstructed when the conflict first occurred, and the hand-approved
/// final content that replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionEntry {
    pub rel_path: String,
    pub preimage: String,
    pub resolution: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionMeta {
    /// Sorted skill names this resolution applies to.
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub core_version: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Sorted, deduplicated, `+`-joined skill names. Input order never affects
/// the key.
#[must_use]
pub fn cache_key<S: AsRef<str>>(skills: &[S]) -> String {
    let mut names: Vec<&str> = skills.iter().map(AsRef::as_ref).collect();
    names.sort_unstable();
    names.dedup();
    names.join("+")
}

/// Locate the resolution directory for a skill set: shipped root first,
/// then the project-level root. Returns `None` when neither exists or the
/// skill set is empty (an empty key would name the roots themselves).
#[must_use]
pub fn find_resolution_dir<S: AsRef<str>>(skills: &[S], layout: &Layout) -> Option<PathBuf> {
    let key = cache_key(skills);
    if key.is_empty() {
        return None;
    }

    let shipped = layout.shipped_resolutions_dir.join(&key);
    if shipped.is_dir() {
        return Some(shipped);
    }
    let project = layout.resolutions_dir().join(&key);
    if project.is_dir() {
        return Some(project);
    }
    None
}

/// Write a project-level resolution directory for a skill set, overwriting
/// any existing entries for the same paths.
pub fn save_resolution<S: AsRef<str>>(
    skills: &[S],
    entries: &[ResolutionEntry],
    mut meta: ResolutionMeta,
    layout: &Layout,
) -> Result<PathBuf> {
    let key = cache_key(skills);
    let dir = layout.resolutions_dir().join(&key);
    std::fs::create_dir_all(&dir)?;

    meta.skills = key.split('+').map(str::to_string).collect();
    let meta_yaml = serde_yaml::to_string(&meta)
        .map_err(|err| SfError::Serialization(format!("resolution meta: {err}")))?;
    std::fs::write(dir.join(META_FILE), meta_yaml)?;

    for entry in entries {
        let preimage_path = dir.join(format!("{}{PREIMAGE_SUFFIX}", entry.rel_path));
        if let Some(parent) = preimage_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&preimage_path, &entry.preimage)?;
        std::fs::write(
            dir.join(format!("{}{RESOLUTION_SUFFIX}", entry.rel_path)),
            &entry.resolution,
        )?;
    }

    debug!(key = %key, entries = entries.len(), "saved resolution");
    Ok(dir)
}

/// Read the cached preimage/resolution pair for a path inside a resolution
/// directory, or `None` if the pair is incomplete.
pub fn load_entry(dir: &Path, rel_path: &str) -> Result<Option<ResolutionEntry>> {
    let preimage_path = dir.join(format!("{rel_path}{PREIMAGE_SUFFIX}"));
    let resolution_path = dir.join(format!("{rel_path}{RESOLUTION_SUFFIX}"));
    if !preimage_path.exists() || !resolution_path.exists() {
        return Ok(None);
    }
    Ok(Some(ResolutionEntry {
        rel_path: rel_path.to_string(),
        preimage: std::fs::read_to_string(&preimage_path)?,
        resolution: std::fs::read_to_string(&resolution_path)?,
    }))
}

pub fn load_meta(dir: &Path) -> Result<ResolutionMeta> {
    let raw = std::fs::read_to_string(dir.join(META_FILE))?;
    serde_yaml::from_str(&raw)
        .map_err(|err| SfError::Serialization(format!("resolution meta: {err}")))
}
