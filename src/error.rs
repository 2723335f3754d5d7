//! Error taxonomy for the patch-replay engine.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SfError>;

#[derive(Debug, Error)]
pub enum SfError {
    /// A requested skill has no package directory supplied or discoverable.
    /// Fatal to that skill; other skills in the request are still attempted.
    #[error("missing skill package: {0}")]
    MissingSkillPackage(String),

    /// The package directory exists but contains no manifest.
    #[error("no manifest.yaml in {0}")]
    ManifestNotFound(PathBuf),

    /// The manifest is present but malformed or fails validation.
    #[error("invalid manifest: {0}")]
    ManifestInvalid(String),

    /// A skill's patch could not be placed against the current working
    /// content and no cached resolution matched.
    #[error("merge conflict applying skill '{skill}' to {path}")]
    MergeConflict { skill: String, path: String },

    /// Overall replay failure surfaced to the CLI once per-skill results
    /// have been reported.
    #[error("replay failed: {0}")]
    ReplayFailed(String),

    /// The underlying storage medium failed. Fatal to the whole replay.
    #[error("storage failure: {0}")]
    Storage(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
