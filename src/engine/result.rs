//! Replay request and structured result types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One replay invocation: an ordered skill list, a mapping from skill name
/// to package directory, and the project root to compose into. Order is part
/// of the contract: each skill observes the accumulated output of all
/// earlier skills.
#[derive(Debug, Clone)]
pub struct ReplayRequest {
    pub skills: Vec<String>,
    pub skill_dirs: BTreeMap<String, PathBuf>,
    pub project_root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub per_skill: BTreeMap<String, SkillOutcome>,
}

impl ReplayResult {
    #[must_use]
    pub fn new() -> Self {
        Self {
            success: true,
            error: None,
            per_skill: BTreeMap::new(),
        }
    }

    /// Record a skill failure and propagate it to the overall flags.
    pub fn fail_skill(&mut self, skill: &str, outcome: SkillOutcome) {
        self.success = false;
        if self.error.is_none() {
            self.error = outcome.error.clone();
        }
        self.per_skill.insert(skill.to_string(), outcome);
    }
}

impl Default for ReplayResult {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<ConflictRecord>,
}

impl SkillOutcome {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            conflicts: Vec::new(),
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            conflicts: Vec::new(),
        }
    }
}

/// An unresolved merge conflict: the path that could not be patched and the
/// reconstructed conflicted content at the moment of failure. The preimage
/// is what a hand-approved resolution is keyed against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub rel_path: String,
    pub preimage: String,
}
