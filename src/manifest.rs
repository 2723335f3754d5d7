//! Skill package manifests.
//!
//! A skill package is a directory holding a `manifest.yaml` plus the literal
//! contents it ships: `add/<rel>` for every path in `adds` and `modify/<rel>`
//! for every path in `modifies`. Modified files are full post-images of the
//! file as it looks after the skill's edit is applied to the base; the engine
//! derives the diff itself.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SfError};

pub const MANIFEST_FILE: &str = "manifest.yaml";
pub const ADD_DIR: &str = "add";
pub const MODIFY_DIR: &str = "modify";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkillManifest {
    /// Unique skill name.
    pub skill: String,
    pub version: String,
    /// Engine version this skill was authored against.
    pub core_version: String,
    #[serde(default)]
    pub adds: Vec<String>,
    #[serde(default)]
    pub modifies: Vec<String>,
}

impl SkillManifest {
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let manifest: Self = serde_yaml::from_str(input)
            .map_err(|err| SfError::ManifestInvalid(format!("YAML parse error: {err}")))?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|err| SfError::Serialization(format!("manifest YAML: {err}")))
    }

    pub fn validate(&self) -> Result<()> {
        validate_required("skill", &self.skill)?;
        validate_semver("version", &self.version)?;
        validate_semver("core_version", &self.core_version)?;

        let mut seen = HashSet::new();
        for rel in self.adds.iter().chain(&self.modifies) {
            validate_rel_path(rel)?;
            if !seen.insert(rel.as_str()) {
                return Err(SfError::ManifestInvalid(format!(
                    "path listed more than once: {rel}"
                )));
            }
        }
        Ok(())
    }

    /// Whether this skill was authored against a compatible engine version.
    /// Informational only; an incompatible skill is still replayed.
    #[must_use]
    pub fn core_compatible(&self, engine_version: &str) -> bool {
        let Ok(engine) = Version::parse(engine_version) else {
            return false;
        };
        match VersionReq::parse(&format!("^{}", self.core_version)) {
            Ok(req) => req.matches(&engine),
            Err(_) => false,
        }
    }
}

/// A skill package rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct SkillPackage {
    root: PathBuf,
    manifest: SkillManifest,
}

impl SkillPackage {
    pub fn load(dir: &Path) -> Result<Self> {
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(SfError::ManifestNotFound(dir.to_path_buf()));
        }
        let raw = std::fs::read_to_string(&manifest_path)?;
        let manifest = SkillManifest::from_yaml_str(&raw)?;
        Ok(Self {
            root: dir.to_path_buf(),
            manifest,
        })
    }

    #[must_use]
    pub fn manifest(&self) -> &SkillManifest {
        &self.manifest
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Literal content to place at an added path.
    pub fn added_content(&self, rel: &str) -> Result<String> {
        self.shipped_content(ADD_DIR, rel)
    }

    /// Full post-image of a modified path.
    pub fn modified_content(&self, rel: &str) -> Result<String> {
        self.shipped_content(MODIFY_DIR, rel)
    }

    fn shipped_content(&self, kind: &str, rel: &str) -> Result<String> {
        let path = self.root.join(kind).join(rel);
        if !path.exists() {
            return Err(SfError::ManifestInvalid(format!(
                "skill '{}' declares {rel} but ships no {kind}/{rel}",
                self.manifest.skill
            )));
        }
        Ok(std::fs::read_to_string(&path)?)
    }
}

fn validate_required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SfError::ManifestInvalid(format!(
            "{field} must be non-empty"
        )));
    }
    Ok(())
}

fn validate_semver(field: &str, value: &str) -> Result<()> {
    Version::parse(value)
        .map_err(|err| SfError::ManifestInvalid(format!("{field} must be valid semver: {err}")))?;
    Ok(())
}

/// Skill paths must stay inside the project root: relative, no `..`.
fn validate_rel_path(rel: &str) -> Result<()> {
    let path = Path::new(rel);
    if path.is_absolute() {
        return Err(SfError::ManifestInvalid(format!("absolute path: {rel}")));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            _ => {
                return Err(SfError::ManifestInvalid(format!(
                    "path escapes project root: {rel}"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = "\
skill: telegram
version: 1.0.0
core_version: 0.1.0
adds:
  - src/telegram.ts
modifies:
  - src/config.ts
";

    #[test]
    fn yaml_roundtrip_parsing() {
        let manifest = SkillManifest::from_yaml_str(SAMPLE_YAML).unwrap();
        assert_eq!(manifest.skill, "telegram");
        assert_eq!(manifest.adds, vec!["src/telegram.ts"]);
        assert_eq!(manifest.modifies, vec!["src/config.ts"]);

        let serialized = manifest.to_yaml_string().unwrap();
        let reparsed = SkillManifest::from_yaml_str(&serialized).unwrap();
        assert_eq!(manifest, reparsed);
    }

    #[test]
    fn validate_rejects_overlapping_adds_and_modifies() {
        let yaml = "\
skill: bad
version: 1.0.0
core_version: 0.1.0
adds: [src/a.ts]
modifies: [src/a.ts]
";
        let err = SkillManifest::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn validate_rejects_traversal_paths() {
        for rel in ["../outside.ts", "/etc/passwd"] {
            let yaml = format!(
                "skill: bad\nversion: 1.0.0\ncore_version: 0.1.0\nadds: ['{rel}']\n"
            );
            assert!(SkillManifest::from_yaml_str(&yaml).is_err(), "{rel}");
        }
    }

    #[test]
    fn validate_rejects_bad_semver() {
        let yaml = "skill: bad\nversion: not-a-version\ncore_version: 0.1.0\n";
        let err = SkillManifest::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn core_compatible_uses_caret_semantics() {
        let manifest = SkillManifest::from_yaml_str(SAMPLE_YAML).unwrap();
        assert!(manifest.core_compatible("0.1.5"));
        assert!(!manifest.core_compatible("0.2.0"));
    }

    #[test]
    fn load_reports_missing_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let err = SkillPackage::load(tmp.path()).unwrap_err();
        assert!(matches!(err, SfError::ManifestNotFound(_)));
    }

    #[test]
    fn load_reads_shipped_contents() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(MANIFEST_FILE), SAMPLE_YAML).unwrap();
        std::fs::create_dir_all(tmp.path().join("add/src")).unwrap();
        std::fs::write(tmp.path().join("add/src/telegram.ts"), "tg code\n").unwrap();

        let package = SkillPackage::load(tmp.path()).unwrap();
        assert_eq!(
            package.added_content("src/telegram.ts").unwrap(),
            "tg code\n"
        );
        // Declared but not shipped.
        assert!(package.modified_content("src/config.ts").is_err());
    }
}
