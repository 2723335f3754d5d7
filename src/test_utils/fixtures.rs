use std::collections::BTreeMap;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::config::Layout;
use crate::manifest::{ADD_DIR, MANIFEST_FILE, MODIFY_DIR, SkillManifest};

/// Isolated temp project for engine tests.
pub struct ProjectFixture {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectFixture {
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    #[must_use]
    pub fn layout(&self) -> Layout {
        Layout::with_defaults(&self.root)
    }

    /// Write a file under the project root.
    pub fn write_file(&self, rel: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(rel);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    #[must_use]
    pub fn read_file(&self, rel: &str) -> String {
        std::fs::read_to_string(self.root.join(rel)).expect("Failed to read file")
    }

    #[must_use]
    pub fn file_exists(&self, rel: &str) -> bool {
        self.root.join(rel).exists()
    }

    /// Materialize a skill package under `skills/<name>/` and return its
    /// directory.
    pub fn create_skill_package(&self, skill: &SkillPackageSpec) -> PathBuf {
        let dir = self.root.join("skills").join(&skill.name);
        std::fs::create_dir_all(&dir).expect("Failed to create skill dir");

        let manifest = SkillManifest {
            skill: skill.name.clone(),
            version: skill.version.clone(),
            core_version: skill.core_version.clone(),
            adds: skill.add_files.keys().cloned().collect(),
            modifies: skill.modify_files.keys().cloned().collect(),
        };
        std::fs::write(
            dir.join(MANIFEST_FILE),
            manifest
                .to_yaml_string()
                .expect("Failed to serialize manifest"),
        )
        .expect("Failed to write manifest");

        for (rel, content) in &skill.add_files {
            write_shipped(&dir, ADD_DIR, rel, content);
        }
        for (rel, content) in &skill.modify_files {
            write_shipped(&dir, MODIFY_DIR, rel, content);
        }
        dir
    }
}

fn write_shipped(dir: &std::path::Path, kind: &str, rel: &str, content: &str) {
    let path = dir.join(kind).join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create shipped dirs");
    }
    std::fs::write(path, content).expect("Failed to write shipped content");
}

/// Declarative skill package description for tests.
pub struct SkillPackageSpec {
    pub name: String,
    pub version: String,
    pub core_version: String,
    pub add_files: BTreeMap<String, String>,
    pub modify_files: BTreeMap<String, String>,
}

impl SkillPackageSpec {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            core_version: crate::CORE_VERSION.to_string(),
            add_files: BTreeMap::new(),
            modify_files: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn add(mut self, rel: &str, content: &str) -> Self {
        self.add_files.insert(rel.to_string(), content.to_string());
        self
    }

    #[must_use]
    pub fn modify(mut self, rel: &str, post_image: &str) -> Self {
        self.modify_files
            .insert(rel.to_string(), post_image.to_string());
        self
    }
}
