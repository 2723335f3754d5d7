//! Snapshot store: pristine base mirror and ad hoc backup set.
//!
//! Two filesystem mirrors live under the state dir. The base snapshot is the
//! immutable ground truth every per-skill diff is computed against: a path's
//! base content is captured once, the first time the path becomes tracked,
//! and never overwritten by later replays. The backup set is a transient
//! mirror of an explicit file list, taken before a risky operation and
//! restored or cleared on demand.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::Layout;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    project_root: PathBuf,
    base_dir: PathBuf,
    backup_dir: PathBuf,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(layout: &Layout) -> Self {
        Self {
            project_root: layout.project_root.clone(),
            base_dir: layout.base_dir(),
            backup_dir: layout.backup_dir(),
        }
    }

    // --- backup set ---

    /// Copy each existing path into the backup mirror. Missing paths are
    /// silently skipped; repeat calls refresh the copies.
    pub fn create_backup<I, S>(&self, paths: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        std::fs::create_dir_all(&self.backup_dir)?;
        for rel in paths {
            let rel = rel.as_ref();
            let source = self.project_root.join(rel);
            if !source.exists() {
                continue;
            }
            let target = self.backup_dir.join(rel);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(&source, &target)?;
            debug!(path = rel, "backed up");
        }
        Ok(())
    }

    /// Copy every file in the backup mirror back into the working tree.
    /// No-op if no backup exists.
    pub fn restore_backup(&self) -> Result<()> {
        if !self.backup_dir.exists() {
            return Ok(());
        }
        copy_tree(&self.backup_dir, &self.project_root)
    }

    /// Remove the backup mirror. No-op if absent.
    pub fn clear_backup(&self) -> Result<()> {
        if self.backup_dir.exists() {
            std::fs::remove_dir_all(&self.backup_dir)?;
        }
        Ok(())
    }

    // --- base snapshot ---

    /// Capture-once: record the working file's current content as the
    /// path's base, unless a base copy already exists. A missing working
    /// file is tracked with empty content so the path still resets cleanly.
    pub fn ensure_base(&self, rel: &str) -> Result<()> {
        let base_path = self.base_dir.join(rel);
        if base_path.exists() {
            return Ok(());
        }
        let content = match std::fs::read_to_string(self.project_root.join(rel)) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err.into()),
        };
        if let Some(parent) = base_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&base_path, &content)?;
        debug!(path = rel, bytes = content.len(), "tracked in base snapshot");
        Ok(())
    }

    pub fn base_content(&self, rel: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.base_dir.join(rel))?)
    }

    /// Every path ever tracked, relative to the project root.
    pub fn tracked_paths(&self) -> Result<Vec<String>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.base_dir) {
            let entry = entry.map_err(std::io::Error::other)?;
            if entry.file_type().is_file() {
                let rel = entry
                    .path()
                    .strip_prefix(&self.base_dir)
                    .map_err(std::io::Error::other)?;
                paths.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Write every tracked path's base content back into the working tree.
    pub fn restore_base(&self) -> Result<()> {
        if !self.base_dir.exists() {
            return Ok(());
        }
        copy_tree(&self.base_dir, &self.project_root)
    }

    /// Write a file under the project root, creating parent directories.
    pub fn write_working(&self, rel: &str, content: &str) -> Result<()> {
        let path = self.project_root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Read a file under the project root, or `None` if absent.
    pub fn read_working(&self, rel: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.project_root.join(rel)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Delete a file under the project root. No-op if absent.
    pub fn remove_working(&self, rel: &str) -> Result<()> {
        match std::fs::remove_file(self.project_root.join(rel)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(std::io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(from)
            .map_err(std::io::Error::other)?;
        let target = to.join(rel);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(entry.path(), &target)?;
    }
    Ok(())
}
