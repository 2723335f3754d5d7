//! The patch-replay orchestrator.
//!
//! A replay is reset-then-apply: restore every tracked path to its base
//! snapshot content, sweep stale additions from a previous skill selection,
//! then apply each requested skill in order. Replaying the same skill list
//! twice from any drifted state yields byte-identical output.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::config::Layout;
use crate::engine::patch::{self, MergeOutcome};
use crate::engine::result::{ConflictRecord, ReplayRequest, ReplayResult, SkillOutcome};
use crate::error::{Result, SfError};
use crate::manifest::SkillPackage;
use crate::resolution;
use crate::snapshot::SnapshotStore;
use crate::CORE_VERSION;

pub struct ReplayEngine {
    layout: Layout,
    store: SnapshotStore,
}

impl ReplayEngine {
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        let store = SnapshotStore::new(&layout);
        Self { layout, store }
    }

    /// Reset the working tree to base and reapply the requested skills in
    /// order. Merge conflicts and bad manifests fail their skill but not the
    /// replay; only storage failures abort.
    pub fn replay(&self, request: &ReplayRequest) -> Result<ReplayResult> {
        let mut result = ReplayResult::new();

        // Validate before touching any file: every requested skill needs a
        // package directory.
        let mut any_missing = false;
        for name in &request.skills {
            if !request.skill_dirs.contains_key(name) {
                any_missing = true;
                result.fail_skill(
                    name,
                    SkillOutcome::failed(SfError::MissingSkillPackage(name.clone()).to_string()),
                );
            }
        }
        if any_missing {
            return Ok(result);
        }

        let packages = self.load_packages(request, &mut result)?;
        self.reset(&packages)?;

        for (name, package) in &packages {
            let Some(package) = package else {
                // Manifest failure already recorded; the skill is skipped
                // but later skills still run.
                continue;
            };
            info!(skill = %name, "applying skill");
            let outcome = self.apply_skill(request, name, package)?;
            if outcome.success {
                result.per_skill.insert(name.clone(), outcome);
            } else {
                result.fail_skill(name, outcome);
            }
        }

        self.write_added_ledger(&packages)?;
        Ok(result)
    }

    /// Load every package up front. Manifest problems are per-skill
    /// failures; storage problems abort the replay.
    fn load_packages(
        &self,
        request: &ReplayRequest,
        result: &mut ReplayResult,
    ) -> Result<Vec<(String, Option<SkillPackage>)>> {
        let mut packages = Vec::with_capacity(request.skills.len());
        for name in &request.skills {
            let dir = &request.skill_dirs[name];
            match SkillPackage::load(dir) {
                Ok(package) => {
                    if !package.manifest().core_compatible(CORE_VERSION) {
                        warn!(
                            skill = %name,
                            core_version = %package.manifest().core_version,
                            "skill was authored against an incompatible engine version"
                        );
                    }
                    packages.push((name.clone(), Some(package)));
                }
                Err(err @ (SfError::ManifestNotFound(_) | SfError::ManifestInvalid(_))) => {
                    result.fail_skill(name, SkillOutcome::failed(err.to_string()));
                    packages.push((name.clone(), None));
                }
                Err(err) => return Err(err),
            }
        }
        Ok(packages)
    }

    /// Remove additions left over from a previous, different skill
    /// selection, then restore every tracked path to base.
    fn reset(&self, packages: &[(String, Option<SkillPackage>)]) -> Result<()> {
        let mut adds_union = BTreeSet::new();
        let mut modifies_union = BTreeSet::new();
        for (_, package) in packages {
            if let Some(package) = package {
                adds_union.extend(package.manifest().adds.iter().cloned());
                modifies_union.extend(package.manifest().modifies.iter().cloned());
            }
        }

        // Sweep before capturing bases: a path added by a deselected skill
        // must not have its stale content recorded as the immutable base.
        // Once swept, a modify of that path is tracked with empty base and
        // cleanly creates the file.
        for rel in self.read_added_ledger()? {
            if !adds_union.contains(&rel) {
                debug!(path = %rel, "removing stale addition");
                self.store.remove_working(&rel)?;
            }
        }

        for rel in &modifies_union {
            self.store.ensure_base(rel)?;
        }
        self.store.restore_base()?;
        Ok(())
    }

    fn apply_skill(
        &self,
        request: &ReplayRequest,
        name: &str,
        package: &SkillPackage,
    ) -> Result<SkillOutcome> {
        let mut outcome = SkillOutcome::ok();

        for rel in &package.manifest().adds {
            match package.added_content(rel) {
                // Last writer wins when two skills add the same path.
                Ok(content) => self.store.write_working(rel, &content)?,
                Err(err @ SfError::ManifestInvalid(_)) => {
                    return Ok(SkillOutcome::failed(err.to_string()));
                }
                Err(err) => return Err(err),
            }
        }

        for rel in &package.manifest().modifies {
            let post_image = match package.modified_content(rel) {
                Ok(content) => content,
                Err(err @ SfError::ManifestInvalid(_)) => {
                    return Ok(SkillOutcome::failed(err.to_string()));
                }
                Err(err) => return Err(err),
            };
            let base = self.store.base_content(rel)?;
            let current = self.store.read_working(rel)?.unwrap_or_default();

            match patch::replay_edit(&base, &current, &post_image) {
                MergeOutcome::Clean(next) => {
                    debug!(skill = %name, path = %rel, "patched");
                    self.store.write_working(rel, &next)?;
                }
                MergeOutcome::Conflict(preimage) => {
                    if self.adopt_cached_resolution(request, rel, &preimage)? {
                        info!(skill = %name, path = %rel, "conflict resolved from cache");
                        continue;
                    }
                    warn!(skill = %name, path = %rel, "merge conflict");
                    outcome.success = false;
                    outcome.error = Some(
                        SfError::MergeConflict {
                            skill: name.to_string(),
                            path: rel.clone(),
                        }
                        .to_string(),
                    );
                    outcome.conflicts.push(ConflictRecord {
                        rel_path: rel.clone(),
                        preimage,
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// A cached resolution is adopted only when its stored preimage matches
    /// the freshly reconstructed one byte for byte. A resolution approved
    /// for a different conflict shape never applies silently.
    fn adopt_cached_resolution(
        &self,
        request: &ReplayRequest,
        rel: &str,
        preimage: &str,
    ) -> Result<bool> {
        let Some(dir) = resolution::find_resolution_dir(&request.skills, &self.layout) else {
            return Ok(false);
        };
        let Some(entry) = resolution::load_entry(&dir, rel)? else {
            return Ok(false);
        };
        if entry.preimage != preimage {
            debug!(path = %rel, "cached resolution preimage does not match");
            return Ok(false);
        }
        self.store.write_working(rel, &entry.resolution)?;
        Ok(true)
    }

    fn read_added_ledger(&self) -> Result<Vec<String>> {
        let path = self.layout.added_paths_file();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&path)?;
        serde_yaml::from_str(&raw)
            .map_err(|err| SfError::Serialization(format!("added-paths ledger: {err}")))
    }

    fn write_added_ledger(&self, packages: &[(String, Option<SkillPackage>)]) -> Result<()> {
        let mut adds: BTreeSet<&str> = BTreeSet::new();
        for (_, package) in packages {
            if let Some(package) = package {
                adds.extend(package.manifest().adds.iter().map(String::as_str));
            }
        }
        let paths: Vec<&str> = adds.into_iter().collect();
        let yaml = serde_yaml::to_string(&paths)
            .map_err(|err| SfError::Serialization(format!("added-paths ledger: {err}")))?;
        std::fs::create_dir_all(&self.layout.state_dir)?;
        std::fs::write(self.layout.added_paths_file(), yaml)?;
        Ok(())
    }
}
