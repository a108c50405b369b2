//! Materialization of a selection into a target directory
//!
//! Planning computes every write up front: one manifest file plus one
//! copy per selected rule document. Execution pre-scans the whole plan
//! for conflicts before touching the filesystem, so without `force` a
//! run either writes everything or writes nothing that would overwrite
//! existing files.
//!
//! No cross-file atomicity is provided beyond that: a filesystem error
//! mid-execution stops the run and leaves the files already written in
//! place. The pre-scan and the writes are also not protected against a
//! concurrent external process modifying the target between the two
//! steps.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::{Capability, MergedMode, Provenance, SystemCatalogPaths, UserCatalogPaths};
use crate::error::{LoadoutError, RecordKind, Result};
use crate::selection::Selection;

/// Manifest filename written at the target root.
pub const MANIFEST_FILE: &str = "loadout.json";

/// Directory under the target root for rules shared by every mode.
pub const SHARED_RULES_DIR: &str = "rules";

/// Manifest format version.
pub const MANIFEST_API_VERSION: &str = "loadout/v1";

/// Directory name for rules owned by a single mode.
fn mode_rules_dir(slug: &str) -> String {
    format!("rules-{slug}")
}

/// The manifest written at the target root, listing the externally
/// visible metadata of every selected mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Format version (currently "loadout/v1")
    pub api_version: String,

    /// When this manifest was generated (RFC 3339)
    pub generated: String,

    /// Selected modes, in selection order
    pub modes: Vec<ManifestEntry>,
}

/// One selected mode as recorded in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub slug: String,
    pub name: String,
    pub role: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,

    #[serde(default)]
    pub capabilities: Vec<Capability>,

    /// Which catalog the record came from
    pub source: Provenance,
}

impl ManifestEntry {
    fn from_merged(merged: &MergedMode) -> Self {
        ManifestEntry {
            slug: merged.mode.slug.clone(),
            name: merged.mode.name.clone(),
            role: merged.mode.role.clone(),
            custom_instructions: merged.mode.custom_instructions.clone(),
            capabilities: merged.mode.capabilities.clone(),
            source: merged.provenance,
        }
    }
}

/// A single planned file copy.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyOp {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Every write that materializing a selection will perform.
#[derive(Debug, Clone)]
pub struct WritePlan {
    target_root: PathBuf,
    manifest_path: PathBuf,
    manifest: Manifest,
    copies: Vec<CopyOp>,
}

/// What a completed execution wrote.
#[derive(Debug, Clone, Default)]
pub struct WriteReport {
    /// Every file written, in write order (manifest first)
    pub files_written: Vec<PathBuf>,
}

/// Plans writes for a selection, resolving rule sources against the
/// catalog each mode came from.
pub struct Materializer {
    system_rules: PathBuf,
    user_rules: PathBuf,
}

impl Materializer {
    pub fn new(system: &SystemCatalogPaths, user: &UserCatalogPaths) -> Self {
        Materializer {
            system_rules: system.rules_dir.clone(),
            user_rules: user.rules_dir.clone(),
        }
    }

    /// Compute the full write plan for a selection.
    ///
    /// The manifest lands at `<target_root>/loadout.json`; shared rules
    /// under `<target_root>/rules/`; rules owned by a mode under
    /// `<target_root>/rules-<slug>/`. Target paths are deduplicated:
    /// when two rules map to the same target, the first planned write
    /// wins.
    pub fn plan(&self, selection: &Selection, target_root: &Path) -> Result<WritePlan> {
        let manifest = Manifest {
            api_version: MANIFEST_API_VERSION.to_string(),
            generated: chrono::Utc::now().to_rfc3339(),
            modes: selection.modes.iter().map(ManifestEntry::from_merged).collect(),
        };
        let manifest_path = target_root.join(MANIFEST_FILE);

        let mut copies = Vec::new();
        let mut planned_targets = BTreeSet::new();
        planned_targets.insert(manifest_path.clone());

        for merged in &selection.modes {
            let source_root = self.source_root(merged.provenance);

            for rule in &merged.mode.rules {
                let Some(basename) = rule.path.file_name() else {
                    return Err(LoadoutError::InvalidRecord {
                        kind: RecordKind::Mode,
                        slug: merged.mode.slug.clone(),
                        problems: vec![format!(
                            "rule '{}' source path has no file name, got {}",
                            rule.id,
                            rule.path.display()
                        )],
                    });
                };

                let target = if rule.shared {
                    target_root.join(SHARED_RULES_DIR).join(basename)
                } else {
                    target_root
                        .join(mode_rules_dir(&merged.mode.slug))
                        .join(basename)
                };

                if !planned_targets.insert(target.clone()) {
                    debug!(
                        "Target {} already planned, keeping the first write",
                        target.display()
                    );
                    continue;
                }

                copies.push(CopyOp {
                    source: source_root.join(&rule.path),
                    target,
                });
            }
        }

        debug!(
            "Planned {} writes into {}",
            copies.len() + 1,
            target_root.display()
        );
        Ok(WritePlan {
            target_root: target_root.to_path_buf(),
            manifest_path,
            manifest,
            copies,
        })
    }

    fn source_root(&self, provenance: Provenance) -> &Path {
        match provenance {
            Provenance::System => &self.system_rules,
            Provenance::Custom | Provenance::CustomOverridesSystem => &self.user_rules,
        }
    }
}

impl WritePlan {
    /// Every target path in the plan, manifest first.
    pub fn target_paths(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.manifest_path.as_path())
            .chain(self.copies.iter().map(|c| c.target.as_path()))
    }

    /// The planned file copies, in write order.
    pub fn copies(&self) -> &[CopyOp] {
        &self.copies
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    /// Perform the writes.
    ///
    /// Without `force`, every target is checked first and a single
    /// [`LoadoutError::OverwriteConflict`] reports all existing targets
    /// at once; nothing is written in that case. With `force`, existing
    /// targets are overwritten and the pre-scan is skipped.
    ///
    /// Filesystem errors during the writes are fail-fast: files already
    /// written in this run stay in place.
    pub fn execute(&self, force: bool) -> Result<WriteReport> {
        if !force {
            let conflicts: Vec<PathBuf> = self
                .target_paths()
                .filter(|p| p.exists())
                .map(Path::to_path_buf)
                .collect();
            if !conflicts.is_empty() {
                return Err(LoadoutError::OverwriteConflict { paths: conflicts });
            }
        }

        let parents: BTreeSet<&Path> = self.target_paths().filter_map(Path::parent).collect();
        for dir in parents {
            std::fs::create_dir_all(dir).map_err(|source| LoadoutError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let mut report = WriteReport::default();

        let mut content = serde_json::to_string_pretty(&self.manifest)?;
        content.push('\n');
        std::fs::write(&self.manifest_path, content).map_err(|source| LoadoutError::Io {
            path: self.manifest_path.clone(),
            source,
        })?;
        report.files_written.push(self.manifest_path.clone());

        for copy in &self.copies {
            // Attribute a missing or unreadable source to the source
            // path; anything past that point is a target failure.
            std::fs::metadata(&copy.source).map_err(|source| LoadoutError::Io {
                path: copy.source.clone(),
                source,
            })?;
            std::fs::copy(&copy.source, &copy.target).map_err(|source| LoadoutError::Io {
                path: copy.target.clone(),
                source,
            })?;
            report.files_written.push(copy.target.clone());
        }

        info!(
            "Materialized {} files into {}",
            report.files_written.len(),
            self.target_root.display()
        );
        Ok(report)
    }
}
