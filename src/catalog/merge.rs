//! Merge-with-precedence across the bundled and user catalogs
//!
//! The merged view is rebuilt on demand from the two catalogs and never
//! persisted. Custom records shadow bundled records with the same slug;
//! every merged entry is tagged with where it came from so downstream
//! consumers (selection, manifest output) can surface provenance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::schema::{Category, Mode};
use crate::catalog::system::SystemCatalog;
use crate::catalog::user::UserCatalog;

/// Where a merged record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Bundled record with no custom counterpart
    System,
    /// Custom record with no bundled counterpart
    Custom,
    /// Custom record shadowing a bundled record with the same slug
    CustomOverridesSystem,
}

/// A mode with its provenance in the merged view.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedMode {
    pub mode: Mode,
    pub provenance: Provenance,
}

/// A category with its provenance in the merged view.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedCategory {
    pub category: Category,
    pub provenance: Provenance,
}

/// The single consistent view combining both catalogs.
///
/// Keyed by slug, iterated in slug order, so two merges of the same
/// inputs are structurally equal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedCatalog {
    modes: BTreeMap<String, MergedMode>,
    categories: BTreeMap<String, MergedCategory>,
}

impl MergedCatalog {
    /// Combine the two catalogs, custom records taking precedence.
    ///
    /// Pure function of its inputs: no I/O, deterministic output.
    pub fn merge(system: &SystemCatalog, user: &UserCatalog) -> Self {
        use std::collections::btree_map::Entry;

        let mut modes = BTreeMap::new();
        for mode in &system.modes {
            modes.insert(
                mode.slug.clone(),
                MergedMode {
                    mode: mode.clone(),
                    provenance: Provenance::System,
                },
            );
        }
        for mode in &user.custom_modes {
            match modes.entry(mode.slug.clone()) {
                Entry::Occupied(mut e) => {
                    debug!("Custom mode '{}' overrides the bundled mode", e.key());
                    e.insert(MergedMode {
                        mode: mode.clone(),
                        provenance: Provenance::CustomOverridesSystem,
                    });
                }
                Entry::Vacant(e) => {
                    debug!("Adding custom mode '{}'", e.key());
                    e.insert(MergedMode {
                        mode: mode.clone(),
                        provenance: Provenance::Custom,
                    });
                }
            }
        }

        let mut categories = BTreeMap::new();
        for category in &system.categories {
            categories.insert(
                category.slug.clone(),
                MergedCategory {
                    category: category.clone(),
                    provenance: Provenance::System,
                },
            );
        }
        for category in &user.custom_categories {
            match categories.entry(category.slug.clone()) {
                Entry::Occupied(mut e) => {
                    debug!("Custom category '{}' overrides the bundled category", e.key());
                    e.insert(MergedCategory {
                        category: category.clone(),
                        provenance: Provenance::CustomOverridesSystem,
                    });
                }
                Entry::Vacant(e) => {
                    debug!("Adding custom category '{}'", e.key());
                    e.insert(MergedCategory {
                        category: category.clone(),
                        provenance: Provenance::Custom,
                    });
                }
            }
        }

        info!(
            "Merged catalog: {} modes, {} categories",
            modes.len(),
            categories.len()
        );
        MergedCatalog { modes, categories }
    }

    /// Look up a merged mode by slug.
    pub fn mode(&self, slug: &str) -> Option<&MergedMode> {
        self.modes.get(slug)
    }

    /// Look up a merged category by slug.
    pub fn category(&self, slug: &str) -> Option<&MergedCategory> {
        self.categories.get(slug)
    }

    /// All merged modes in slug order.
    pub fn modes(&self) -> impl Iterator<Item = &MergedMode> {
        self.modes.values()
    }

    /// All merged categories in slug order.
    pub fn categories(&self) -> impl Iterator<Item = &MergedCategory> {
        self.categories.values()
    }

    /// Modes that belong to the given category, in slug order.
    pub fn category_members<'a>(
        &'a self,
        category_slug: &'a str,
    ) -> impl Iterator<Item = &'a MergedMode> {
        self.modes
            .values()
            .filter(move |m| m.mode.categories.iter().any(|c| c == category_slug))
    }

    pub fn mode_count(&self) -> usize {
        self.modes.len()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}
