//! User catalog loading and persistence
//!
//! The user catalog is a single JSON file holding all custom modes and
//! categories. It is user-maintained data, so there are two load paths:
//! the strict one used before mutating (a file we cannot fully parse is
//! never rewritten) and a lenient one used by read-only consumers, which
//! falls back to an empty catalog.
//!
//! Persistence is whole-file: serialize everything, write to a temp file
//! next to the target, then rename into place.

use std::collections::BTreeSet;
use std::io::Write;
use tracing::{debug, warn};

use serde::{Deserialize, Serialize};

use crate::catalog::paths::UserCatalogPaths;
use crate::catalog::schema::{Category, Mode};
use crate::error::{LoadoutError, Result};

/// All user-defined records, mirroring the on-disk catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserCatalog {
    #[serde(default)]
    pub custom_modes: Vec<Mode>,

    #[serde(default)]
    pub custom_categories: Vec<Category>,
}

impl UserCatalog {
    /// Load the user catalog, failing on any defect.
    ///
    /// An absent file is an empty catalog, not an error. Anything else —
    /// unreadable file, malformed JSON, invalid records — is reported in
    /// full so the caller never persists over data it could not parse.
    pub fn load(paths: &UserCatalogPaths) -> Result<Self> {
        if !paths.catalog_file.exists() {
            debug!("No user catalog at {:?}, starting empty", paths.catalog_file);
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&paths.catalog_file).map_err(|e| {
                LoadoutError::UserCatalogInvalid {
                    path: paths.catalog_file.clone(),
                    detail: e.to_string(),
                }
            })?;

        let catalog: UserCatalog =
            serde_json::from_str(&content).map_err(|e| LoadoutError::UserCatalogInvalid {
                path: paths.catalog_file.clone(),
                detail: format!("invalid JSON: {e}"),
            })?;

        catalog.check(paths)?;

        debug!(
            "Loaded user catalog: {} custom modes, {} custom categories",
            catalog.custom_modes.len(),
            catalog.custom_categories.len()
        );
        Ok(catalog)
    }

    /// Load the user catalog, tolerating defects.
    ///
    /// Read-only consumers should still work when the user catalog is
    /// broken; the defect is logged and the catalog treated as empty.
    pub fn load_or_empty(paths: &UserCatalogPaths) -> Self {
        match Self::load(paths) {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("Ignoring user catalog: {e}");
                Self::default()
            }
        }
    }

    /// Persist the whole catalog.
    ///
    /// Writes to a temporary file in the same directory and renames it
    /// over the target, so a crash mid-write cannot leave a truncated
    /// catalog behind.
    pub fn save(&self, paths: &UserCatalogPaths) -> Result<()> {
        std::fs::create_dir_all(&paths.root).map_err(|source| LoadoutError::Io {
            path: paths.root.clone(),
            source,
        })?;

        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');

        let mut temp = tempfile::NamedTempFile::new_in(&paths.root).map_err(|source| {
            LoadoutError::Io {
                path: paths.root.clone(),
                source,
            }
        })?;
        temp.write_all(content.as_bytes())
            .map_err(|source| LoadoutError::Io {
                path: paths.catalog_file.clone(),
                source,
            })?;
        temp.persist(&paths.catalog_file)
            .map_err(|e| LoadoutError::Io {
                path: paths.catalog_file.clone(),
                source: e.error,
            })?;

        debug!(
            "Saved user catalog: {} custom modes, {} custom categories",
            self.custom_modes.len(),
            self.custom_categories.len()
        );
        Ok(())
    }

    /// Look up a custom mode by slug.
    pub fn find_mode(&self, slug: &str) -> Option<&Mode> {
        self.custom_modes.iter().find(|m| m.slug == slug)
    }

    /// Look up a custom category by slug.
    pub fn find_category(&self, slug: &str) -> Option<&Category> {
        self.custom_categories.iter().find(|c| c.slug == slug)
    }

    /// Validate every record, collecting all problems before failing.
    fn check(&self, paths: &UserCatalogPaths) -> Result<()> {
        let mut problems = Vec::new();

        let mut mode_slugs = BTreeSet::new();
        for mode in &self.custom_modes {
            if let Err(errors) = mode.validate() {
                for error in errors {
                    problems.push(format!("custom mode '{}': {}", mode.slug, error));
                }
            }
            if !mode_slugs.insert(mode.slug.as_str()) {
                problems.push(format!("duplicate custom mode slug '{}'", mode.slug));
            }
        }

        let mut category_slugs = BTreeSet::new();
        for category in &self.custom_categories {
            if let Err(errors) = category.validate() {
                for error in errors {
                    problems.push(format!("custom category '{}': {}", category.slug, error));
                }
            }
            if !category_slugs.insert(category.slug.as_str()) {
                problems.push(format!(
                    "duplicate custom category slug '{}'",
                    category.slug
                ));
            }
        }

        if !problems.is_empty() {
            return Err(LoadoutError::UserCatalogInvalid {
                path: paths.catalog_file.clone(),
                detail: problems.join("\n"),
            });
        }

        Ok(())
    }
}
