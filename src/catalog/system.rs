//! Bundled catalog loading
//!
//! The bundled catalog ships with the application and is read-only at
//! runtime. A defect in it is an installation problem, not user input, so
//! loading is strict: every schema violation across every record is
//! collected and reported, and nothing is silently skipped.

use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

use crate::catalog::paths::SystemCatalogPaths;
use crate::catalog::schema::{Category, Mode};
use crate::error::{LoadoutError, Result};

/// The bundled catalog: modes and categories shipped with the application.
#[derive(Debug, Clone, Default)]
pub struct SystemCatalog {
    pub modes: Vec<Mode>,
    pub categories: Vec<Category>,
}

impl SystemCatalog {
    /// Load and validate the bundled catalog.
    ///
    /// Both definition files must exist. All records are validated before
    /// the catalog is returned; the error lists every problem found.
    pub fn load(paths: &SystemCatalogPaths) -> Result<Self> {
        let modes: Vec<Mode> = read_records(&paths.modes_file)?;
        let categories: Vec<Category> = read_records(&paths.categories_file)?;

        let catalog = SystemCatalog { modes, categories };
        catalog.check(&paths.root)?;

        debug!(
            "Loaded bundled catalog: {} modes, {} categories",
            catalog.modes.len(),
            catalog.categories.len()
        );
        Ok(catalog)
    }

    /// Validate every record, collecting all problems before failing.
    fn check(&self, root: &Path) -> Result<()> {
        let mut problems = Vec::new();

        let mut mode_slugs = BTreeSet::new();
        for mode in &self.modes {
            if let Err(errors) = mode.validate() {
                for error in errors {
                    problems.push(format!("mode '{}': {}", mode.slug, error));
                }
            }
            if !mode_slugs.insert(mode.slug.as_str()) {
                problems.push(format!("duplicate mode slug '{}'", mode.slug));
            }
        }

        let mut category_slugs = BTreeSet::new();
        for category in &self.categories {
            if let Err(errors) = category.validate() {
                for error in errors {
                    problems.push(format!("category '{}': {}", category.slug, error));
                }
            }
            if !category_slugs.insert(category.slug.as_str()) {
                problems.push(format!("duplicate category slug '{}'", category.slug));
            }
        }

        if !problems.is_empty() {
            return Err(LoadoutError::CatalogLoad {
                path: root.to_path_buf(),
                detail: problems.join("\n"),
            });
        }

        // A bundled mode pointing at a category that is not bundled is
        // odd but harmless: the reference may resolve against a user
        // category, and selection ignores unresolvable ones.
        for mode in &self.modes {
            for slug in &mode.categories {
                if !category_slugs.contains(slug.as_str()) {
                    warn!(
                        "Bundled mode '{}' references category '{}' which is not bundled",
                        mode.slug, slug
                    );
                }
            }
        }

        Ok(())
    }
}

fn read_records<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadoutError::CatalogLoad {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| LoadoutError::CatalogLoad {
        path: path.to_path_buf(),
        detail: format!("invalid JSON: {e}"),
    })
}
