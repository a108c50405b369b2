//! Create/update/delete operations on the user catalog
//!
//! All mutations go through the strict catalog load: a user catalog file
//! that cannot be parsed is never rewritten. Every operation validates
//! first, then loads, mutates and persists the whole file.
//!
//! Bundled records are immutable. Creating a custom record with a
//! bundled slug shadows the bundled one in the merged view; update and
//! delete refuse to touch slugs that exist only in the bundled catalog.

use tracing::{debug, info};

use crate::catalog::{Category, MergedCatalog, Mode, UserCatalog, UserCatalogPaths};
use crate::error::{LoadoutError, RecordKind, Result};

/// Editor for the user catalog.
///
/// Holds only the catalog location; each operation loads the file fresh
/// and persists it back in full.
pub struct CatalogEditor {
    paths: UserCatalogPaths,
}

impl CatalogEditor {
    pub fn new(paths: UserCatalogPaths) -> Self {
        CatalogEditor { paths }
    }

    /// Create a custom mode.
    ///
    /// The slug must be unique among custom modes only: colliding with a
    /// bundled slug is how overrides are made. Category references are
    /// checked against the merged view.
    pub fn create_mode(&self, catalog: &MergedCatalog, mode: Mode) -> Result<()> {
        self.check_mode(catalog, &mode)?;

        let mut user = UserCatalog::load(&self.paths)?;
        if user.find_mode(&mode.slug).is_some() {
            return Err(LoadoutError::DuplicateSlug {
                kind: RecordKind::Mode,
                slug: mode.slug,
            });
        }

        if catalog.mode(&mode.slug).is_some() {
            debug!("Custom mode '{}' will shadow the bundled mode", mode.slug);
        }
        info!("Creating custom mode '{}'", mode.slug);
        user.custom_modes.push(mode);
        user.save(&self.paths)
    }

    /// Replace an existing custom mode wholesale.
    ///
    /// The slug is the lookup key and cannot be changed. Updating a slug
    /// that exists only in the bundled catalog fails with `NotCustom`;
    /// bundled records are shadowed via [`Self::create_mode`], never
    /// edited.
    pub fn update_mode(&self, catalog: &MergedCatalog, mode: Mode) -> Result<()> {
        self.check_mode(catalog, &mode)?;

        let mut user = UserCatalog::load(&self.paths)?;
        match user.custom_modes.iter_mut().find(|m| m.slug == mode.slug) {
            Some(existing) => {
                info!("Updating custom mode '{}'", mode.slug);
                *existing = mode;
                user.save(&self.paths)
            }
            None => Err(self.missing(catalog, RecordKind::Mode, &mode.slug)),
        }
    }

    /// Delete a custom mode and its owned, non-shared rule documents.
    ///
    /// The catalog file is persisted before any document is removed, so
    /// a failure while deleting files can orphan documents but never
    /// leave a record pointing at nothing.
    pub fn delete_mode(&self, catalog: &MergedCatalog, slug: &str) -> Result<()> {
        let mut user = UserCatalog::load(&self.paths)?;
        let Some(index) = user.custom_modes.iter().position(|m| m.slug == slug) else {
            return Err(self.missing(catalog, RecordKind::Mode, slug));
        };

        let removed = user.custom_modes.remove(index);
        user.save(&self.paths)?;
        self.remove_owned_rules(&removed)?;

        info!("Deleted custom mode '{slug}'");
        Ok(())
    }

    /// Create a custom category. Unique among custom categories only.
    pub fn create_category(&self, catalog: &MergedCatalog, category: Category) -> Result<()> {
        check_category(&category)?;

        let mut user = UserCatalog::load(&self.paths)?;
        if user.find_category(&category.slug).is_some() {
            return Err(LoadoutError::DuplicateSlug {
                kind: RecordKind::Category,
                slug: category.slug,
            });
        }

        if catalog.category(&category.slug).is_some() {
            debug!(
                "Custom category '{}' will shadow the bundled category",
                category.slug
            );
        }
        info!("Creating custom category '{}'", category.slug);
        user.custom_categories.push(category);
        user.save(&self.paths)
    }

    /// Replace an existing custom category wholesale.
    pub fn update_category(&self, catalog: &MergedCatalog, category: Category) -> Result<()> {
        check_category(&category)?;

        let mut user = UserCatalog::load(&self.paths)?;
        match user
            .custom_categories
            .iter_mut()
            .find(|c| c.slug == category.slug)
        {
            Some(existing) => {
                info!("Updating custom category '{}'", category.slug);
                *existing = category;
                user.save(&self.paths)
            }
            None => Err(self.missing(catalog, RecordKind::Category, &category.slug)),
        }
    }

    /// Delete a custom category and strip its slug from every custom
    /// mode that references it.
    ///
    /// The strip is the one cross-record cascade in the model. It runs
    /// unconditionally, including when the deleted category shadowed a
    /// bundled one, and touches only custom modes; bundled modes keep
    /// their references.
    pub fn delete_category(&self, catalog: &MergedCatalog, slug: &str) -> Result<()> {
        let mut user = UserCatalog::load(&self.paths)?;
        let Some(index) = user.custom_categories.iter().position(|c| c.slug == slug) else {
            return Err(self.missing(catalog, RecordKind::Category, slug));
        };
        user.custom_categories.remove(index);

        let mut stripped = 0usize;
        for mode in &mut user.custom_modes {
            let before = mode.categories.len();
            mode.categories.retain(|c| c != slug);
            if mode.categories.len() != before {
                debug!("Stripped category '{slug}' from custom mode '{}'", mode.slug);
                stripped += 1;
            }
        }

        user.save(&self.paths)?;
        info!("Deleted custom category '{slug}', updated {stripped} custom modes");
        Ok(())
    }

    /// Write a rule document under the mode's directory in the user
    /// rules root, creating the directory as needed.
    ///
    /// Authoring documents is separate from record mutation: the mode
    /// need not exist yet, and a record's `rules` list references the
    /// file by relative path (`<mode_slug>/<file_name>`). Returns the
    /// path written.
    pub fn put_rule_document(
        &self,
        mode_slug: &str,
        file_name: &str,
        content: &str,
    ) -> Result<std::path::PathBuf> {
        let mut problems = Vec::new();
        if !crate::catalog::is_valid_slug(mode_slug) {
            problems.push(format!(
                "slug '{mode_slug}' must be lowercase alphanumeric with hyphens"
            ));
        }
        if file_name.is_empty()
            || std::path::Path::new(file_name).file_name() != Some(file_name.as_ref())
        {
            problems.push(format!("'{file_name}' is not a plain file name"));
        }
        if !problems.is_empty() {
            return Err(LoadoutError::InvalidRecord {
                kind: RecordKind::Mode,
                slug: mode_slug.to_string(),
                problems,
            });
        }

        let dir = self.paths.rules_dir.join(mode_slug);
        std::fs::create_dir_all(&dir).map_err(|source| LoadoutError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(file_name);
        std::fs::write(&path, content).map_err(|source| LoadoutError::Io {
            path: path.clone(),
            source,
        })?;

        debug!("Wrote rule document {}", path.display());
        Ok(path)
    }

    /// Decide between `NotCustom` and `NotFound` for a slug absent from
    /// the user catalog.
    fn missing(&self, catalog: &MergedCatalog, kind: RecordKind, slug: &str) -> LoadoutError {
        let exists_bundled = match kind {
            RecordKind::Mode => catalog.mode(slug).is_some(),
            RecordKind::Category => catalog.category(slug).is_some(),
        };
        if exists_bundled {
            LoadoutError::NotCustom {
                kind,
                slug: slug.to_string(),
            }
        } else {
            LoadoutError::NotFound {
                kind,
                slug: slug.to_string(),
            }
        }
    }

    /// Validate a mode draft, including its category references against
    /// the merged view. Collects every problem before failing.
    fn check_mode(&self, catalog: &MergedCatalog, mode: &Mode) -> Result<()> {
        let mut problems = match mode.validate() {
            Ok(()) => Vec::new(),
            Err(problems) => problems,
        };
        for category in &mode.categories {
            if catalog.category(category).is_none() {
                problems.push(format!("references unknown category '{category}'"));
            }
        }

        if !problems.is_empty() {
            return Err(LoadoutError::InvalidRecord {
                kind: RecordKind::Mode,
                slug: mode.slug.clone(),
                problems,
            });
        }
        Ok(())
    }

    fn remove_owned_rules(&self, mode: &Mode) -> Result<()> {
        for rule in mode.rules.iter().filter(|r| !r.shared) {
            let path = self.paths.rules_dir.join(&rule.path);
            match std::fs::remove_file(&path) {
                Ok(()) => debug!("Removed rule document {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("Rule document {} already absent", path.display());
                }
                Err(source) => return Err(LoadoutError::Io { path, source }),
            }
        }

        // Per-mode rule directories are conventional; drop one that the
        // removals emptied out.
        let mode_dir = self.paths.rules_dir.join(&mode.slug);
        if let Ok(mut entries) = std::fs::read_dir(&mode_dir) {
            if entries.next().is_none() {
                let _ = std::fs::remove_dir(&mode_dir);
            }
        }
        Ok(())
    }
}

fn check_category(category: &Category) -> Result<()> {
    if let Err(problems) = category.validate() {
        return Err(LoadoutError::InvalidRecord {
            kind: RecordKind::Category,
            slug: category.slug.clone(),
            problems,
        });
    }
    Ok(())
}
