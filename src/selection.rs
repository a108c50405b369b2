//! Selection resolution against the merged catalog
//!
//! Turns a selection request (explicit mode slugs, category slugs, or an
//! interactive picker) into an ordered, deduplicated list of modes.
//! Validation is exhaustive: every unknown identifier in a request is
//! collected before the request is rejected, so the caller can show the
//! user one complete report.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::catalog::{MergedCatalog, MergedMode};
use crate::error::{LoadoutError, Result};

/// What the caller asked for, as parsed identifier lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionRequest {
    /// Modes requested by slug
    pub mode_slugs: Vec<String>,
    /// Categories requested by slug, each expanding to its member modes
    pub category_slugs: Vec<String>,
}

impl SelectionRequest {
    /// Request explicit modes only.
    pub fn modes<I, S>(slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SelectionRequest {
            mode_slugs: slugs.into_iter().map(Into::into).collect(),
            category_slugs: Vec::new(),
        }
    }

    /// Request whole categories only.
    pub fn categories<I, S>(slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SelectionRequest {
            mode_slugs: Vec::new(),
            category_slugs: slugs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mode_slugs.is_empty() && self.category_slugs.is_empty()
    }
}

/// The resolved selection: modes with their provenance, no duplicates.
///
/// Explicitly requested modes come first in request order, followed by
/// category expansions in catalog order. A mode reachable both ways
/// appears once, at its first position.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub modes: Vec<MergedMode>,
}

impl Selection {
    /// The selected slugs, in selection order.
    pub fn slugs(&self) -> Vec<&str> {
        self.modes.iter().map(|m| m.mode.slug.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

/// Resolve a request against the merged catalog.
///
/// Fails with [`LoadoutError::UnknownSlugs`] carrying every identifier
/// that matched nothing, or [`LoadoutError::EmptySelection`] when all
/// identifiers resolved but selected zero modes (for example a category
/// with no members).
pub fn resolve(catalog: &MergedCatalog, request: &SelectionRequest) -> Result<Selection> {
    let mut selected: Vec<MergedMode> = Vec::new();
    let mut seen = BTreeSet::new();
    let mut unknown: Vec<String> = Vec::new();

    for slug in &request.mode_slugs {
        match catalog.mode(slug) {
            Some(merged) => {
                if seen.insert(merged.mode.slug.clone()) {
                    selected.push(merged.clone());
                } else {
                    debug!("Mode '{slug}' already selected, skipping duplicate");
                }
            }
            None => push_unknown(&mut unknown, slug),
        }
    }

    for slug in &request.category_slugs {
        let members: Vec<&MergedMode> = catalog.category_members(slug).collect();

        // A category that exists but has no members is an empty
        // expansion, not an error. A slug that neither names a category
        // nor matches any mode's references is unknown.
        if members.is_empty() && catalog.category(slug).is_none() {
            push_unknown(&mut unknown, slug);
            continue;
        }

        for merged in members {
            if seen.insert(merged.mode.slug.clone()) {
                selected.push(merged.clone());
            } else {
                debug!(
                    "Mode '{}' from category '{slug}' already selected, skipping duplicate",
                    merged.mode.slug
                );
            }
        }
    }

    if !unknown.is_empty() {
        return Err(LoadoutError::UnknownSlugs { slugs: unknown });
    }
    if selected.is_empty() {
        return Err(LoadoutError::EmptySelection);
    }

    let selection = Selection { modes: selected };
    info!("Selection resolved: {:?}", selection.slugs());
    Ok(selection)
}

/// Resolve via an interactive picker.
///
/// The picker is the single contact point with the UI layer: it receives
/// the merged catalog and returns a request, or `None` to abort. The
/// returned request goes through the same validation as a direct one.
pub fn resolve_interactive<F>(catalog: &MergedCatalog, picker: F) -> Result<Selection>
where
    F: FnOnce(&MergedCatalog) -> Option<SelectionRequest>,
{
    match picker(catalog) {
        Some(request) => resolve(catalog, &request),
        None => {
            info!("Interactive selection aborted");
            Err(LoadoutError::UserAbort)
        }
    }
}

fn push_unknown(unknown: &mut Vec<String>, slug: &str) {
    if !unknown.iter().any(|s| s == slug) {
        unknown.push(slug.to_string());
    }
}
