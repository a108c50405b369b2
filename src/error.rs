//! Error types with clear, actionable messages
//!
//! Every public operation returns [`Result`]. Errors carry the offending
//! slugs and paths so the presentation layer can render a complete report;
//! validation and resolution errors are collected exhaustively before being
//! raised, while filesystem errors during execution fail fast.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which kind of catalog record an editor operation was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Mode,
    Category,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Mode => write!(f, "mode"),
            RecordKind::Category => write!(f, "category"),
        }
    }
}

#[derive(Error, Debug)]
pub enum LoadoutError {
    /// The bundled catalog is unreadable or fails schema validation.
    /// This is fatal: the bundled catalog is an internal invariant, not
    /// user input.
    #[error("failed to load bundled catalog from {path}: {detail}")]
    CatalogLoad { path: PathBuf, detail: String },

    /// The user catalog file is unreadable or fails schema validation.
    /// Read paths recover by treating the user catalog as empty; the
    /// editing path refuses to proceed so the file is never clobbered.
    #[error("user catalog at {path} is invalid: {detail}\n\nFix or remove the file, then retry.")]
    UserCatalogInvalid { path: PathBuf, detail: String },

    /// The user catalog location could not be resolved, either because the
    /// platform has no config directory or because an override was
    /// malformed.
    #[error("could not determine the user catalog location: {detail}")]
    CatalogDiscovery { detail: String },

    /// A selection referenced identifiers that exist in neither catalog.
    /// Carries the complete set, never just the first failure.
    #[error("unknown mode or category identifiers: {}", .slugs.join(", "))]
    UnknownSlugs { slugs: Vec<String> },

    /// Resolution succeeded but selected zero modes (for example, only
    /// empty categories were requested).
    #[error("selection resolved to no modes")]
    EmptySelection,

    /// The interactive picker declined to choose anything.
    #[error("selection aborted")]
    UserAbort,

    /// Materialization would overwrite existing files and force was not
    /// set. Carries every conflicting target found in the pre-scan.
    #[error("refusing to overwrite {} existing file(s): {}\n\nRe-run with force to overwrite.", .paths.len(), join_paths(.paths))]
    OverwriteConflict { paths: Vec<PathBuf> },

    /// A filesystem operation failed during materialization or catalog
    /// persistence. Names the failing path; writes already performed are
    /// not rolled back.
    #[error("filesystem error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An editor operation targeted a slug absent from the user catalog
    /// (and from the bundled catalog).
    #[error("no custom {kind} named '{slug}'")]
    NotFound { kind: RecordKind, slug: String },

    /// An editor operation targeted a slug that exists only as a bundled
    /// record. Bundled entries are shadowed by creating a custom record
    /// with the same slug, never edited in place.
    #[error("{kind} '{slug}' is bundled and cannot be edited; create a custom {kind} with the same slug to override it")]
    NotCustom { kind: RecordKind, slug: String },

    /// A create operation collided with an existing user-catalog slug.
    #[error("a custom {kind} named '{slug}' already exists")]
    DuplicateSlug { kind: RecordKind, slug: String },

    /// A record or draft failed validation. Carries every problem found,
    /// not just the first.
    #[error("invalid {kind} '{slug}': {}", .problems.join("; "))]
    InvalidRecord {
        kind: RecordKind,
        slug: String,
        problems: Vec<String>,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, LoadoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_slugs_message_lists_every_slug() {
        let err = LoadoutError::UnknownSlugs {
            slugs: vec!["docs".to_string(), "qa".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("docs"));
        assert!(msg.contains("qa"));
    }

    #[test]
    fn test_overwrite_conflict_message_counts_and_names_paths() {
        let err = LoadoutError::OverwriteConflict {
            paths: vec![
                PathBuf::from("a/loadout.json"),
                PathBuf::from("a/rules/x.md"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 existing file(s)"));
        assert!(msg.contains("a/loadout.json"));
        assert!(msg.contains("rules/x.md"));
    }

    #[test]
    fn test_record_kind_display() {
        assert_eq!(RecordKind::Mode.to_string(), "mode");
        assert_eq!(RecordKind::Category.to_string(), "category");
    }
}
