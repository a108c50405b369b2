//! Test helper functions for integration tests
//!
//! This module is shared across test files using the tests/common/
//! pattern. It builds a small but realistic bundled catalog on disk:
//! three modes, two categories, and rule documents for the `code` mode.

use anyhow::Result;
use loadout::catalog::{SystemCatalogPaths, UserCatalogPaths};
use std::fs;
use std::path::Path;
use std::sync::Once;

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Write a bundled catalog under `root`:
///
/// - `code` (category `core`): shared rule `retrieval.md`, owned rule
///   `coder.md`
/// - `architect` (categories `core`, `planning`): no rules
/// - `ask` (no categories): no rules
pub fn create_system_catalog(root: &Path) -> Result<SystemCatalogPaths> {
    fs::create_dir_all(root.join("rules").join("shared"))?;
    fs::create_dir_all(root.join("rules").join("code"))?;

    fs::write(
        root.join("modes.json"),
        r#"[
            {
                "slug": "code",
                "name": "Code",
                "role": "You implement features and fix bugs.",
                "capabilities": [
                    "read",
                    { "name": "edit", "fileRegex": "\\.(rs|toml)$", "description": "Source and manifest files" }
                ],
                "categories": ["core"],
                "rules": [
                    { "id": "retrieval", "name": "Retrieval", "path": "shared/retrieval.md", "shared": true },
                    { "id": "coder", "name": "Coder", "path": "code/coder.md", "shared": false }
                ]
            },
            {
                "slug": "architect",
                "name": "Architect",
                "role": "You design systems before they are built.",
                "customInstructions": "Prefer boring technology.",
                "capabilities": ["read"],
                "categories": ["core", "planning"]
            },
            {
                "slug": "ask",
                "name": "Ask",
                "role": "You answer questions without changing anything.",
                "capabilities": ["read"]
            }
        ]"#,
    )?;

    fs::write(
        root.join("categories.json"),
        r#"[
            { "slug": "core", "name": "Core", "description": "Everyday modes" },
            { "slug": "planning", "name": "Planning", "description": "Up-front design modes" }
        ]"#,
    )?;

    fs::write(
        root.join("rules").join("shared").join("retrieval.md"),
        "# Retrieval guidance\n\nSearch before you write.\n",
    )?;
    fs::write(
        root.join("rules").join("code").join("coder.md"),
        "# Coder rules\n\nKeep diffs small.\n",
    )?;

    Ok(SystemCatalogPaths::from_root(root.to_path_buf())?)
}

/// User catalog layout rooted at `root`. Nothing is created on disk.
pub fn user_paths(root: &Path) -> UserCatalogPaths {
    UserCatalogPaths::from_root(root.to_path_buf())
}
