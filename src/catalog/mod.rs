//! Loadout Catalog - layered mode and category resolution
//!
//! This module provides access to the two catalog sources and the merged
//! view built from them.
//!
//! # Overview
//!
//! The catalog system allows users to:
//! - Browse modes and categories shipped with the application
//! - Layer custom modes and categories on top of the bundled set
//! - Shadow a bundled record by creating a custom one with the same slug
//! - See where every record came from via its provenance tag
//!
//! # Architecture
//!
//! ```text
//! bundled catalog (read-only)      user catalog (read-write)
//!   modes.json                       catalog.json
//!   categories.json                  rules/<slug>/*.md
//!   rules/**
//!       │                                │
//!       ▼                                ▼
//!   SystemCatalog ──────┬────────── UserCatalog
//!                       ▼
//!                 MergedCatalog      ← provenance-tagged, custom wins
//! ```

mod merge;
mod paths;
mod schema;
mod system;
mod user;

pub use merge::{MergedCatalog, MergedCategory, MergedMode, Provenance};
pub use paths::{SystemCatalogPaths, UserCatalogPaths};
pub use schema::{is_valid_slug, Capability, Category, Mode, Rule};
pub use system::SystemCatalog;
pub use user::UserCatalog;
