//! Catalog record types (modes, categories, rules)
//!
//! These are the serde shapes shared by the bundled and user catalogs.
//! Parsing is strict at the type level; semantic checks live in the
//! `validate` methods, which collect every problem with a record instead
//! of stopping at the first one.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Component, PathBuf};

/// Slug format shared by modes and categories: lowercase alphanumeric
/// segments joined by single hyphens.
static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug pattern is valid"));

/// Check whether a string is a well-formed slug.
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_PATTERN.is_match(slug)
}

/// A guideline document owned by exactly one mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Identifier stable within the owning mode
    pub id: String,

    /// Human-readable rule name
    pub name: String,

    /// What the rule covers
    #[serde(default)]
    pub description: String,

    /// Source path relative to the owning catalog's rules root
    pub path: PathBuf,

    /// Whether the rule applies to every mode or only its owner
    #[serde(default)]
    pub shared: bool,
}

impl Rule {
    /// Append every problem with this rule to `problems`.
    fn collect_problems(&self, problems: &mut Vec<String>) {
        let label = if self.id.is_empty() { "<missing id>" } else { &self.id };

        if self.id.trim().is_empty() {
            problems.push("rule is missing an id".to_string());
        }
        if self.name.trim().is_empty() {
            problems.push(format!("rule '{label}' is missing a name"));
        }
        if self.path.as_os_str().is_empty() {
            problems.push(format!("rule '{label}' is missing a source path"));
        } else {
            if self.path.is_absolute() {
                problems.push(format!(
                    "rule '{label}' source path must be relative, got {}",
                    self.path.display()
                ));
            }
            if self.path.components().any(|c| c == Component::ParentDir) {
                problems.push(format!(
                    "rule '{label}' source path must not contain '..', got {}",
                    self.path.display()
                ));
            }
            if self.path.file_name().is_none() {
                problems.push(format!(
                    "rule '{label}' source path has no file name, got {}",
                    self.path.display()
                ));
            }
        }
    }
}

/// A capability granted to a mode: either a bare tag, or a tag scoped to
/// files whose paths match a regex.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Capability {
    Tag(String),
    #[serde(rename_all = "camelCase")]
    Scoped {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_regex: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl Capability {
    /// The capability tag itself, ignoring any scoping.
    pub fn name(&self) -> &str {
        match self {
            Capability::Tag(name) => name,
            Capability::Scoped { name, .. } => name,
        }
    }

    fn collect_problems(&self, problems: &mut Vec<String>) {
        if self.name().trim().is_empty() {
            problems.push("capability name is required".to_string());
        }
        if let Capability::Scoped {
            name,
            file_regex: Some(pattern),
            ..
        } = self
        {
            if let Err(e) = Regex::new(pattern) {
                problems.push(format!("capability '{name}' has an invalid fileRegex: {e}"));
            }
        }
    }
}

/// A named, selectable configuration bundle.
///
/// Provenance is not stored on the record: it is implied by the catalog a
/// mode was loaded from and tagged explicitly in the merged view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Mode {
    /// Unique identifier within a single catalog
    pub slug: String,

    /// Display name
    pub name: String,

    /// Role description applied when the mode is active
    pub role: String,

    /// Optional instructions appended to the role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,

    /// Capabilities granted to the mode, in order
    #[serde(default)]
    pub capabilities: Vec<Capability>,

    /// Category slugs this mode belongs to
    #[serde(default)]
    pub categories: Vec<String>,

    /// Guideline documents owned by this mode
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Mode {
    /// Validate the record, collecting every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        if !is_valid_slug(&self.slug) {
            problems.push(format!(
                "slug '{}' must be lowercase alphanumeric with hyphens",
                self.slug
            ));
        }
        if self.name.trim().is_empty() {
            problems.push("name is required".to_string());
        }
        if self.role.trim().is_empty() {
            problems.push("role is required".to_string());
        }

        for capability in &self.capabilities {
            capability.collect_problems(&mut problems);
        }

        for slug in &self.categories {
            if !is_valid_slug(slug) {
                problems.push(format!("category reference '{slug}' is not a valid slug"));
            }
        }

        let mut seen_ids = std::collections::BTreeSet::new();
        for rule in &self.rules {
            rule.collect_problems(&mut problems);
            if !rule.id.is_empty() && !seen_ids.insert(rule.id.as_str()) {
                problems.push(format!("duplicate rule id '{}'", rule.id));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

/// A named grouping of modes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier within a single catalog
    pub slug: String,

    /// Display name
    pub name: String,

    /// What the category groups together
    #[serde(default)]
    pub description: String,
}

impl Category {
    /// Validate the record, collecting every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        if !is_valid_slug(&self.slug) {
            problems.push(format!(
                "slug '{}' must be lowercase alphanumeric with hyphens",
                self.slug
            ));
        }
        if self.name.trim().is_empty() {
            problems.push("name is required".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}
