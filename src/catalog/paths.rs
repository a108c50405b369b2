//! Catalog location discovery
//!
//! Resolves where the bundled catalog and the user catalog live on disk.
//! The bundled catalog ships with the application, so its location is
//! always supplied by the caller; the user catalog defaults to the
//! platform config directory and may be overridden.

use std::path::PathBuf;
use tracing::{debug, trace};

use crate::error::{LoadoutError, Result};

/// Filesystem layout of the bundled (read-only) catalog.
#[derive(Debug, Clone)]
pub struct SystemCatalogPaths {
    /// Root directory of the bundled catalog
    pub root: PathBuf,
    /// Mode definitions file
    pub modes_file: PathBuf,
    /// Category definitions file
    pub categories_file: PathBuf,
    /// Directory holding bundled rule documents
    pub rules_dir: PathBuf,
}

impl SystemCatalogPaths {
    /// Build the bundled catalog layout from its root directory.
    ///
    /// The bundled catalog is part of the installation, so a missing root
    /// is an installation defect, not user input.
    pub fn from_root(root: PathBuf) -> Result<Self> {
        if !root.is_dir() {
            return Err(LoadoutError::CatalogLoad {
                path: root,
                detail: "catalog directory does not exist".to_string(),
            });
        }

        Ok(SystemCatalogPaths {
            modes_file: root.join("modes.json"),
            categories_file: root.join("categories.json"),
            rules_dir: root.join("rules"),
            root,
        })
    }
}

/// Filesystem layout of the user (writable) catalog.
///
/// Unlike the bundled catalog, every part of this layout may be absent: a
/// missing catalog file simply means the user has not customized anything
/// yet.
#[derive(Debug, Clone)]
pub struct UserCatalogPaths {
    /// Root directory of the user catalog
    pub root: PathBuf,
    /// Single file holding all custom modes and categories
    pub catalog_file: PathBuf,
    /// Directory holding user rule documents
    pub rules_dir: PathBuf,
}

impl UserCatalogPaths {
    /// Locate the user catalog using platform conventions.
    pub fn discover() -> Result<Self> {
        Self::discover_with_override(None)
    }

    /// Locate the user catalog, honoring an explicit override.
    ///
    /// Resolution order:
    /// 1. Override parameter (if provided)
    /// 2. Platform-specific user config directory
    ///
    /// An override that does not exist yet is accepted: the directory is
    /// created on the first write.
    pub fn discover_with_override(cli_override: Option<PathBuf>) -> Result<Self> {
        trace!("Discovering user catalog location");

        if let Some(override_path) = cli_override {
            if !override_path.is_absolute() {
                return Err(LoadoutError::CatalogDiscovery {
                    detail: format!(
                        "catalog path override must be absolute (got: {})",
                        override_path.display()
                    ),
                });
            }

            if override_path.exists() {
                // Canonicalize to resolve .. and symlinks so logs and
                // errors show the actual target directory
                let canonical_path =
                    override_path
                        .canonicalize()
                        .map_err(|source| LoadoutError::Io {
                            path: override_path.clone(),
                            source,
                        })?;

                if !canonical_path.is_dir() {
                    return Err(LoadoutError::CatalogDiscovery {
                        detail: format!(
                            "catalog path override must be a directory: {}",
                            canonical_path.display()
                        ),
                    });
                }

                debug!(
                    "Using user catalog override: {} (resolved to {})",
                    override_path.display(),
                    canonical_path.display()
                );
                return Ok(Self::from_root(canonical_path));
            }

            debug!(
                "User catalog override {} does not exist yet; it will be created on first write",
                override_path.display()
            );
            return Ok(Self::from_root(override_path));
        }

        let config_dir = Self::platform_config_dir()?;
        let root = config_dir.join("loadout");
        if root.exists() {
            debug!("Found user catalog at {:?}", root);
        } else {
            debug!("No user catalog at {:?} yet", root);
        }
        Ok(Self::from_root(root))
    }

    /// Build the user catalog layout from its root directory. The root
    /// need not exist.
    pub fn from_root(root: PathBuf) -> Self {
        UserCatalogPaths {
            catalog_file: root.join("catalog.json"),
            rules_dir: root.join("rules"),
            root,
        }
    }

    /// Get the platform-specific config directory.
    fn platform_config_dir() -> Result<PathBuf> {
        use directories::ProjectDirs;

        // On Linux: ~/.config/
        // On macOS: ~/Library/Application Support/
        // On Windows: %APPDATA%\
        if let Some(proj_dirs) = ProjectDirs::from("", "", "loadout") {
            if let Some(parent) = proj_dirs.config_dir().parent() {
                return Ok(parent.to_path_buf());
            }
        }

        // Fallback to home directory approach
        #[cfg(unix)]
        {
            if let Ok(home) = std::env::var("HOME") {
                return Ok(PathBuf::from(home).join(".config"));
            }
        }

        #[cfg(windows)]
        {
            if let Ok(appdata) = std::env::var("APPDATA") {
                return Ok(PathBuf::from(appdata));
            }
        }

        Err(LoadoutError::CatalogDiscovery {
            detail: "could not determine platform config directory".to_string(),
        })
    }

    /// Check whether the user catalog file exists.
    pub fn is_initialized(&self) -> bool {
        self.catalog_file.exists()
    }

    /// Create the user catalog directory structure with an empty catalog.
    /// Existing files are left untouched.
    pub fn initialize(&self) -> Result<()> {
        debug!("Initializing user catalog at {:?}", self.root);

        std::fs::create_dir_all(&self.root).map_err(|source| LoadoutError::Io {
            path: self.root.clone(),
            source,
        })?;
        std::fs::create_dir_all(&self.rules_dir).map_err(|source| LoadoutError::Io {
            path: self.rules_dir.clone(),
            source,
        })?;

        if !self.catalog_file.exists() {
            let catalog_content = r#"{
  "customModes": [],
  "customCategories": []
}
"#;
            std::fs::write(&self.catalog_file, catalog_content).map_err(|source| {
                LoadoutError::Io {
                    path: self.catalog_file.clone(),
                    source,
                }
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_system_from_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();

        let paths = SystemCatalogPaths::from_root(root.clone()).unwrap();

        assert_eq!(paths.root, root);
        assert_eq!(paths.modes_file, root.join("modes.json"));
        assert_eq!(paths.categories_file, root.join("categories.json"));
        assert_eq!(paths.rules_dir, root.join("rules"));
    }

    #[test]
    fn test_system_from_root_nonexistent() {
        let result = SystemCatalogPaths::from_root(PathBuf::from("/nonexistent/path"));
        assert!(result.is_err());
    }

    #[test]
    fn test_user_from_root() {
        let root = PathBuf::from("/tmp/anywhere");
        let paths = UserCatalogPaths::from_root(root.clone());

        assert_eq!(paths.root, root);
        assert_eq!(paths.catalog_file, root.join("catalog.json"));
        assert_eq!(paths.rules_dir, root.join("rules"));
    }

    #[test]
    fn test_discover_with_override() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();

        let paths = UserCatalogPaths::discover_with_override(Some(root.clone())).unwrap();

        // Path is canonicalized, so compare canonicalized versions
        let expected_root = root.canonicalize().unwrap();
        assert_eq!(paths.root, expected_root);
    }

    #[test]
    fn test_discover_with_relative_override() {
        let result = UserCatalogPaths::discover_with_override(Some(PathBuf::from("relative/path")));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("must be absolute"));
    }

    #[test]
    fn test_discover_with_absent_override_is_accepted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("not-created-yet");

        let paths = UserCatalogPaths::discover_with_override(Some(root.clone())).unwrap();
        assert_eq!(paths.root, root);
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_discover_uses_platform_directory() {
        let paths = UserCatalogPaths::discover().unwrap();
        assert!(paths.root.ends_with("loadout"));
    }

    #[test]
    fn test_initialize_creates_structure() {
        let temp_dir = TempDir::new().unwrap();
        let paths = UserCatalogPaths::from_root(temp_dir.path().join("loadout"));

        assert!(!paths.is_initialized());
        paths.initialize().unwrap();

        assert!(paths.is_initialized());
        assert!(paths.root.exists());
        assert!(paths.rules_dir.exists());

        let content = std::fs::read_to_string(&paths.catalog_file).unwrap();
        assert!(content.contains("customModes"));
        assert!(content.contains("customCategories"));
    }

    #[test]
    fn test_initialize_preserves_existing_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let paths = UserCatalogPaths::from_root(temp_dir.path().to_path_buf());

        std::fs::write(&paths.catalog_file, "{\"customModes\": []}").unwrap();
        paths.initialize().unwrap();

        let content = std::fs::read_to_string(&paths.catalog_file).unwrap();
        assert_eq!(content, "{\"customModes\": []}");
    }
}
