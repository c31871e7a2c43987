// Store configuration - project root resolution and derived locations

use crate::error::{Result, StoreError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no project root is given explicitly.
pub const PROJECT_ROOT_ENV: &str = "MDSTORE_PROJECT_ROOT";

/// Directory under the project root that holds all collections.
pub const CONTENT_DIR: &str = "content";

/// Schema descriptor location, relative to the project root.
pub const SCHEMA_FILE: &str = ".tina/schema.json";

/// Explicit configuration handed to [`crate::Store::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub project_root: PathBuf,
}

impl StoreConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        StoreConfig {
            project_root: project_root.into(),
        }
    }

    /// Read the project root from `MDSTORE_PROJECT_ROOT`.
    pub fn from_env() -> Result<Self> {
        Self::from_env_value(std::env::var_os(PROJECT_ROOT_ENV))
    }

    /// Use `explicit` when given, otherwise fall back to the environment.
    pub fn resolve(explicit: Option<&str>) -> Result<Self> {
        match explicit {
            Some(root) if !root.trim().is_empty() => Ok(Self::new(root)),
            _ => Self::from_env(),
        }
    }

    fn from_env_value(value: Option<OsString>) -> Result<Self> {
        match value {
            Some(v) if !v.is_empty() => Ok(Self::new(v)),
            _ => Err(StoreError::Configuration(format!(
                "project root is not set (pass it explicitly or set {PROJECT_ROOT_ENV})"
            ))),
        }
    }

    pub fn content_root(&self) -> PathBuf {
        self.project_root.join(CONTENT_DIR)
    }

    pub fn schema_path(&self) -> PathBuf {
        self.project_root.join(SCHEMA_FILE)
    }
}

/// Fail with a configuration error unless `root` is an existing directory.
pub(crate) fn ensure_project_root(root: &Path) -> Result<()> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(StoreError::Configuration(format!(
            "project root is not a directory: {}",
            root.display()
        )))
    }
}
