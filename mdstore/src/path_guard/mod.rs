// Path guard - validates collection names and relative paths, keeps every
// resolved path inside the content root. Purely lexical: no filesystem access.

use crate::error::{Result, StoreError};
use std::path::{Component, Path, PathBuf};

const SEPARATORS: [char; 2] = ['/', '\\'];

/// Resolves caller-supplied names against a fixed content root.
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    /// `root` must already be absolute and canonical.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PathGuard { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a collection name to `<root>/<collection>`.
    pub fn resolve_collection(&self, collection: &str) -> Result<PathBuf> {
        if collection.is_empty() {
            return Err(invalid("collection name must not be empty"));
        }
        if collection.contains(SEPARATORS) {
            return Err(invalid(format!(
                "collection name must not contain path separators: '{collection}'"
            )));
        }
        if collection == ".." || collection == "." || collection.contains('\0') {
            return Err(invalid(format!("invalid collection name: '{collection}'")));
        }

        let path = self.root.join(collection);
        self.ensure_inside(&path)?;
        Ok(path)
    }

    /// Resolve a document path relative to an already-resolved collection
    /// directory. Subdirectory segments are only accepted when
    /// `allow_subdirectories` is set.
    pub fn resolve_document(
        &self,
        collection_path: &Path,
        relative_path: &str,
        allow_subdirectories: bool,
    ) -> Result<PathBuf> {
        if relative_path.is_empty() {
            return Err(invalid("document path must not be empty"));
        }
        if relative_path.contains('\0') {
            return Err(invalid("document path must not contain NUL bytes"));
        }
        if is_absolute_form(relative_path) {
            return Err(invalid(format!(
                "document path must be relative: '{relative_path}'"
            )));
        }
        if !allow_subdirectories && relative_path.contains(SEPARATORS) {
            return Err(invalid(format!(
                "document path must not contain subdirectories: '{relative_path}'"
            )));
        }

        let mut resolved = collection_path.to_path_buf();
        let mut pushed = 0usize;
        for segment in relative_path.split(SEPARATORS) {
            match segment {
                ".." => {
                    return Err(invalid(format!(
                        "document path must not contain '..': '{relative_path}'"
                    )))
                }
                "" | "." => continue,
                name => {
                    resolved.push(name);
                    pushed += 1;
                }
            }
        }
        if pushed == 0 {
            return Err(invalid(format!(
                "document path does not name a file: '{relative_path}'"
            )));
        }

        self.ensure_inside(&resolved)?;
        if !resolved.starts_with(collection_path) {
            return Err(invalid(format!(
                "document path escapes its collection: '{relative_path}'"
            )));
        }
        Ok(resolved)
    }

    /// True when `path` is the root itself or lies below it.
    /// Comparison is per path component, so `content-backup` is never
    /// treated as inside `content`.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
            && path
                .components()
                .all(|c| !matches!(c, Component::ParentDir | Component::CurDir))
    }

    fn ensure_inside(&self, path: &Path) -> Result<()> {
        if self.contains(path) && path != self.root {
            Ok(())
        } else {
            Err(invalid(format!(
                "path resolves outside the content root: {}",
                path.display()
            )))
        }
    }
}

/// Unix roots, UNC/backslash roots and Windows drive prefixes (`C:`).
fn is_absolute_form(path: &str) -> bool {
    if path.starts_with(SEPARATORS) || Path::new(path).has_root() {
        return true;
    }
    let mut chars = path.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic()
    )
}

fn invalid(message: impl Into<String>) -> StoreError {
    StoreError::Validation(message.into())
}
