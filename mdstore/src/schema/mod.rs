// Schema descriptor access - opaque read-only passthrough, never parsed

use crate::config::SCHEMA_FILE;
use crate::error::{Result, StoreError};
use std::path::{Path, PathBuf};

/// Reads the CMS schema descriptor from `<project_root>/.tina/schema.json`.
#[derive(Debug, Clone)]
pub struct SchemaAccessor {
    path: PathBuf,
}

impl SchemaAccessor {
    pub fn new(project_root: &Path) -> Self {
        SchemaAccessor {
            path: project_root.join(SCHEMA_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the descriptor text exactly as stored.
    pub fn read(&self) -> Result<String> {
        if !self.path.is_file() {
            return Err(StoreError::SchemaNotFound {
                path: self.path.clone(),
            });
        }
        std::fs::read_to_string(&self.path).map_err(|e| StoreError::io("read_schema", &self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_read_schema_verbatim() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join(".tina")).unwrap();
        // Not valid JSON on purpose: contents are passed through untouched.
        let raw = "{ \"collections\": [ not json\n";
        std::fs::write(tmp.path().join(".tina/schema.json"), raw).unwrap();

        let accessor = SchemaAccessor::new(tmp.path());
        assert_eq!(accessor.read().unwrap(), raw);
    }

    #[test]
    fn test_missing_schema() {
        let tmp = TempDir::new().unwrap();
        let err = SchemaAccessor::new(tmp.path()).read().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_schema_is_not_under_content_root() {
        let accessor = SchemaAccessor::new(Path::new("/srv/site"));
        assert_eq!(accessor.path(), Path::new("/srv/site/.tina/schema.json"));
    }
}
