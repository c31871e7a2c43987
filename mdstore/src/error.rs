use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{operation}: document not found: {collection}/{path}")]
    NotFound {
        operation: &'static str,
        collection: String,
        path: String,
    },

    #[error("Schema file not found: {}", path.display())]
    SchemaNotFound { path: PathBuf },

    #[error("{operation}: document already exists: {collection}/{path}")]
    AlreadyExists {
        operation: &'static str,
        collection: String,
        path: String,
    },

    #[error("{operation}: invalid front matter in {collection}/{path}: {message}")]
    Format {
        operation: &'static str,
        collection: String,
        path: String,
        message: String,
    },

    #[error("{operation}: IO error on {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Wrap a filesystem error with the operation and path it happened on.
    pub fn io(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Classification a host can map onto its own status codes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Configuration(_) => ErrorKind::Configuration,
            StoreError::Validation(_) => ErrorKind::Validation,
            StoreError::NotFound { .. } | StoreError::SchemaNotFound { .. } => ErrorKind::NotFound,
            StoreError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            StoreError::Format { .. } => ErrorKind::Format,
            StoreError::Io { .. } | StoreError::Json(_) => ErrorKind::Io,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Validation,
    NotFound,
    AlreadyExists,
    Format,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::Format => "format",
            ErrorKind::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
