use crate::config::{ensure_project_root, StoreConfig, CONTENT_DIR};
use crate::document::{frontmatter_to_json, Document, Frontmatter, FrontmatterError};
use crate::error::{Result, StoreError};
use crate::path_guard::PathGuard;
use crate::schema::SchemaAccessor;
use std::path::{Path, PathBuf};

/// The main entry point for mdstore.
/// Owns the canonical content root and routes every operation through the
/// path guard before touching the filesystem. Holds no other state, so a
/// single instance can serve concurrent callers; the filesystem is the only
/// shared resource and nothing here serializes writers to the same file.
pub struct Store {
    project_root: PathBuf,
    guard: PathGuard,
    schema: SchemaAccessor,
}

impl Store {
    /// Open a store for the given project root.
    /// The project root must exist and be a directory; the content root
    /// (`<project_root>/content`) may be missing until the first write.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let project_root = config.project_root.canonicalize().map_err(|e| {
            StoreError::Configuration(format!(
                "cannot resolve project root {}: {e}",
                config.project_root.display()
            ))
        })?;
        ensure_project_root(&project_root)?;

        let content_root = project_root.join(CONTENT_DIR);
        let content_root = if content_root.is_dir() {
            content_root
                .canonicalize()
                .map_err(|e| StoreError::io("open", &content_root, e))?
        } else {
            content_root
        };

        log::debug!("Opened store with content root {}", content_root.display());

        Ok(Store {
            schema: SchemaAccessor::new(&project_root),
            guard: PathGuard::new(content_root),
            project_root,
        })
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn content_root(&self) -> &Path {
        self.guard.root()
    }

    fn check_root(&self) -> Result<()> {
        ensure_project_root(&self.project_root)
    }

    /// Validate and resolve a document path. Purely lexical.
    fn resolve(
        &self,
        collection: &str,
        relative_path: &str,
        allow_subdirectories: bool,
    ) -> Result<(PathBuf, PathBuf)> {
        let collection_path = self.guard.resolve_collection(collection)?;
        let doc_path =
            self.guard
                .resolve_document(&collection_path, relative_path, allow_subdirectories)?;
        Ok((collection_path, doc_path))
    }

    // ── Listing ─────────────────────────────────────────────────────

    /// Names of the top-level collection directories, hidden ones excluded.
    pub fn list_collections(&self) -> Result<Vec<String>> {
        self.check_root()?;
        let root = self.content_root();
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = read_dir_entries("list_collections", root)?
            .into_iter()
            .filter(|(_, path)| path.is_dir())
            .map(|(name, _)| name)
            .filter(|name| !name.starts_with('.'))
            .collect();
        names.sort();
        Ok(names)
    }

    /// File names directly under the collection, or every file below it with
    /// forward-slash relative paths when `recursive` is set.
    pub fn list_documents(&self, collection: &str, recursive: bool) -> Result<Vec<String>> {
        let dir = self.guard.resolve_collection(collection)?;
        self.check_root()?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut docs = if recursive {
            list_files_recursive(&dir)?
        } else {
            read_dir_entries("list_documents", &dir)?
                .into_iter()
                .filter(|(_, path)| path.is_file())
                .map(|(name, _)| name)
                .collect()
        };
        docs.sort();

        log::debug!("Listed {} documents in {collection}", docs.len());
        Ok(docs)
    }

    // ── Document CRUD ───────────────────────────────────────────────

    /// Full raw text of a document.
    pub fn read(&self, collection: &str, relative_path: &str) -> Result<String> {
        let (_, path) = self.resolve(collection, relative_path, true)?;
        self.check_root()?;
        if !path.is_file() {
            return Err(not_found("read", collection, relative_path));
        }
        std::fs::read_to_string(&path).map_err(|e| StoreError::io("read", &path, e))
    }

    /// Create a new document directly in the collection directory.
    /// The collection directory is created on demand.
    pub fn create(&self, collection: &str, relative_path: &str, content: &str) -> Result<String> {
        let (collection_path, path) = self.resolve(collection, relative_path, false)?;
        self.check_root()?;
        if path.exists() {
            return Err(already_exists("create", collection, relative_path));
        }

        std::fs::create_dir_all(&collection_path)
            .map_err(|e| StoreError::io("create", &collection_path, e))?;
        std::fs::write(&path, content).map_err(|e| StoreError::io("create", &path, e))?;

        log::info!("Created document {collection}/{relative_path}");
        Ok(format!("Created {collection}/{relative_path}"))
    }

    /// Replace the full content of an existing document.
    pub fn update(&self, collection: &str, relative_path: &str, content: &str) -> Result<String> {
        let (_, path) = self.resolve(collection, relative_path, false)?;
        self.check_root()?;
        if !path.is_file() {
            return Err(not_found("update", collection, relative_path));
        }

        std::fs::write(&path, content).map_err(|e| StoreError::io("update", &path, e))?;

        log::info!("Updated document {collection}/{relative_path}");
        Ok(format!("Updated {collection}/{relative_path}"))
    }

    pub fn delete(&self, collection: &str, relative_path: &str) -> Result<String> {
        let (_, path) = self.resolve(collection, relative_path, false)?;
        self.check_root()?;
        if !path.is_file() {
            return Err(not_found("delete", collection, relative_path));
        }

        std::fs::remove_file(&path).map_err(|e| StoreError::io("delete", &path, e))?;

        log::info!("Deleted document {collection}/{relative_path}");
        Ok(format!("Deleted {collection}/{relative_path}"))
    }

    /// Move a document within its collection, creating destination
    /// directories as needed. Fails if the destination is already taken.
    pub fn move_document(&self, collection: &str, old_path: &str, new_path: &str) -> Result<String> {
        let (_, source) = self.resolve(collection, old_path, true)?;
        let (_, dest) = self.resolve(collection, new_path, true)?;
        self.check_root()?;
        self.check_transfer("move", collection, &source, old_path, &dest, new_path)?;

        std::fs::rename(&source, &dest).map_err(|e| StoreError::io("move", &source, e))?;

        log::info!("Moved document {collection}/{old_path} to {collection}/{new_path}");
        Ok(format!("Moved {collection}/{old_path} to {collection}/{new_path}"))
    }

    /// Copy a document within its collection; the source is left untouched.
    pub fn copy(&self, collection: &str, source_path: &str, dest_path: &str) -> Result<String> {
        let (_, source) = self.resolve(collection, source_path, true)?;
        let (_, dest) = self.resolve(collection, dest_path, true)?;
        self.check_root()?;
        self.check_transfer("copy", collection, &source, source_path, &dest, dest_path)?;

        std::fs::copy(&source, &dest).map_err(|e| StoreError::io("copy", &dest, e))?;

        log::info!("Copied document {collection}/{source_path} to {collection}/{dest_path}");
        Ok(format!("Copied {collection}/{source_path} to {collection}/{dest_path}"))
    }

    /// Shared preconditions of move and copy: source present, destination
    /// absent, destination parent created.
    fn check_transfer(
        &self,
        operation: &'static str,
        collection: &str,
        source: &Path,
        source_rel: &str,
        dest: &Path,
        dest_rel: &str,
    ) -> Result<()> {
        if !source.is_file() {
            return Err(not_found(operation, collection, source_rel));
        }
        if dest.exists() {
            return Err(already_exists(operation, collection, dest_rel));
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(operation, parent, e))?;
        }
        Ok(())
    }

    // ── Front matter ────────────────────────────────────────────────

    /// Front matter of a document; empty when it has none.
    pub fn get_metadata(&self, collection: &str, relative_path: &str) -> Result<Frontmatter> {
        let (_, doc) = self.load_document("get_metadata", collection, relative_path)?;
        Ok(doc.frontmatter)
    }

    /// Front matter rendered as pretty-printed JSON text.
    pub fn get_metadata_json(&self, collection: &str, relative_path: &str) -> Result<String> {
        let frontmatter = self.get_metadata(collection, relative_path)?;
        let json = frontmatter_to_json(&frontmatter)
            .map_err(|e| format_error("get_metadata", collection, relative_path, e))?;
        Ok(serde_json::to_string_pretty(&json)?)
    }

    /// Merge `updates` (a JSON object) into the document's front matter.
    /// Top-level keys are overwritten, other keys and the body are kept.
    ///
    /// This is a read followed by a write with no locking: concurrent
    /// updates to the same document can lose writes.
    pub fn update_metadata(
        &self,
        collection: &str,
        relative_path: &str,
        updates: &serde_json::Value,
    ) -> Result<String> {
        let updates = updates.as_object().ok_or_else(|| {
            StoreError::Validation(format!(
                "metadata updates for {collection}/{relative_path} must be a JSON object"
            ))
        })?;

        let (path, mut doc) = self.load_document("update_metadata", collection, relative_path)?;
        doc.merge(updates);
        let rendered = doc
            .render()
            .map_err(|e| format_error("update_metadata", collection, relative_path, e))?;

        std::fs::write(&path, rendered).map_err(|e| StoreError::io("update_metadata", &path, e))?;

        log::info!(
            "Updated metadata for {collection}/{relative_path} ({} keys)",
            updates.len()
        );
        Ok(format!("Updated metadata for {collection}/{relative_path}"))
    }

    /// Same as [`Store::update_metadata`], taking the payload as JSON text.
    pub fn update_metadata_json(
        &self,
        collection: &str,
        relative_path: &str,
        updates: &str,
    ) -> Result<String> {
        let updates: serde_json::Value = serde_json::from_str(updates).map_err(|e| {
            StoreError::Validation(format!("metadata updates are not valid JSON: {e}"))
        })?;
        self.update_metadata(collection, relative_path, &updates)
    }

    fn load_document(
        &self,
        operation: &'static str,
        collection: &str,
        relative_path: &str,
    ) -> Result<(PathBuf, Document)> {
        let (_, path) = self.resolve(collection, relative_path, true)?;
        self.check_root()?;
        if !path.is_file() {
            return Err(not_found(operation, collection, relative_path));
        }
        let text = std::fs::read_to_string(&path).map_err(|e| StoreError::io(operation, &path, e))?;
        let doc = Document::parse(&text)
            .map_err(|e| format_error(operation, collection, relative_path, e))?;
        Ok((path, doc))
    }

    // ── Schema ──────────────────────────────────────────────────────

    /// Raw schema descriptor text from the project root.
    pub fn read_schema(&self) -> Result<String> {
        self.check_root()?;
        self.schema.read()
    }
}

/// (file name, full path) for every entry of `dir` with a UTF-8 name.
fn read_dir_entries(operation: &'static str, dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = std::fs::read_dir(dir).map_err(|e| StoreError::io(operation, dir, e))?;
    let mut out = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {e}", dir.display());
                continue;
            }
        };
        match entry.file_name().into_string() {
            Ok(name) => out.push((name, entry.path())),
            Err(name) => log::warn!("Skipping non UTF-8 name {name:?} in {}", dir.display()),
        }
    }
    Ok(out)
}

/// Every file below `dir`, as forward-slash paths relative to it.
fn list_files_recursive(dir: &Path) -> Result<Vec<String>> {
    let pattern = format!("{}/**/*", glob::Pattern::escape(&dir.to_string_lossy()));
    let paths = glob::glob(&pattern).map_err(|e| {
        StoreError::io(
            "list_documents",
            dir,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
        )
    })?;

    let mut files = Vec::new();
    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                log::warn!("Skipping unreadable path while listing {}: {e}", dir.display());
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        if let Ok(rel) = path.strip_prefix(dir) {
            files.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(files)
}

fn not_found(operation: &'static str, collection: &str, path: &str) -> StoreError {
    StoreError::NotFound {
        operation,
        collection: collection.to_string(),
        path: path.to_string(),
    }
}

fn already_exists(operation: &'static str, collection: &str, path: &str) -> StoreError {
    StoreError::AlreadyExists {
        operation,
        collection: collection.to_string(),
        path: path.to_string(),
    }
}

fn format_error(
    operation: &'static str,
    collection: &str,
    path: &str,
    err: FrontmatterError,
) -> StoreError {
    StoreError::Format {
        operation,
        collection: collection.to_string(),
        path: path.to_string(),
        message: err.to_string(),
    }
}
