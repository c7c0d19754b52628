//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading and writing pages under a document-root
//! directory on the local filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::{Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage implementation.
///
/// Maps root-relative URL paths onto files under a document-root directory,
/// the way a web server maps request paths onto its docroot.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use stencil_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("htdocs"));
/// let html = storage.read("/style/default/index.html")?;
/// ```
pub struct FsStorage {
    /// Document-root directory that URL paths are resolved against.
    document_root: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `document_root`.
    #[must_use]
    pub fn new(document_root: PathBuf) -> Self {
        Self { document_root }
    }

    /// Resolve a URL path to a concrete file path under the document root.
    ///
    /// Rejects paths containing parent directory components (`..`) to prevent
    /// path traversal outside the document root (e.g., `../../etc/passwd`).
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path.trim_start_matches('/'));

        let has_parent_dir = relative
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir));

        if has_parent_dir {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }

        Ok(self.document_root.join(relative))
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &str) -> Result<String, StorageError> {
        let file = self.resolve(path)?;
        fs::read_to_string(&file)
            .map_err(|e| StorageError::io(e, Some(file)).with_backend(BACKEND))
    }

    fn write(&self, path: &str, contents: &str) -> Result<(), StorageError> {
        let file = self.resolve(path)?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::io(e, Some(parent.to_path_buf())).with_backend(BACKEND))?;
        }
        fs::write(&file, contents)
            .map_err(|e| StorageError::io(e, Some(file)).with_backend(BACKEND))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|file| file.is_file())
    }
}
