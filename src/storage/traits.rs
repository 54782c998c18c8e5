//! Storage traits and error types
//!
//! This module defines the filesystem capabilities the crawler needs to
//! build a mirror, so the orchestrator and worker can be exercised against
//! something other than the real disk.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Wraps an IO error together with the path it occurred on
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for mirror storage backends
///
/// Implementations must be shareable across the concurrently running
/// members of a batch.
pub trait MirrorStorage: Send + Sync {
    /// Recursively deletes `path`; a missing path is not an error
    fn remove_tree(&self, path: &Path) -> StorageResult<()>;

    /// Creates `path` and any missing parents
    fn ensure_dir(&self, path: &Path) -> StorageResult<()>;

    /// Writes `bytes` to `path`, replacing any existing file
    fn write_file(&self, path: &Path, bytes: &[u8]) -> StorageResult<()>;

    /// Creates the parent directories of `path`, then writes the file
    fn persist(&self, path: &Path, bytes: &[u8]) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            self.ensure_dir(parent)?;
        }
        self.write_file(path, bytes)
    }
}
