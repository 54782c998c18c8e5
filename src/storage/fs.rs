//! Local filesystem storage backend

use crate::storage::traits::{MirrorStorage, StorageError, StorageResult};
use std::io::ErrorKind;
use std::path::Path;

/// Mirror storage writing straight to the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl FsStorage {
    /// Creates a new filesystem backend
    pub fn new() -> Self {
        Self
    }
}

impl MirrorStorage for FsStorage {
    fn remove_tree(&self, path: &Path) -> StorageResult<()> {
        match std::fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    fn ensure_dir(&self, path: &Path) -> StorageResult<()> {
        std::fs::create_dir_all(path).map_err(|e| StorageError::io(path, e))
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> StorageResult<()> {
        std::fs::write(path, bytes).map_err(|e| StorageError::io(path, e))
    }
}
