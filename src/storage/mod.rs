//! Storage module for persisting the mirror
//!
//! This module handles all filesystem operations for the crawler:
//! - Clearing and recreating the mirror root at the start of a run
//! - Creating directories on demand
//! - Writing fetched bodies verbatim

mod fs;
mod traits;

pub use fs::FsStorage;
pub use traits::{MirrorStorage, StorageError, StorageResult};
