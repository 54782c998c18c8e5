//! Site-Mirror: a single-site web mirroring crawler
//!
//! This crate crawls one website from a seed URL, discovers linked pages and
//! static assets (stylesheets, scripts, images) and reconstructs the site under
//! a local mirror root whose layout follows the URL path structure.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for run-level failures
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to reset mirror root {}: {source}", path.display())]
    ResetFailed {
        path: PathBuf,
        source: storage::StorageError,
    },

    #[error("Failed to persist {}: {source}", path.display())]
    PersistFailed {
        path: PathBuf,
        source: storage::StorageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Malformed URL '{reference}': {reason}")]
    Malformed { reference: String, reason: String },

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for run-level operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use crate::config::Config;
pub use crate::crawler::{CancelHandle, Coordinator};
pub use crate::output::CrawlReport;
pub use crate::state::{RunState, VisitedRegistry};
pub use crate::url::{map_to_path, resolve_url};
