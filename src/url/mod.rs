//! URL handling module for Site-Mirror
//!
//! This module provides link resolution, crawl scoping and the mapping from
//! URLs to files under the mirror root.

mod path;
mod resolve;

// Re-export main functions
pub use path::{map_to_path, INDEX_FILE};
pub use resolve::{parse_absolute, resolve_url};

use url::Url;

/// Returns true if `candidate` belongs to the site being mirrored
///
/// A URL is in scope when its origin (scheme, host and port) equals the
/// seed's. References such as `mailto:` or `javascript:` have opaque origins
/// and are never in scope.
///
/// # Examples
///
/// ```
/// use site_mirror::url::is_in_scope;
/// use url::Url;
///
/// let seed = Url::parse("https://example.com/").unwrap();
/// assert!(is_in_scope(&seed, &Url::parse("https://example.com/a.css").unwrap()));
/// assert!(!is_in_scope(&seed, &Url::parse("https://cdn.example.com/a.css").unwrap()));
/// ```
pub fn is_in_scope(seed: &Url, candidate: &Url) -> bool {
    seed.origin() == candidate.origin()
}
