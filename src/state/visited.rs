//! Visited registry enforcing at-most-once fetch per URL

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use url::Url;

/// Set of canonical URLs that have been claimed for fetching in a run
///
/// The registry is the single source of truth for "has this URL been (or is
/// it about to be) fetched". Entries are never removed; a new run gets a new
/// registry.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    claimed: Mutex<HashSet<String>>,
}

impl VisitedRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims a URL for fetching
    ///
    /// Returns `true` exactly once per URL: on the first call. Every later
    /// call for the same URL, from any task, returns `false`. Must be called
    /// before the network request is issued.
    pub fn try_claim(&self, url: &Url) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.as_str().to_string())
    }

    /// Returns true if the URL has already been claimed
    pub fn contains(&self, url: &Url) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url.as_str())
    }

    /// Number of URLs claimed so far
    pub fn len(&self) -> usize {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns whether nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
