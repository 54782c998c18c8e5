//! Fetch-and-dispatch worker
//!
//! One call to [`Worker::process_one`] takes a URL through claim, fetch,
//! classification and persistence, and for markup extends the frontier with
//! newly discovered in-scope links. The result is an explicit
//! [`FetchOutcome`] so the coordinator can tell fatal from non-fatal cases.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{
    fetch_url, response_mode_for, FetchError, FetchedResource, ResourceKind,
};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::extract_links_from_html;
use crate::state::VisitedRegistry;
use crate::storage::{MirrorStorage, StorageError};
use crate::url::{is_in_scope, map_to_path, resolve_url};
use reqwest::Client;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use url::Url;

/// Mutable state shared by every worker of one crawl run
///
/// Both collections are synchronized so the concurrent members of a batch
/// can claim URLs and extend the frontier.
#[derive(Debug, Default)]
pub struct CrawlState {
    visited: VisitedRegistry,
    frontier: Mutex<Frontier>,
    /// Mirror path -> URL that last wrote it
    written: Mutex<HashMap<PathBuf, String>>,
}

impl CrawlState {
    /// Creates empty run state
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL for fetching; see [`VisitedRegistry::try_claim`]
    pub fn try_claim(&self, url: &Url) -> bool {
        self.visited.try_claim(url)
    }

    /// Queues a URL unless it has been claimed or is already pending
    ///
    /// Returns true if the frontier grew.
    pub fn enqueue(&self, url: Url) -> bool {
        if self.visited.contains(&url) {
            return false;
        }
        self.frontier
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url)
    }

    /// Draws the next batch from the frontier
    pub fn next_batch(&self, max: usize) -> Vec<Url> {
        self.frontier
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_batch(max)
    }

    /// Number of URLs waiting in the frontier
    pub fn pending(&self) -> usize {
        self.frontier
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of URLs claimed so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Records that `url` is about to be written to `path`
    ///
    /// Returns the URL previously written there, if it was a different one.
    fn record_write(&self, path: &Path, url: &Url) -> Option<String> {
        let mut written = self.written.lock().unwrap_or_else(PoisonError::into_inner);
        match written.insert(path.to_path_buf(), url.as_str().to_string()) {
            Some(previous) if previous != url.as_str() => Some(previous),
            _ => None,
        }
    }
}

/// Result of processing one URL
#[derive(Debug)]
pub enum FetchOutcome {
    /// Body persisted; for markup, `discovered` new URLs were queued
    Saved {
        url: Url,
        kind: ResourceKind,
        path: PathBuf,
        discovered: usize,
    },

    /// The URL had already been claimed; nothing was fetched
    Skipped { url: Url },

    /// The fetch failed; the URL is abandoned, the run continues
    FetchFailed { url: Url, error: FetchError },

    /// Writing the mirror failed; fatal to the run
    PersistFailed {
        url: Url,
        path: PathBuf,
        error: StorageError,
    },
}

impl FetchOutcome {
    /// Returns true if the run must abort
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::PersistFailed { .. })
    }
}

/// Fetches URLs and writes them into the mirror
pub struct Worker {
    client: Client,
    storage: Arc<dyn MirrorStorage>,
    seed: Url,
    mirror_root: PathBuf,
    request_timeout: Duration,
    binary_prefixes: Vec<String>,
}

impl Worker {
    /// Creates a worker for the site rooted at `seed`
    pub fn new(
        client: Client,
        storage: Arc<dyn MirrorStorage>,
        seed: Url,
        mirror_root: PathBuf,
        config: &CrawlerConfig,
    ) -> Self {
        Self {
            client,
            storage,
            seed,
            mirror_root,
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            binary_prefixes: config.binary_prefixes.clone(),
        }
    }

    /// Processes a single URL
    ///
    /// This method:
    /// 1. Claims the URL (skips if already claimed)
    /// 2. Fetches it in text or binary mode
    /// 3. Persists the body at its mirror path
    /// 4. For markup, extracts links, resolves them and queues the new ones
    pub async fn process_one(&self, url: Url, state: &CrawlState) -> FetchOutcome {
        if !state.try_claim(&url) {
            tracing::trace!("Already claimed: {}", url);
            return FetchOutcome::Skipped { url };
        }

        let mode = response_mode_for(&url, &self.binary_prefixes);
        tracing::debug!("Fetching {} ({:?})", url, mode);

        let resource = match fetch_url(&self.client, &url, mode, self.request_timeout).await {
            Ok(resource) => resource,
            Err(error) => {
                if error.is_not_found() {
                    tracing::warn!("Not found (404): {}", url);
                } else {
                    tracing::warn!("Failed to fetch {}: {}", url, error);
                }
                return FetchOutcome::FetchFailed { url, error };
            }
        };

        let kind = resource.kind();
        let path = map_to_path(&self.mirror_root, &url);

        if let Some(previous) = state.record_write(&path, &url) {
            tracing::warn!(
                "{} overwrites {} at {}",
                url,
                previous,
                path.display()
            );
        }

        if let Err(error) = self.storage.persist(&path, &resource.body) {
            return FetchOutcome::PersistFailed { url, path, error };
        }

        let discovered = match kind {
            ResourceKind::Markup => self.enqueue_links(&resource, state),
            ResourceKind::Opaque => 0,
        };

        tracing::debug!(
            "Saved {} -> {} ({} new links)",
            url,
            path.display(),
            discovered
        );

        FetchOutcome::Saved {
            url,
            kind,
            path,
            discovered,
        }
    }

    /// Resolves the links of a markup resource and queues the unvisited, in-scope ones
    fn enqueue_links(&self, resource: &FetchedResource, state: &CrawlState) -> usize {
        let html = String::from_utf8_lossy(&resource.body);
        let mut discovered = 0;

        for link in extract_links_from_html(&html) {
            let resolved = match resolve_url(&resource.url, &link) {
                Ok(resolved) => resolved,
                Err(e) => {
                    tracing::debug!("Dropping link on {}: {}", resource.url, e);
                    continue;
                }
            };

            if !is_in_scope(&self.seed, &resolved) {
                tracing::trace!("Out of scope: {}", resolved);
                continue;
            }

            if state.enqueue(resolved) {
                discovered += 1;
            }
        }

        discovered
    }
}
