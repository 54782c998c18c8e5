//! Frontier queue of URLs pending fetch
//!
//! The frontier is a FIFO backed by a set of pending entries, so a URL is
//! never queued twice while it waits. Batches are drawn in insertion order.

use std::collections::{HashSet, VecDeque};
use url::Url;

/// Deduplicated work queue drained in fixed-size batches
#[derive(Debug, Default)]
pub struct Frontier {
    /// Pending URLs in discovery order
    queue: VecDeque<Url>,

    /// Canonical strings of everything in `queue`
    pending: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL to the back of the queue
    ///
    /// Returns `false` if the URL is already pending. Callers are expected to
    /// skip URLs the visited registry has already claimed.
    pub fn push(&mut self, url: Url) -> bool {
        if !self.pending.insert(url.as_str().to_string()) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    /// Removes and returns up to `max` distinct URLs from the front
    pub fn next_batch(&mut self, max: usize) -> Vec<Url> {
        let count = max.min(self.queue.len());
        let batch: Vec<Url> = self.queue.drain(..count).collect();

        for url in &batch {
            self.pending.remove(url.as_str());
        }

        batch
    }

    /// Returns the number of URLs in the frontier
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
