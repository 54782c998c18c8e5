//! Progress observer trait and the data it receives

use crate::state::RunState;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Snapshot emitted after every completed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// 1-based batch number
    pub batch: usize,
    /// Number of URLs drawn for this batch
    pub batch_len: usize,
    /// URLs claimed so far in the run
    pub visited: usize,
    /// URLs waiting in the frontier
    pub remaining: usize,
}

/// Final summary of a crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Terminal state of the run
    pub state: RunState,
    /// URLs claimed for fetching
    pub visited: usize,
    /// Markup documents written
    pub pages_saved: usize,
    /// Opaque resources written
    pub resources_saved: usize,
    /// Fetches that failed for any reason (including 404)
    pub fetch_failed: usize,
    /// Fetches that failed with HTTP 404
    pub not_found: usize,
    /// Batches completed
    pub batches: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Monotonic wall time of the run
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Total files written to the mirror
    pub fn files_saved(&self) -> usize {
        self.pages_saved + self.resources_saved
    }
}

/// Receives progress observations from the coordinator
pub trait ProgressObserver: Send + Sync {
    /// Called after every batch has settled
    fn on_batch(&self, progress: &BatchProgress);

    /// Called once when the run reaches a terminal state
    fn on_finish(&self, report: &CrawlReport);
}

/// Observer that logs through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn on_batch(&self, progress: &BatchProgress) {
        tracing::info!(
            "Batch {} ({} URLs) done: {} visited, {} remaining",
            progress.batch,
            progress.batch_len,
            progress.visited,
            progress.remaining
        );
    }

    fn on_finish(&self, report: &CrawlReport) {
        if report.state.is_success() {
            tracing::info!(
                "Crawl {} in {:?}: {} files saved, {} visited",
                report.state,
                report.elapsed,
                report.files_saved(),
                report.visited
            );
        } else {
            tracing::error!(
                "Crawl {} after {:?}: {} files saved, {} visited",
                report.state,
                report.elapsed,
                report.files_saved(),
                report.visited
            );
        }
    }
}
