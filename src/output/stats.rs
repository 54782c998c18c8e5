//! Crawl statistics accumulated from worker outcomes
//!
//! This module tallies per-URL outcomes during a run and prints the final
//! report.

use crate::crawler::{FetchOutcome, ResourceKind};
use crate::output::CrawlReport;

/// Running counters for a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    pub pages_saved: usize,
    pub resources_saved: usize,
    pub skipped: usize,
    pub fetch_failed: usize,
    pub not_found: usize,
    pub batches: usize,
}

impl CrawlStatistics {
    /// Counts one worker outcome
    pub fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Saved {
                kind: ResourceKind::Markup,
                ..
            } => self.pages_saved += 1,
            FetchOutcome::Saved {
                kind: ResourceKind::Opaque,
                ..
            } => self.resources_saved += 1,
            FetchOutcome::Skipped { .. } => self.skipped += 1,
            FetchOutcome::FetchFailed { error, .. } => {
                self.fetch_failed += 1;
                if error.is_not_found() {
                    self.not_found += 1;
                }
            }
            FetchOutcome::PersistFailed { .. } => {}
        }
    }
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Status: {}", report.state);
    println!("Started:  {}", report.started_at.to_rfc3339());
    println!("Finished: {}", report.finished_at.to_rfc3339());
    println!("Elapsed:  {:.2}s", report.elapsed.as_secs_f64());
    println!();

    println!("Overview:");
    println!("  URLs visited: {}", report.visited);
    println!("  Batches: {}", report.batches);
    println!("  Pages saved: {}", report.pages_saved);
    println!("  Resources saved: {}", report.resources_saved);
    println!(
        "  Failed fetches: {} ({} not found)",
        report.fetch_failed, report.not_found
    );
}
