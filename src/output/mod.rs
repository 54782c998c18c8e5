//! Output module for progress reporting
//!
//! This module handles:
//! - Per-batch progress observations (visited / remaining)
//! - The end-of-run report (terminal state, timing, counts)
//! - Console statistics

pub mod stats;
mod traits;

pub use stats::{print_report, CrawlStatistics};
pub use traits::{BatchProgress, CrawlReport, ProgressObserver, TracingObserver};
