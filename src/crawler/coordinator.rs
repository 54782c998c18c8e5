//! Crawler coordinator - main crawl orchestration logic
//!
//! This module owns the lifecycle of a crawl run:
//! - Resetting the mirror root and the per-run state
//! - Seeding the frontier
//! - Drawing fixed-size batches and running their members concurrently
//! - Aborting on persistence failures, reporting progress and timing

use crate::config::Config;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::worker::{CrawlState, FetchOutcome, Worker};
use crate::output::{BatchProgress, CrawlReport, CrawlStatistics, ProgressObserver, TracingObserver};
use crate::state::RunState;
use crate::storage::{FsStorage, MirrorStorage, StorageError};
use crate::url::parse_absolute;
use crate::{ConfigError, MirrorError};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Handle used to stop a running crawl at the next batch boundary
///
/// A request made between runs stops the next run before its first batch.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Requests cancellation; the batch in flight still completes
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Consumes a pending request so it only stops the run that observes it
    fn take(&self) -> bool {
        self.cancelled.swap(false, Ordering::SeqCst)
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    seed: Url,
    mirror_root: PathBuf,
    batch_size: usize,
    storage: Arc<dyn MirrorStorage>,
    worker: Worker,
    state: CrawlState,
    run_state: RunState,
    observer: Box<dyn ProgressObserver>,
    cancel: CancelHandle,
}

impl Coordinator {
    /// Creates a coordinator writing to the local filesystem
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration; `crawler.seed` must be set
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to [`run`](Self::run)
    /// * `Err(MirrorError)` - Missing/invalid seed or HTTP client failure
    pub fn new(config: Config) -> Result<Self, MirrorError> {
        Self::with_storage(config, Arc::new(FsStorage::new()))
    }

    /// Creates a coordinator using the given storage backend
    pub fn with_storage(
        config: Config,
        storage: Arc<dyn MirrorStorage>,
    ) -> Result<Self, MirrorError> {
        let seed_str = config
            .crawler
            .seed
            .as_deref()
            .ok_or_else(|| ConfigError::Validation("a seed URL is required".to_string()))?;
        let seed = parse_absolute(seed_str)?;

        let mirror_root = PathBuf::from(&config.output.mirror_root);
        let client = build_http_client(&config.user_agent, &config.crawler)?;
        let worker = Worker::new(
            client,
            Arc::clone(&storage),
            seed.clone(),
            mirror_root.clone(),
            &config.crawler,
        );

        Ok(Self {
            seed,
            mirror_root,
            batch_size: config.crawler.batch_size.max(1),
            storage,
            worker,
            state: CrawlState::new(),
            run_state: RunState::Idle,
            observer: Box::new(TracingObserver),
            cancel: CancelHandle::default(),
        })
    }

    /// Replaces the default tracing observer
    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Returns a handle that can cancel this coordinator's runs
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Current lifecycle state
    pub fn state(&self) -> RunState {
        self.run_state
    }

    /// URLs claimed in the current (or last) run
    pub fn visited_count(&self) -> usize {
        self.state.visited_count()
    }

    /// Runs the main crawl loop
    ///
    /// This is the core crawling logic that:
    /// 1. Deletes and recreates the mirror root, resets frontier and visited set
    /// 2. Seeds the frontier
    /// 3. Draws batches and waits for every member to settle
    /// 4. Reports progress after each batch
    /// 5. Stops when the frontier is empty, on cancellation, or on a fatal failure
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Run ended in `Done` or `Cancelled`
    /// * `Err(MirrorError::ResetFailed)` - Mirror root could not be prepared; nothing fetched
    /// * `Err(MirrorError::PersistFailed)` - A write failed; the run is `Aborted`
    pub async fn run(&mut self) -> Result<CrawlReport, MirrorError> {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut stats = CrawlStatistics::default();

        self.run_state = RunState::Idle;
        self.transition(RunState::Resetting);

        if let Err(source) = self.reset() {
            self.transition(RunState::Aborted);
            self.finish(&stats, started_at, start);
            return Err(MirrorError::ResetFailed {
                path: self.mirror_root.clone(),
                source,
            });
        }

        tracing::info!(
            "Mirroring {} into {}",
            self.seed,
            self.mirror_root.display()
        );
        self.state.enqueue(self.seed.clone());
        self.transition(RunState::Running);

        loop {
            if self.cancel.take() {
                tracing::warn!("Cancellation requested, stopping before next batch");
                self.transition(RunState::Cancelled);
                break;
            }

            let batch = self.state.next_batch(self.batch_size);
            if batch.is_empty() {
                self.transition(RunState::Draining);
                self.transition(RunState::Done);
                break;
            }
            if self.state.pending() == 0 {
                self.transition(RunState::Draining);
            }

            let batch_len = batch.len();
            let outcomes = {
                let worker = &self.worker;
                let state = &self.state;
                join_all(batch.into_iter().map(|url| worker.process_one(url, state))).await
            };

            let (failed, settled): (Vec<_>, Vec<_>) =
                outcomes.into_iter().partition(FetchOutcome::is_fatal);
            for outcome in &settled {
                stats.record(outcome);
            }
            stats.batches += 1;

            let mut fatal = None;
            for outcome in failed {
                if let FetchOutcome::PersistFailed { url, path, error } = outcome {
                    tracing::error!("Failed to persist {} at {}: {}", url, path.display(), error);
                    fatal.get_or_insert((path, error));
                }
            }

            if let Some((path, source)) = fatal {
                self.transition(RunState::Aborted);
                self.finish(&stats, started_at, start);
                return Err(MirrorError::PersistFailed { path, source });
            }

            let remaining = self.state.pending();
            self.observer.on_batch(&BatchProgress {
                batch: stats.batches,
                batch_len,
                visited: self.state.visited_count(),
                remaining,
            });

            if remaining == 0 {
                if self.run_state == RunState::Running {
                    self.transition(RunState::Draining);
                }
                self.transition(RunState::Done);
                break;
            }
            if self.run_state == RunState::Draining {
                self.transition(RunState::Running);
            }
        }

        Ok(self.finish(&stats, started_at, start))
    }

    /// Clears the mirror root and the per-run state
    fn reset(&mut self) -> Result<(), StorageError> {
        self.state = CrawlState::new();
        self.storage.remove_tree(&self.mirror_root)?;
        self.storage.ensure_dir(&self.mirror_root)
    }

    /// Builds the report for the terminal state and hands it to the observer
    fn finish(
        &self,
        stats: &CrawlStatistics,
        started_at: DateTime<Utc>,
        start: Instant,
    ) -> CrawlReport {
        let report = CrawlReport {
            state: self.run_state,
            visited: self.state.visited_count(),
            pages_saved: stats.pages_saved,
            resources_saved: stats.resources_saved,
            fetch_failed: stats.fetch_failed,
            not_found: stats.not_found,
            batches: stats.batches,
            started_at,
            finished_at: Utc::now(),
            elapsed: start.elapsed(),
        };
        self.observer.on_finish(&report);
        report
    }

    fn transition(&mut self, next: RunState) {
        debug_assert!(
            self.run_state.can_transition_to(next),
            "invalid run state transition {} -> {}",
            self.run_state,
            next
        );
        tracing::trace!("Run state {} -> {}", self.run_state, next);
        self.run_state = next;
    }
}
