//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `VisitedRegistry`: URLs claimed for fetching, at most once each per run
//! - `RunState`: lifecycle of a crawl run (resetting, running, done, aborted...)

mod run_state;
mod visited;

// Re-export main types
pub use run_state::RunState;
pub use visited::VisitedRegistry;
