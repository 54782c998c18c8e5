//! Crawler module for fetching and mirroring a site
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching in text or binary mode
//! - HTML parsing and link extraction
//! - The deduplicating frontier and per-URL worker
//! - Batch-wise crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod worker;

pub use coordinator::{CancelHandle, Coordinator};
pub use fetcher::{
    build_http_client, classify_content_type, fetch_url, response_mode_for, FetchError,
    FetchedResource, ResourceKind, ResponseMode,
};
pub use frontier::Frontier;
pub use parser::{extract_links, extract_links_from_html, parse_html};
pub use worker::{CrawlState, FetchOutcome, Worker};
