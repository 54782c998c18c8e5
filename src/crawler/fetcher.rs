//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Choosing between text and raw-byte response handling
//! - Bounding every request with a timeout
//! - Error classification
//! - Content-type classification (markup vs. opaque resource)

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// File extensions always fetched as raw bytes
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "avif", "bmp", "ico", "tif", "tiff", "woff", "woff2",
    "ttf", "otf", "eot", "pdf", "zip", "gz", "tgz", "mp3", "mp4", "ogg", "wav", "webm",
];

/// How a response body is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Decode the body as text (charset from the response headers)
    Text,
    /// Keep the body as raw bytes
    Binary,
}

/// What the worker does with a fetched body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Renderable markup: saved, then parsed for further links
    Markup,
    /// Anything else: saved verbatim
    Opaque,
}

/// Errors for a single fetch; never fatal to the run
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl FetchError {
    /// HTTP status carried by the error, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }

    /// Returns true for an HTTP 404 response
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    fn from_send(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Network(format!("Connection failed: {}", error))
        } else {
            Self::Network(error.to_string())
        }
    }

    fn from_body(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Body(error.to_string())
        }
    }
}

/// The transient result of one successful fetch
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// URL that was requested
    pub url: Url,
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value, if present
    pub content_type: Option<String>,
    /// Response body
    pub body: Vec<u8>,
}

impl FetchedResource {
    /// Classifies the resource by its declared content type
    pub fn kind(&self) -> ResourceKind {
        classify_content_type(self.content_type.as_deref())
    }
}

/// Decides whether a declared content type is renderable markup
///
/// `text/html` and `application/xhtml+xml` are markup, compared
/// case-insensitively with parameters such as `charset` ignored. Everything
/// else, including a missing header, is opaque.
pub fn classify_content_type(content_type: Option<&str>) -> ResourceKind {
    match content_type.map(media_type).as_deref() {
        Some("text/html" | "application/xhtml+xml") => ResourceKind::Markup,
        _ => ResourceKind::Opaque,
    }
}

/// Lowercased media type with parameters stripped
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Returns true if a body should be decoded rather than kept as raw bytes
///
/// Only `text/*` resources other than markup are decoded in text mode.
/// Markup keeps its original bytes so the saved page still matches its
/// declared charset, and every other type is saved verbatim.
fn decodes_as_text(mode: ResponseMode, content_type: Option<&str>) -> bool {
    if mode == ResponseMode::Binary {
        return false;
    }

    match content_type {
        Some(content_type) => {
            media_type(content_type).starts_with("text/")
                && classify_content_type(Some(content_type)) == ResourceKind::Opaque
        }
        None => false,
    }
}

/// Picks the response mode for a URL
///
/// Paths under one of `binary_prefixes`, or ending in a known binary file
/// extension, are read as raw bytes so they are not corrupted by text
/// decoding. Everything else is read as text.
pub fn response_mode_for(url: &Url, binary_prefixes: &[String]) -> ResponseMode {
    let path = url.path();

    if binary_prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix.as_str()))
    {
        return ResponseMode::Binary;
    }

    let extension = path
        .rsplit('/')
        .next()
        .and_then(|file| file.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if BINARY_EXTENSIONS.contains(&ext.as_str()) => ResponseMode::Binary,
        _ => ResponseMode::Text,
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - Crawler settings supplying the timeouts
///
/// # Example
///
/// ```no_run
/// use site_mirror::config::{CrawlerConfig, UserAgentConfig};
/// use site_mirror::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_millis(crawler.request_timeout_ms))
        .connect_timeout(Duration::from_millis(crawler.connect_timeout_ms))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL
///
/// Exactly one GET request is issued. Any non-2xx status, network error or
/// timeout (connection, headers or body) becomes a [`FetchError`]. Bodies
/// are kept as raw bytes unless text mode applies to a `text/*` resource.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `mode` - Whether textual bodies may be decoded or must stay raw bytes
/// * `timeout` - Upper bound on the whole request
pub async fn fetch_url(
    client: &Client,
    url: &Url,
    mode: ResponseMode,
    timeout: Duration,
) -> Result<FetchedResource, FetchError> {
    let response = client
        .get(url.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(FetchError::from_send)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = if decodes_as_text(mode, content_type.as_deref()) {
        response
            .text()
            .await
            .map_err(FetchError::from_body)?
            .into_bytes()
    } else {
        response
            .bytes()
            .await
            .map_err(FetchError::from_body)?
            .to_vec()
    };

    Ok(FetchedResource {
        url: url.clone(),
        status: status.as_u16(),
        content_type,
        body,
    })
}
