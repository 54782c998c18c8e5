use serde::Deserialize;

/// Main configuration structure for Site-Mirror
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Absolute URL the crawl starts from
    pub seed: Option<String>,

    /// Number of frontier entries fetched concurrently per batch
    #[serde(rename = "batch-size")]
    pub batch_size: usize,

    /// Per-request timeout covering the whole response (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// TCP connect timeout (milliseconds)
    #[serde(rename = "connect-timeout-ms")]
    pub connect_timeout_ms: u64,

    /// URL path prefixes whose responses are fetched as raw bytes
    #[serde(rename = "binary-prefixes")]
    pub binary_prefixes: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            batch_size: 20,
            request_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            binary_prefixes: vec!["/media/".to_string()],
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "site-mirror".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
            contact_email: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value.
    ///
    /// `Name/Version`, followed by `(+url; email)` when contact details are set.
    pub fn header_value(&self) -> String {
        let base = format!("{}/{}", self.crawler_name, self.crawler_version);
        match (&self.contact_url, &self.contact_email) {
            (Some(url), Some(email)) => format!("{} (+{}; {})", base, url, email),
            (Some(url), None) => format!("{} (+{})", base, url),
            (None, Some(email)) => format!("{} ({})", base, email),
            (None, None) => base,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the site is mirrored into; wiped at the start of every run
    #[serde(rename = "mirror-root")]
    pub mirror_root: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mirror_root: "./scraped_site".to_string(),
        }
    }
}
