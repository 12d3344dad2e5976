use serde::Deserialize;

/// Substrings that are never checked or crawled unless the configuration
/// overrides the list
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "linkedin.com",
    "mailto:",
    "tel:",
];

/// Main configuration structure for LinkSweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub checker: CheckerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

impl Config {
    /// Builds a configuration for a single start URL with default settings
    pub fn for_url(start_url: impl Into<String>) -> Self {
        Self {
            crawl: CrawlConfig {
                start_url: start_url.into(),
                max_depth: default_max_depth(),
                timeout_seconds: default_timeout_seconds(),
                exclude_paths: Vec::new(),
            },
            checker: CheckerConfig::default(),
            user_agent: UserAgentConfig::default(),
        }
    }
}

/// What to crawl; immutable for the duration of one crawl
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Absolute URL the crawl starts from; its host defines "internal"
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Maximum depth to follow internal pages (the start page is depth 0)
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-seconds", default = "default_timeout_seconds")]
    pub timeout_seconds: f64,

    /// Links containing any of these substrings are skipped
    #[serde(rename = "exclude-paths", default)]
    pub exclude_paths: Vec<String>,
}

/// How links are checked and how much load the crawl may generate
#[derive(Debug, Clone, Deserialize)]
pub struct CheckerConfig {
    /// Extra attempts after a transport failure
    #[serde(rename = "retry-count", default = "default_retry_count")]
    pub retry_count: u32,

    /// Pause before the first attempt of every link check (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Backoff after the first failed attempt, doubled for each further one
    #[serde(rename = "backoff-base-ms", default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Upper bound on HTTP requests in flight across the whole crawl
    #[serde(
        rename = "max-concurrent-requests",
        default = "default_max_concurrent_requests"
    )]
    pub max_concurrent_requests: u32,

    /// Upper bound on pages being processed at the same time
    #[serde(
        rename = "max-concurrent-pages",
        default = "default_max_concurrent_pages"
    )]
    pub max_concurrent_pages: u32,

    /// Redirect hops followed before giving up
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Case-insensitive substrings that are always skipped
    #[serde(rename = "ignore-patterns", default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Wall-clock limit for the whole crawl (seconds)
    #[serde(rename = "max-crawl-seconds", default)]
    pub max_crawl_seconds: Option<u64>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            request_delay_ms: default_request_delay_ms(),
            backoff_base_ms: default_backoff_base_ms(),
            max_concurrent_requests: default_max_concurrent_requests(),
            max_concurrent_pages: default_max_concurrent_pages(),
            max_redirects: default_max_redirects(),
            ignore_patterns: default_ignore_patterns(),
            max_crawl_seconds: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, url),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

fn default_max_depth() -> u32 {
    2
}

fn default_timeout_seconds() -> f64 {
    5.0
}

fn default_retry_count() -> u32 {
    2
}

fn default_request_delay_ms() -> u64 {
    200
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_max_concurrent_requests() -> u32 {
    20
}

fn default_max_concurrent_pages() -> u32 {
    4
}

fn default_max_redirects() -> u32 {
    10
}

fn default_ignore_patterns() -> Vec<String> {
    DEFAULT_IGNORE_PATTERNS
        .iter()
        .map(|p| p.to_string())
        .collect()
}

fn default_crawler_name() -> String {
    "LinkSweep".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
