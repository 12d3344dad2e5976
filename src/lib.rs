//! LinkSweep: a website link-health crawler
//!
//! This crate walks the internal pages of a site starting from a root URL,
//! checks every hyperlink and resource reference it finds, and classifies
//! the failures into actionable diagnoses.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for LinkSweep operations
///
/// Only configuration and setup problems surface here. Failures of individual
/// links or pages are recorded as data in the crawl results.
#[derive(Debug, Error)]
pub enum LinkSweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Errors produced by a single HTTP exchange
///
/// These never escape a crawl. The checker turns them into a result with no
/// status code, and the page fetcher turns them into an empty page.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("{message}")]
    Transport { url: String, message: String },

    #[error("Too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("Redirect loop detected at {url}")]
    RedirectLoop { url: String },

    #[error("Crawl cancelled")]
    Cancelled,
}

impl FetchError {
    /// Builds a fetch error from a reqwest transport failure
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }

    /// Returns true for failures worth another attempt
    ///
    /// Redirect problems are deterministic and cancellation is final, so only
    /// timeouts and transport errors qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport { .. })
    }
}

/// Result type alias for LinkSweep operations
pub type Result<T> = std::result::Result<T, LinkSweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{start_crawl, start_crawl_with_cancellation, Diagnosis};
pub use output::{CrawlReport, CrawlSummary};
pub use state::{LinkResult, LinkType, VisitedSet};
pub use self::url::{extract_domain, normalize_url};
