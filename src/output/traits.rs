//! Output sink trait and report types
//!
//! This module defines the trait interface for result sinks and the report
//! a finished crawl hands to them.

use crate::output::stats::CrawlSummary;
use crate::state::LinkResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything one crawl produced
///
/// `results` is an unordered multiset keyed by (source page, link); the order
/// reflects completion, not discovery.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlReport {
    /// The configured start URL
    pub start_url: String,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,

    /// Pages whose HTML was fetched for link extraction
    pub pages_crawled: u64,

    /// The crawl stopped early; results hold whatever finished before that
    pub cancelled: bool,

    /// SHA-256 of the configuration file, when the crawl was configured from one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,

    pub summary: CrawlSummary,

    pub results: Vec<LinkResult>,
}

impl CrawlReport {
    /// Builds a report, deriving the summary from the results
    pub fn new(
        start_url: impl Into<String>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        pages_crawled: u64,
        cancelled: bool,
        results: Vec<LinkResult>,
    ) -> Self {
        Self {
            start_url: start_url.into(),
            started_at,
            finished_at,
            pages_crawled,
            cancelled,
            config_hash: None,
            summary: CrawlSummary::from_results(&results),
            results,
        }
    }

    /// Attaches the configuration hash
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Results that count as broken
    pub fn broken(&self) -> impl Iterator<Item = &LinkResult> {
        self.results.iter().filter(|r| r.is_broken())
    }

    /// Wall-clock duration of the crawl
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Trait for result sinks
///
/// A sink receives the finished report of a crawl and stores or renders it.
/// Where results end up is entirely the sink's business.
pub trait ResultSink {
    /// Writes one finished crawl report
    fn write_report(&mut self, report: &CrawlReport) -> OutputResult<()>;
}
