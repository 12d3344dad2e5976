//! Crawler module for page traversal and link checking
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with manual redirect tracking
//! - Link checking with retry and backoff
//! - Diagnosis of failed checks
//! - HTML parsing and link extraction
//! - Request limiting, cancellation and overall crawl coordination

mod checker;
mod classifier;
mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use checker::{retry_transport, LinkChecker, RetryPolicy};
pub use classifier::{classify, redirects_to_login, Classification, Diagnosis, NO_ISSUES_GUIDE};
pub use coordinator::{run_crawl, run_crawl_with_cancellation, Coordinator};
pub use fetcher::{build_http_client, fetch_page, send_following_redirects, FetchedPage, FollowedResponse};
pub use parser::{extract_links, ExtractedLinks};
pub use scheduler::{Frontier, QueuedPage, RequestLimiter};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::LinkSweepError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Build the HTTP client
/// 3. Crawl internal pages breadth-first up to the depth limit
/// 4. Check every link found on those pages
/// 5. Return the results and their summary
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished; broken links are part of the report
/// * `Err(LinkSweepError)` - The configuration was invalid
pub async fn start_crawl(config: Config) -> Result<CrawlReport, LinkSweepError> {
    run_crawl(config).await
}

/// Runs a complete crawl that stops early when `cancel` is cancelled
///
/// A cancelled crawl still returns a report holding the results collected so
/// far, with `cancelled` set.
pub async fn start_crawl_with_cancellation(
    config: Config,
    cancel: CancellationToken,
) -> Result<CrawlReport, LinkSweepError> {
    run_crawl_with_cancellation(config, cancel).await
}
