//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Validating the configuration and building the shared HTTP client
//! - Managing the breadth-first frontier of pages
//! - Running page tasks in parallel under the configured bound
//! - Fanning out link checks for every page
//! - Stopping on cancellation or when the crawl deadline passes

use crate::config::{validate, Config};
use crate::crawler::checker::LinkChecker;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::parser::extract_links;
use crate::crawler::scheduler::{Frontier, QueuedPage, RequestLimiter};
use crate::output::CrawlReport;
use crate::state::{LinkResult, VisitedSet};
use crate::url::{is_same_host, ExclusionRules};
use crate::{LinkSweepError, UrlError};
use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// State shared by every page task of one crawl
struct CrawlContext {
    root: Url,
    max_depth: u32,
    max_redirects: u32,
    rules: ExclusionRules,
    visited: VisitedSet,
    client: Client,
    checker: LinkChecker,
    limiter: RequestLimiter,
}

/// What one page contributed to the crawl
#[derive(Debug, Default)]
struct PageOutcome {
    /// The page's HTML was fetched
    fetched: bool,
    results: Vec<LinkResult>,
    children: Vec<QueuedPage>,
}

/// Main crawler coordinator structure
///
/// One coordinator runs exactly one crawl. Everything mutable, the visited
/// set included, lives inside it and is dropped with it.
pub struct Coordinator {
    context: Arc<CrawlContext>,
    start_url: String,
    cancel: CancellationToken,
    max_concurrent_pages: usize,
    max_crawl_time: Option<Duration>,
}

impl Coordinator {
    /// Creates a coordinator for one crawl
    ///
    /// The configuration is validated here, so a malformed start URL or an
    /// impossible setting fails before any request is sent. The crawl stops
    /// early when `cancel` is cancelled.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(LinkSweepError)` - Invalid configuration or HTTP client setup failure
    pub fn new(config: Config, cancel: CancellationToken) -> Result<Self, LinkSweepError> {
        validate(&config)?;

        let root = Url::parse(&config.crawl.start_url)
            .map_err(|e| UrlError::Parse(format!("{}: {}", config.crawl.start_url, e)))?;

        let timeout = Duration::from_secs_f64(config.crawl.timeout_seconds);
        let client = build_http_client(&config.user_agent, timeout)?;

        // Child token so the deadline never cancels the caller's token
        let cancel = cancel.child_token();
        let limiter = RequestLimiter::new(
            config.checker.max_concurrent_requests as usize,
            cancel.clone(),
        );
        let checker = LinkChecker::new(client.clone(), root.clone(), &config, limiter.clone());

        let context = CrawlContext {
            root,
            max_depth: config.crawl.max_depth,
            max_redirects: config.checker.max_redirects,
            rules: ExclusionRules::new(
                config.crawl.exclude_paths.clone(),
                config.checker.ignore_patterns.clone(),
            ),
            visited: VisitedSet::new(),
            client,
            checker,
            limiter,
        };

        Ok(Self {
            context: Arc::new(context),
            start_url: config.crawl.start_url,
            cancel,
            max_concurrent_pages: config.checker.max_concurrent_pages.max(1) as usize,
            max_crawl_time: config.checker.max_crawl_seconds.map(Duration::from_secs),
        })
    }

    /// Runs the crawl to completion or cancellation
    ///
    /// This is the core crawl loop that:
    /// 1. Takes pages from the frontier one depth level at a time
    /// 2. Runs up to `max_concurrent_pages` page tasks of that level at once
    /// 3. Collects each page's link results
    /// 4. Queues the page's internal anchors one level deeper
    ///
    /// Never fails: unreachable pages and links end up as data in the report.
    pub async fn run(self) -> CrawlReport {
        let started_at = Utc::now();
        tracing::info!(
            "Starting crawl of {} (max depth {})",
            self.start_url,
            self.context.max_depth
        );

        let deadline = self.max_crawl_time.map(|limit| {
            let cancel = self.cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                tracing::warn!("Crawl time limit of {:?} reached, stopping", limit);
                cancel.cancel();
            })
        });

        let mut frontier = Frontier::new();
        frontier.push(QueuedPage {
            url: self.context.root.clone(),
            depth: 0,
        });

        let mut tasks = JoinSet::new();
        let mut results = Vec::new();
        let mut pages_crawled: u64 = 0;
        let mut level = 0;

        loop {
            // A level starts only once the previous one has fully drained
            if tasks.is_empty() {
                if let Some(depth) = frontier.next_depth() {
                    level = depth;
                }
            }

            while tasks.len() < self.max_concurrent_pages
                && !self.cancel.is_cancelled()
                && frontier.next_depth() == Some(level)
            {
                let Some(page) = frontier.pop() else {
                    break;
                };
                let context = Arc::clone(&self.context);
                tasks.spawn(async move { context.crawl_page(page).await });
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };

            match joined {
                Ok(outcome) => {
                    if outcome.fetched {
                        pages_crawled += 1;
                    }
                    results.extend(outcome.results);
                    for child in outcome.children {
                        frontier.push(child);
                    }

                    if outcome.fetched && pages_crawled % 10 == 0 {
                        tracing::info!(
                            "Progress: {} pages crawled, {} links checked, {} pages queued",
                            pages_crawled,
                            results.len(),
                            frontier.pending()
                        );
                    }
                }
                Err(e) => tracing::error!("Page task failed: {}", e),
            }
        }

        if let Some(handle) = deadline {
            handle.abort();
        }

        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            tracing::warn!(
                "Crawl cancelled with {} pages still queued; returning partial results",
                frontier.pending()
            );
        }

        let report = CrawlReport::new(
            self.start_url,
            started_at,
            Utc::now(),
            pages_crawled,
            cancelled,
            results,
        );

        tracing::info!(
            "Crawl completed: {} pages, {} links checked, {} broken",
            report.pages_crawled,
            report.summary.total_links,
            report.summary.broken_links
        );

        report
    }
}

impl CrawlContext {
    /// Processes a single page
    ///
    /// This method:
    /// 1. Skips pages beyond the depth limit, excluded pages and visited pages
    /// 2. Claims the page in the visited set
    /// 3. Fetches the page; a failed fetch ends this branch
    /// 4. Extracts links and checks all of them concurrently
    /// 5. Returns internal anchors as children one level deeper
    async fn crawl_page(&self, page: QueuedPage) -> PageOutcome {
        let url = page.url.as_str();

        if page.depth > self.max_depth {
            tracing::trace!("Depth {} exceeds limit for {}", page.depth, url);
            return PageOutcome::default();
        }

        if self.rules.is_excluded(url) {
            tracing::debug!("Page {} is excluded", url);
            return PageOutcome::default();
        }

        if !self.visited.insert(url) {
            tracing::trace!("Page {} already visited", url);
            return PageOutcome::default();
        }

        tracing::debug!("Crawling {} at depth {}", url, page.depth);

        let Some(fetched) =
            fetch_page(&self.client, &page.url, self.max_redirects, &self.limiter).await
        else {
            return PageOutcome::default();
        };

        // A redirect onto an already visited page must not process it twice
        if fetched.final_url != page.url && !self.visited.insert(fetched.final_url.as_str()) {
            tracing::debug!("{} redirects to visited page {}", url, fetched.final_url);
            return PageOutcome {
                fetched: true,
                ..PageOutcome::default()
            };
        }

        if !is_same_host(&self.root, &fetched.final_url) {
            tracing::debug!("{} left the site for {}", url, fetched.final_url);
            return PageOutcome {
                fetched: true,
                ..PageOutcome::default()
            };
        }

        let extracted = extract_links(&fetched.body, &fetched.final_url, &self.root);
        tracing::debug!(
            "Found {} targets on {} ({} internal pages)",
            extracted.targets.len(),
            url,
            extracted.internal_pages.len()
        );

        let checks = extracted
            .targets
            .iter()
            .map(|target| self.checker.check_link(url, target));
        let results: Vec<LinkResult> = join_all(checks).await.into_iter().flatten().collect();

        let children = if page.depth < self.max_depth {
            extracted
                .internal_pages
                .into_iter()
                .filter(|child| !self.rules.is_excluded(child.as_str()))
                .filter(|child| !self.visited.contains(child.as_str()))
                .map(|child| QueuedPage {
                    url: child,
                    depth: page.depth + 1,
                })
                .collect()
        } else {
            Vec::new()
        };

        PageOutcome {
            fetched: true,
            results,
            children,
        }
    }
}

/// Runs a complete crawl with its own cancellation token
pub async fn run_crawl(config: Config) -> Result<CrawlReport, LinkSweepError> {
    run_crawl_with_cancellation(config, CancellationToken::new()).await
}

/// Runs a complete crawl that stops early when `cancel` is cancelled
pub async fn run_crawl_with_cancellation(
    config: Config,
    cancel: CancellationToken,
) -> Result<CrawlReport, LinkSweepError> {
    let coordinator = Coordinator::new(config, cancel)?;
    Ok(coordinator.run().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LinkType;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(start_url: &str, max_depth: u32) -> Config {
        let mut config = Config::for_url(start_url);
        config.crawl.max_depth = max_depth;
        config.crawl.timeout_seconds = 2.0;
        config.checker.request_delay_ms = 0;
        config.checker.backoff_base_ms = 1;
        config.checker.retry_count = 0;
        config
    }

    async fn mount_html(server: &MockServer, at: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
            .mount(server)
            .await;
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let result = Coordinator::new(Config::for_url("not a url"), CancellationToken::new());
        assert!(matches!(result, Err(LinkSweepError::Config(_))));

        let mut config = Config::for_url("https://example.com/");
        config.crawl.timeout_seconds = 0.0;
        assert!(Coordinator::new(config, CancellationToken::new()).is_err());
    }

    #[tokio::test]
    async fn test_crawls_breadth_first_to_depth() {
        let server = MockServer::start().await;
        mount_html(&server, "/", r#"<a href="/one">One</a>"#).await;
        mount_html(&server, "/one", r#"<a href="/two">Two</a>"#).await;
        mount_html(&server, "/two", r#"<a href="/three">Three</a>"#).await;
        mount_html(&server, "/three", "<p>end</p>").await;

        let report = run_crawl(test_config(&format!("{}/", server.uri()), 1))
            .await
            .unwrap();

        // Root (depth 0) and /one (depth 1) are crawled; /two is only checked
        assert_eq!(report.pages_crawled, 2);
        let mut links: Vec<&str> = report.results.iter().map(|r| r.link.as_str()).collect();
        links.sort();
        assert_eq!(links.len(), 2);
        assert!(links[0].ends_with("/one"));
        assert!(links[1].ends_with("/two"));
        assert!(report.results.iter().all(|r| r.link_type == LinkType::Internal));
        assert!(!report.cancelled);
    }

    #[tokio::test]
    async fn test_slow_parent_keeps_shortest_depth() {
        let server = MockServer::start().await;
        mount_html(&server, "/", r#"<a href="/p1">P1</a><a href="/p2">P2</a>"#).await;
        Mock::given(method("GET"))
            .and(path("/p1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"<a href="/x">X</a>"#, "text/html")
                    .set_delay(Duration::from_millis(1500)),
            )
            .mount(&server)
            .await;
        mount_html(&server, "/p2", r#"<a href="/q">Q</a>"#).await;
        mount_html(&server, "/q", r#"<a href="/x">X</a>"#).await;
        mount_html(&server, "/x", r#"<a href="/y">Y</a>"#).await;
        mount_html(&server, "/y", r#"<a href="/z">Z</a>"#).await;
        mount_html(&server, "/z", "<p>end</p>").await;

        // /x is depth 2 through /p1 even though /q reaches it first
        let mut config = test_config(&format!("{}/", server.uri()), 3);
        config.crawl.timeout_seconds = 5.0;
        config.checker.max_concurrent_pages = 4;
        let report = run_crawl(config).await.unwrap();

        // /, /p1, /p2, /q, /x, /y
        assert_eq!(report.pages_crawled, 6);
        let z_checks = report
            .results
            .iter()
            .filter(|r| r.link.ends_with("/z"))
            .count();
        assert_eq!(z_checks, 1);
    }

    #[tokio::test]
    async fn test_redirect_onto_visited_page_is_not_reprocessed() {
        let server = MockServer::start().await;
        mount_html(&server, "/", r#"<a href="/old">Old</a><a href="/new">New</a>"#).await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
            .mount(&server)
            .await;
        mount_html(&server, "/new", r#"<a href="/leaf">Leaf</a>"#).await;
        mount_html(&server, "/leaf", "<p>leaf</p>").await;

        let mut config = test_config(&format!("{}/", server.uri()), 1);
        config.checker.max_concurrent_pages = 1;
        let report = run_crawl(config).await.unwrap();

        let leaf_checks = report
            .results
            .iter()
            .filter(|r| r.link.ends_with("/leaf"))
            .count();
        assert_eq!(leaf_checks, 1);
    }

    #[tokio::test]
    async fn test_pre_cancelled_crawl_returns_empty_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = run_crawl_with_cancellation(test_config(&format!("{}/", server.uri()), 2), cancel)
            .await
            .unwrap();
        assert!(report.cancelled);
        assert!(report.results.is_empty());
        assert_eq!(report.pages_crawled, 0);
    }

    #[tokio::test]
    async fn test_deadline_cancels_slow_crawl() {
        let server = MockServer::start().await;
        mount_html(&server, "/", r#"<a href="/slow">Slow</a>"#).await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
            .mount(&server)
            .await;

        let mut config = test_config(&format!("{}/", server.uri()), 0);
        config.crawl.timeout_seconds = 60.0;
        config.checker.max_crawl_seconds = Some(1);

        let started = std::time::Instant::now();
        let caller = CancellationToken::new();
        let report = run_crawl_with_cancellation(config, caller.clone()).await.unwrap();

        assert!(report.cancelled);
        assert!(report.results.is_empty());
        assert_eq!(report.pages_crawled, 1);
        assert!(started.elapsed() < Duration::from_secs(20));
        assert!(!caller.is_cancelled());
    }
}
