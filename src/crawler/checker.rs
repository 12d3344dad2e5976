//! Link checker
//!
//! Checks a single link with a pre-request delay, retries with exponential
//! backoff on transport failures, and redirect tracking. Produces one
//! [`LinkResult`] per checked link.

use crate::config::Config;
use crate::crawler::classifier::{classify, redirects_to_login};
use crate::crawler::fetcher::{send_following_redirects, FollowedResponse};
use crate::crawler::scheduler::RequestLimiter;
use crate::state::{LinkResult, LinkType};
use crate::url::{is_same_host, ExclusionRules};
use crate::FetchError;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tokio_retry::RetryIf;
use url::Url;

/// How transport failures are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub retry_count: u32,

    /// Sleep after the first failure; doubled after each further failure
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn new(retry_count: u32, backoff_base: Duration) -> Self {
        Self {
            retry_count,
            backoff_base,
        }
    }

    /// Sleeps between attempts: `base`, `2 * base`, `4 * base`, ...
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let base = self.backoff_base;
        (0..self.retry_count).map(move |n| base.saturating_mul(2u32.saturating_pow(n)))
    }

    /// Total number of attempts
    pub fn max_attempts(&self) -> u32 {
        self.retry_count + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(1))
    }
}

/// Runs `action` until it succeeds or fails with a non-retryable error
///
/// Only [`FetchError::is_retryable`] failures are retried, so an HTTP response
/// of any status ends the loop on the first attempt.
pub async fn retry_transport<T, A, Fut>(policy: &RetryPolicy, action: A) -> Result<T, FetchError>
where
    A: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    RetryIf::spawn(policy.delays(), action, FetchError::is_retryable).await
}

/// Checks links found during one crawl
///
/// One checker is shared by every page task of a crawl. It holds the crawl
/// root, which decides [`LinkType`] for every result regardless of the page a
/// link was found on.
#[derive(Debug, Clone)]
pub struct LinkChecker {
    client: Client,
    root: Url,
    rules: ExclusionRules,
    retry: RetryPolicy,
    request_delay: Duration,
    max_redirects: u32,
    limiter: RequestLimiter,
}

impl LinkChecker {
    pub fn new(client: Client, root: Url, config: &Config, limiter: RequestLimiter) -> Self {
        Self {
            client,
            root,
            rules: ExclusionRules::new(
                config.crawl.exclude_paths.clone(),
                config.checker.ignore_patterns.clone(),
            ),
            retry: RetryPolicy::new(
                config.checker.retry_count,
                Duration::from_millis(config.checker.backoff_base_ms),
            ),
            request_delay: Duration::from_millis(config.checker.request_delay_ms),
            max_redirects: config.checker.max_redirects,
            limiter,
        }
    }

    /// Checks one link found on `source_page`
    ///
    /// Returns `None` when the link is skipped: it matches an exclude path or
    /// ignore pattern, its scheme is not http(s), or the crawl was cancelled
    /// before the check finished. Every other outcome, including transport
    /// failures, becomes a [`LinkResult`].
    pub async fn check_link(&self, source_page: &str, link: &Url) -> Option<LinkResult> {
        if self.rules.is_excluded(link.as_str()) {
            tracing::trace!("Skipping excluded link {}", link);
            return None;
        }

        if !matches!(link.scheme(), "http" | "https") {
            tracing::debug!("Skipping {} link {}", link.scheme(), link);
            return None;
        }

        if self.limiter.sleep(self.request_delay).await.is_err() {
            return None;
        }

        let outcome = tokio::select! {
            biased;
            _ = self.limiter.cancelled() => return None,
            outcome = retry_transport(&self.retry, || self.attempt(link)) => outcome,
        };

        let (status_code, status_text, redirected_to_login) = match outcome {
            Ok(followed) => {
                let status = followed.status();
                (
                    Some(status.as_u16()),
                    status.canonical_reason().unwrap_or_default().to_string(),
                    redirects_to_login(&followed.redirect_chain),
                )
            }
            Err(FetchError::Cancelled) => return None,
            Err(e) => (None, e.to_string(), false),
        };

        let classification = classify(status_code, redirected_to_login);
        let result = LinkResult {
            source_page: source_page.to_string(),
            link: link.to_string(),
            status_code,
            status_text,
            link_type: self.link_type(link),
            redirected_to_login,
            diagnosis: classification.diagnosis,
            fix_guide: classification.fix_guide.to_string(),
        };

        if result.is_broken() {
            tracing::warn!("✗ {} [{}] on {}", result.link, result.status_label(), source_page);
        } else {
            tracing::info!("✓ {} [{}]", result.link, result.status_label());
        }

        Some(result)
    }

    /// Internal when the link is on the crawl root's host
    pub fn link_type(&self, link: &Url) -> LinkType {
        if is_same_host(&self.root, link) {
            LinkType::Internal
        } else {
            LinkType::External
        }
    }

    async fn attempt(&self, link: &Url) -> Result<FollowedResponse, FetchError> {
        let result = self
            .limiter
            .run(send_following_redirects(&self.client, link, self.max_redirects))
            .await;

        if let Err(e) = &result {
            if e.is_retryable() {
                tracing::debug!("Attempt for {} failed: {}", link, e);
            }
        }

        result
    }
}
