//! Scheduling primitives for a crawl
//!
//! This module handles:
//! - Global concurrency limiting of HTTP requests via a semaphore
//! - Cooperative cancellation of requests and sleeps
//! - The breadth-first frontier of pages waiting to be crawled

use crate::url::normalize_url;
use crate::FetchError;
use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Bounds the number of HTTP requests in flight across a whole crawl
///
/// Every page fetch and every link-check attempt runs through [`RequestLimiter::run`].
/// A permit is held for one request only, so backoff sleeps never block other
/// requests. Cancelling the token aborts waiting and running requests alike.
#[derive(Debug, Clone)]
pub struct RequestLimiter {
    /// Global semaphore for limiting concurrent requests
    semaphore: Arc<Semaphore>,

    cancel: CancellationToken,
}

impl RequestLimiter {
    /// Creates a limiter allowing `max_in_flight` concurrent requests
    pub fn new(max_in_flight: usize, cancel: CancellationToken) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_in_flight.max(1))),
            cancel,
        }
    }

    /// Runs one request under a permit
    ///
    /// Returns `FetchError::Cancelled` without running the request if the
    /// crawl is cancelled before a permit is available, and drops the request
    /// if cancellation arrives while it is in flight.
    pub async fn run<T, F>(&self, request: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        let _permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(FetchError::Cancelled),
            permit = self.semaphore.acquire() => permit.map_err(|_| FetchError::Cancelled)?,
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled),
            result = request => result,
        }
    }

    /// Sleeps unless the crawl is cancelled first
    pub async fn sleep(&self, duration: Duration) -> Result<(), FetchError> {
        if duration.is_zero() {
            return if self.is_cancelled() {
                Err(FetchError::Cancelled)
            } else {
                Ok(())
            };
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }

    /// Resolves once the crawl is cancelled
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// A page waiting to be crawled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedPage {
    /// The page URL
    pub url: Url,

    /// Distance from the start page (the start page is depth 0)
    pub depth: u32,
}

/// Breadth-first queue of pages to crawl
///
/// Each page is queued at most once, at the depth it was first discovered at.
/// That depth is the shortest one only while pages are taken level by level:
/// no page of depth `d + 1` may be crawled before every page of depth `d` has
/// finished. [`Frontier::next_depth`] lets the crawl loop enforce this.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<QueuedPage>,
    queued: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page; returns false if it was queued before
    pub fn push(&mut self, page: QueuedPage) -> bool {
        let key = normalize_url(page.url.as_str())
            .map(|u| u.to_string())
            .unwrap_or_else(|_| page.url.to_string());

        if !self.queued.insert(key) {
            return false;
        }

        self.queue.push_back(page);
        true
    }

    /// Takes the next page in breadth-first order
    pub fn pop(&mut self) -> Option<QueuedPage> {
        self.queue.pop_front()
    }

    /// Depth of the page [`Frontier::pop`] would return next
    pub fn next_depth(&self) -> Option<u32> {
        self.queue.front().map(|page| page.depth)
    }

    /// Pages still waiting
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
