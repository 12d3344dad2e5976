//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with a certificate-validating TLS stack
//! - Following redirects by hand so the redirect chain can be inspected
//! - Fetching page bodies for link extraction

use crate::config::UserAgentConfig;
use crate::crawler::scheduler::RequestLimiter;
use crate::FetchError;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// A response reached after following zero or more redirects
#[derive(Debug)]
pub struct FollowedResponse {
    /// The final response
    pub response: Response,
    /// URL that produced the final response
    pub final_url: Url,
    /// Every redirect target, in order; empty when there was no redirect
    pub redirect_chain: Vec<Url>,
}

impl FollowedResponse {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }
}

/// A page body ready for link extraction
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code of the final response
    pub status_code: u16,
    /// Final URL after redirects; relative links resolve against it
    pub final_url: Url,
    /// HTML body; empty when the response was not HTML
    pub body: String,
}

/// Builds the HTTP client shared by every request of a crawl
///
/// TLS goes through rustls with the bundled web PKI roots, and certificates
/// are always validated. Redirects are disabled on the client because
/// [`send_following_redirects`] tracks them itself.
///
/// # Example
///
/// ```no_run
/// use linksweep::config::UserAgentConfig;
/// use linksweep::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(5)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .use_rustls_tls()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends a GET request and follows redirects up to `max_redirects` hops
///
/// # Redirect Handling
///
/// | Condition | Result |
/// |-----------|--------|
/// | 301/302/303/307/308 with Location | follow |
/// | Other 3xx, or no usable Location | return the response as is |
/// | Target already seen in this chain | `FetchError::RedirectLoop` |
/// | More than `max_redirects` hops | `FetchError::RedirectLimit` |
pub async fn send_following_redirects(
    client: &Client,
    url: &Url,
    max_redirects: u32,
) -> Result<FollowedResponse, FetchError> {
    let mut current = url.clone();
    let mut seen = HashSet::from([url.as_str().to_string()]);
    let mut redirect_chain = Vec::new();

    loop {
        let response = client
            .get(current.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(current.as_str(), e))?;

        let Some(next) = redirect_target(&response, &current) else {
            return Ok(FollowedResponse {
                response,
                final_url: current,
                redirect_chain,
            });
        };

        if redirect_chain.len() as u32 >= max_redirects {
            return Err(FetchError::RedirectLimit {
                url: url.to_string(),
            });
        }

        if !seen.insert(next.as_str().to_string()) {
            return Err(FetchError::RedirectLoop {
                url: next.to_string(),
            });
        }

        tracing::trace!("Redirect {} -> {}", current, next);
        redirect_chain.push(next.clone());
        current = next;
    }
}

/// Resolves the Location of a followable redirect response
fn redirect_target(response: &Response, current: &Url) -> Option<Url> {
    let followable = matches!(
        response.status(),
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    );
    if !followable {
        return None;
    }

    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    current.join(location.trim()).ok()
}

/// Fetches a page's HTML for link extraction
///
/// Any transport error, timeout or cancellation yields `None` without retrying:
/// the crawl simply does not descend into pages it cannot load. Responses with
/// a non-HTML Content-Type come back with an empty body.
pub async fn fetch_page(
    client: &Client,
    url: &Url,
    max_redirects: u32,
    limiter: &RequestLimiter,
) -> Option<FetchedPage> {
    match limiter
        .run(fetch_page_once(client, url, max_redirects))
        .await
    {
        Ok(page) => Some(page),
        Err(e) => {
            tracing::debug!("Could not fetch page {}: {}", url, e);
            None
        }
    }
}

async fn fetch_page_once(
    client: &Client,
    url: &Url,
    max_redirects: u32,
) -> Result<FetchedPage, FetchError> {
    let followed = send_following_redirects(client, url, max_redirects).await?;
    let status_code = followed.status().as_u16();

    let is_html = followed
        .response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(true, |ct| ct.to_ascii_lowercase().contains("html"));

    if !is_html {
        tracing::debug!("Not descending into {}: not an HTML page", followed.final_url);
        return Ok(FetchedPage {
            status_code,
            final_url: followed.final_url,
            body: String::new(),
        });
    }

    let final_url = followed.final_url;
    let body = followed
        .response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

    Ok(FetchedPage {
        status_code,
        final_url,
        body,
    })
}
