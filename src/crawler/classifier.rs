//! Link diagnosis
//!
//! Maps the outcome of a link check to a diagnosis and a remediation hint.

use serde::Serialize;
use std::fmt;
use url::Url;

/// Substrings in a redirect target that mark a login page
const LOGIN_INDICATORS: &[&str] = &["login", "signin", "auth"];

/// Fix guide used when there is nothing to diagnose
pub const NO_ISSUES_GUIDE: &str = "No issues detected or no fix available.";

/// Why a link check did not come back clean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnosis {
    /// HTTP 429
    RateLimited,
    /// HTTP 403
    Forbidden,
    /// HTTP 401
    Unauthorized,
    /// A redirect pointed at a login page
    LoginRedirect,
    /// HTTP 404
    NotFound,
    /// HTTP 5xx
    ServerError,
    /// No response at all
    RequestFailed,
}

impl Diagnosis {
    /// Explanation shown next to the broken link
    pub fn message(&self) -> &'static str {
        match self {
            Diagnosis::RateLimited => "Too many requests – possibly rate-limited or bot-blocked.",
            Diagnosis::Forbidden => "Access forbidden – the server refused the request.",
            Diagnosis::Unauthorized => "Unauthorized – login likely required.",
            Diagnosis::LoginRedirect => "Redirected to login page – protected resource.",
            Diagnosis::NotFound => "Not found – broken or moved link.",
            Diagnosis::ServerError => "Server error – issue on target site.",
            Diagnosis::RequestFailed => {
                "Request failed – possible DNS, timeout, or connection error."
            }
        }
    }

    /// Suggested remediation
    pub fn fix_guide(&self) -> &'static str {
        match self {
            Diagnosis::RateLimited => {
                "Slow down the scan or open the link manually; the site may block automated requests."
            }
            Diagnosis::Forbidden => {
                "Check the link manually in a browser; the site may be protected against bots."
            }
            Diagnosis::Unauthorized => "Log in to the site and check the link manually.",
            Diagnosis::LoginRedirect => "Log in first, then check the link manually.",
            Diagnosis::NotFound => "Remove the link or update it to the page's new location.",
            Diagnosis::ServerError => {
                "Retry later; if the error persists, report it to the site owner."
            }
            Diagnosis::RequestFailed => "Retry the scan later or check the link manually.",
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Diagnosis and fix guide for one check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub diagnosis: Option<Diagnosis>,
    pub fix_guide: &'static str,
}

/// Classifies the outcome of a link check
///
/// # Precedence
///
/// | Condition | Diagnosis |
/// |-----------|-----------|
/// | status 429 | RateLimited |
/// | status 403 | Forbidden |
/// | status 401 | Unauthorized |
/// | redirected to login | LoginRedirect |
/// | status 404 | NotFound |
/// | status >= 500 | ServerError |
/// | no status | RequestFailed |
/// | anything else | none |
///
/// The first matching row wins. Every input maps to exactly one outcome.
///
/// # Examples
///
/// ```
/// use linksweep::crawler::{classify, Diagnosis};
///
/// assert_eq!(classify(Some(404), false).diagnosis, Some(Diagnosis::NotFound));
/// assert_eq!(classify(Some(200), false).diagnosis, None);
/// ```
pub fn classify(status: Option<u16>, redirected_to_login: bool) -> Classification {
    let diagnosis = match status {
        Some(429) => Some(Diagnosis::RateLimited),
        Some(403) => Some(Diagnosis::Forbidden),
        Some(401) => Some(Diagnosis::Unauthorized),
        _ if redirected_to_login => Some(Diagnosis::LoginRedirect),
        Some(404) => Some(Diagnosis::NotFound),
        Some(code) if code >= 500 => Some(Diagnosis::ServerError),
        None => Some(Diagnosis::RequestFailed),
        Some(_) => None,
    };

    Classification {
        diagnosis,
        fix_guide: diagnosis.map_or(NO_ISSUES_GUIDE, |d| d.fix_guide()),
    }
}

/// Returns true if any URL in a redirect chain looks like a login page
///
/// The chain holds the redirect targets only, not the URL originally
/// requested, so a link that is itself a login page is not flagged.
pub fn redirects_to_login(chain: &[Url]) -> bool {
    chain.iter().any(|url| {
        let lowered = url.as_str().to_lowercase();
        LOGIN_INDICATORS.iter().any(|marker| lowered.contains(marker))
    })
}
