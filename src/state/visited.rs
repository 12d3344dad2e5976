use crate::url::normalize_url;
use std::collections::HashSet;
use std::sync::Mutex;

/// Pages already claimed for traversal during one crawl
///
/// Each crawl owns a fresh set; nothing is shared between crawls. Keys are
/// normalized URLs, so `https://site/docs/` and `https://site/docs#top` are the
/// same page.
#[derive(Debug, Default)]
pub struct VisitedSet {
    pages: Mutex<HashSet<String>>,
}

impl VisitedSet {
    /// Creates an empty visited set
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a page for traversal
    ///
    /// Membership check and insertion happen under one lock, so exactly one
    /// caller gets `true` for a given page no matter how many race for it.
    pub fn insert(&self, url: &str) -> bool {
        let key = Self::key(url);
        let mut pages = self.pages.lock().unwrap_or_else(|e| e.into_inner());
        pages.insert(key)
    }

    /// Returns true if the page has already been claimed
    pub fn contains(&self, url: &str) -> bool {
        let key = Self::key(url);
        let pages = self.pages.lock().unwrap_or_else(|e| e.into_inner());
        pages.contains(&key)
    }

    fn key(url: &str) -> String {
        normalize_url(url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string())
    }
}
