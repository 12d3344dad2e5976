//! HTML parser for extracting link targets
//!
//! This module handles parsing HTML content to extract:
//! - Every link and resource reference to check
//! - The internal anchor targets to crawl next

use crate::url::is_same_host;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Selectors for references that get checked, with the attribute holding the target
const REFERENCE_SELECTORS: &[(&str, &str)] = &[
    ("a[href]", "href"),
    ("img[src]", "src"),
    ("script[src]", "src"),
    ("link[rel~=\"stylesheet\"][href]", "href"),
];

/// Targets extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedLinks {
    /// Every distinct reference on the page, in document order
    pub targets: Vec<Url>,

    /// Anchor targets on the crawl root's host, in document order
    pub internal_pages: Vec<Url>,
}

/// Extracts link targets from an HTML page
///
/// # Extraction Rules
///
/// **Include:**
/// - `<a href="...">`
/// - `<img src="...">` and `<script src="...">`
/// - `<link rel="stylesheet" href="...">`
///
/// **Exclude:**
/// - Empty references
/// - `javascript:` and `data:` references
/// - Fragment-only references (same page anchors)
///
/// Other schemes such as `mailto:` are kept; the link checker decides whether
/// to skip them. Fragments are removed, so `/a#x` and `/a#y` are one target.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The page's final URL, for resolving relative references
/// * `root` - The crawl root, for deciding which anchors are internal
///
/// # Example
///
/// ```
/// use linksweep::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/about">About</a><img src="https://cdn.example.net/logo.png">"#;
/// let root = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &root, &root);
/// assert_eq!(links.targets.len(), 2);
/// assert_eq!(links.internal_pages[0].as_str(), "https://example.com/about");
/// ```
pub fn extract_links(html: &str, base_url: &Url, root: &Url) -> ExtractedLinks {
    let document = Html::parse_document(html);

    let mut wanted = Vec::new();
    for (selector, attribute) in REFERENCE_SELECTORS {
        match Selector::parse(selector) {
            Ok(selector) => wanted.push((selector, *attribute)),
            Err(e) => tracing::error!("Invalid selector {}: {:?}", selector, e),
        }
    }

    let mut extracted = ExtractedLinks::default();
    let mut seen_targets = HashSet::new();
    let mut seen_pages = HashSet::new();

    // Walk the tree once so targets come out in document order across tag kinds
    for element in document.root_element().descendants().filter_map(scraper::ElementRef::wrap) {
        for (selector, attribute) in &wanted {
            if !selector.matches(&element) {
                continue;
            }

            let Some(value) = element.value().attr(attribute) else {
                continue;
            };
            let Some(target) = resolve_reference(value, base_url) else {
                continue;
            };

            let is_anchor = element.value().name() == "a";
            if is_anchor && is_crawlable(&target) && is_same_host(root, &target) {
                if seen_pages.insert(target.as_str().to_string()) {
                    extracted.internal_pages.push(target.clone());
                }
            }

            if seen_targets.insert(target.as_str().to_string()) {
                extracted.targets.push(target);
            }
        }
    }

    extracted
}

/// Resolves a reference against the page URL
///
/// Returns None if the reference should be ignored:
/// - Empty, `javascript:` or `data:` references
/// - Fragment-only references
/// - References that do not resolve to a URL
fn resolve_reference(reference: &str, base_url: &Url) -> Option<Url> {
    let reference = reference.trim();

    if reference.is_empty() || reference.starts_with('#') {
        return None;
    }

    let lowered = reference.to_ascii_lowercase();
    if lowered.starts_with("javascript:") || lowered.starts_with("data:") {
        return None;
    }

    let mut resolved = base_url.join(reference).ok()?;
    resolved.set_fragment(None);
    Some(resolved)
}

fn is_crawlable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
