use url::Url;

/// Extracts the domain from a URL
///
/// Returns the lowercase host, or `None` for URLs without one
/// (`mailto:`, `data:` and the like).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linksweep::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if `link` is served by the same host as `root`
///
/// Host and explicit port are compared, so `https://example.com:8443/` is not
/// internal to `https://example.com/`. Default ports are dropped by the URL
/// parser and never count as a difference. The scheme is ignored.
pub fn is_same_host(root: &Url, link: &Url) -> bool {
    match (extract_domain(root), extract_domain(link)) {
        (Some(root_host), Some(link_host)) => {
            root_host == link_host && root.port() == link.port()
        }
        _ => false,
    }
}
