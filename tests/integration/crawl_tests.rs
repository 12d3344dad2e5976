//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use linksweep::config::Config;
use linksweep::crawler::Diagnosis;
use linksweep::{start_crawl, LinkSweepError, LinkType};
use wiremock::matchers::{method, path};
use std::time::Duration;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration rooted at the mock server
fn create_test_config(server: &MockServer, max_depth: u32) -> Config {
    let mut config = Config::for_url(format!("{}/", server.uri()));
    config.crawl.max_depth = max_depth;
    config.crawl.timeout_seconds = 2.0;
    config.checker.request_delay_ms = 0; // No throttling in tests
    config.checker.backoff_base_ms = 1;
    config
}

/// Mounts an HTML page at the given path
async fn mount_page(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(format!("<html><body>{}</body></html>", body), "text/html"),
        )
        .mount(server)
        .await;
}

/// Counts GET requests the server received for a path
async fn hits(server: &MockServer, at: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == at)
        .count()
}

/// Returns a local port with nothing listening on it
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    listener.local_addr().expect("No local address").port()
}

#[tokio::test]
async fn test_end_to_end_internal_dead_external_and_mailto() {
    let mock_server = MockServer::start().await;
    let dead_link = format!("http://localhost:{}/", closed_port());

    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<a href="/about">About</a>
               <a href="{}">Dead</a>
               <a href="mailto:x@y.com">Mail</a>"#,
            dead_link
        ),
    )
    .await;
    mount_page(&mock_server, "/about", "About us").await;

    let report = start_crawl(create_test_config(&mock_server, 0))
        .await
        .expect("Crawl failed");

    assert_eq!(report.results.len(), 2, "results: {:?}", report.results);
    assert_eq!(report.summary.total_links, 2);
    assert_eq!(report.summary.broken_links, 1);

    let about = report
        .results
        .iter()
        .find(|r| r.link.ends_with("/about"))
        .expect("Missing /about result");
    assert_eq!(about.link_type, LinkType::Internal);
    assert_eq!(about.status_code, Some(200));
    assert_eq!(about.diagnosis, None);

    let dead = report
        .results
        .iter()
        .find(|r| r.link == dead_link)
        .expect("Missing dead link result");
    assert_eq!(dead.link_type, LinkType::External);
    assert_eq!(dead.status_code, None);
    assert_eq!(dead.diagnosis, Some(Diagnosis::RequestFailed));

    assert!(report.results.iter().all(|r| !r.link.starts_with("mailto:")));
    assert_eq!(report.pages_crawled, 1);
    assert!(!report.cancelled);
}

#[tokio::test]
async fn test_depth_zero_does_not_descend() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", r#"<a href="/child">Child</a>"#).await;
    mount_page(&mock_server, "/child", r#"<a href="/grandchild">Grandchild</a>"#).await;
    mount_page(&mock_server, "/grandchild", "Leaf").await;

    let report = start_crawl(create_test_config(&mock_server, 0))
        .await
        .expect("Crawl failed");

    assert_eq!(report.results.len(), 1);
    assert!(report.results[0].link.ends_with("/child"));

    // /child is checked once and never fetched for extraction
    assert_eq!(hits(&mock_server, "/child").await, 1);
    assert_eq!(hits(&mock_server, "/grandchild").await, 0);
}

#[tokio::test]
async fn test_shared_page_is_traversed_once() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(&mock_server, "/a", r#"<a href="/shared">Shared</a>"#).await;
    mount_page(&mock_server, "/b", r##"<a href="/shared#top">Shared</a>"##).await;
    mount_page(&mock_server, "/shared", r#"<a href="/leaf">Leaf</a>"#).await;
    mount_page(&mock_server, "/leaf", "Leaf").await;

    let report = start_crawl(create_test_config(&mock_server, 3))
        .await
        .expect("Crawl failed");

    // Checked from /a and from /b, plus a single fetch for traversal
    assert_eq!(hits(&mock_server, "/shared").await, 3);

    let leaf_results = report
        .results
        .iter()
        .filter(|r| r.link.ends_with("/leaf"))
        .count();
    assert_eq!(leaf_results, 1);

    // /, /a, /b, /shared, /leaf
    assert_eq!(report.pages_crawled, 5);
}

#[tokio::test]
async fn test_shared_child_of_slow_and_fast_pages_is_crawled_to_depth() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", r#"<a href="/slow">Slow</a><a href="/fast">Fast</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    r#"<html><body><a href="/shared">Shared</a></body></html>"#,
                    "text/html",
                )
                .set_delay(Duration::from_millis(1000)),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/fast", r#"<a href="/hub">Hub</a>"#).await;
    mount_page(&mock_server, "/hub", r#"<a href="/shared">Shared</a>"#).await;
    mount_page(&mock_server, "/shared", r#"<a href="/deep">Deep</a>"#).await;
    mount_page(&mock_server, "/deep", r#"<a href="/leaf">Leaf</a>"#).await;
    mount_page(&mock_server, "/leaf", "Leaf").await;

    let mut config = create_test_config(&mock_server, 3);
    config.crawl.timeout_seconds = 5.0;
    config.checker.max_concurrent_pages = 4;

    let report = start_crawl(config).await.expect("Crawl failed");

    // /shared sits at depth 2 below /slow, so /deep (depth 3) is crawled too
    // /, /slow, /fast, /hub, /shared, /deep
    assert_eq!(report.pages_crawled, 6);
    assert_eq!(hits(&mock_server, "/deep").await, 2);

    let leaf_checks = report
        .results
        .iter()
        .filter(|r| r.link.ends_with("/leaf"))
        .count();
    assert_eq!(leaf_checks, 1);
    assert_eq!(report.summary.broken_links, 0);
}

#[tokio::test]
async fn test_cyclic_links_terminate() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", r#"<a href="/ping">Ping</a>"#).await;
    mount_page(&mock_server, "/ping", r#"<a href="/pong">Pong</a>"#).await;
    mount_page(&mock_server, "/pong", r#"<a href="/ping">Ping</a><a href="/">Home</a>"#).await;

    let report = start_crawl(create_test_config(&mock_server, 10))
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_crawled, 3);
    assert_eq!(report.summary.total_links, 4);
    assert_eq!(report.summary.broken_links, 0);
}

#[tokio::test]
async fn test_link_type_is_relative_to_root() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    mount_page(&other_server, "/external", "Elsewhere").await;

    mount_page(&mock_server, "/", r#"<a href="/docs">Docs</a>"#).await;
    mount_page(
        &mock_server,
        "/docs",
        &format!(
            r#"<a href="/">Home</a><a href="{}/external">Elsewhere</a>"#,
            other_server.uri()
        ),
    )
    .await;

    let report = start_crawl(create_test_config(&mock_server, 1))
        .await
        .expect("Crawl failed");

    let root = format!("{}/", mock_server.uri());
    for result in &report.results {
        let expected = if result.link.starts_with(&root) {
            LinkType::Internal
        } else {
            LinkType::External
        };
        assert_eq!(result.link_type, expected, "{}", result.link);
    }

    let external = report
        .results
        .iter()
        .find(|r| r.link.ends_with("/external"))
        .expect("Missing external result");
    assert_eq!(external.link_type, LinkType::External);
    assert_eq!(external.status_code, Some(200));

    // External pages are checked but never crawled
    assert_eq!(hits(&other_server, "/external").await, 1);
}

#[tokio::test]
async fn test_excluded_paths_are_never_requested() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/private/area">Private</a><a href="/public">Public</a><a href="tel:+123">Call</a>"#,
    )
    .await;
    mount_page(&mock_server, "/public", "Public").await;

    Mock::given(method("GET"))
        .and(path("/private/area"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server, 2);
    config.crawl.exclude_paths = vec!["/private".to_string()];

    let report = start_crawl(config).await.expect("Crawl failed");

    assert_eq!(report.results.len(), 1);
    assert!(report.results[0].link.ends_with("/public"));
}

#[tokio::test]
async fn test_broken_links_are_diagnosed() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/missing">Missing</a>
           <img src="/error.png">
           <a href="/members">Members</a>
           <a href="/busy">Busy</a>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/error.png"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1) // HTTP errors are not retried
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/members"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/signin"))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/signin", "Sign in").await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let report = start_crawl(create_test_config(&mock_server, 0))
        .await
        .expect("Crawl failed");

    let diagnosis_of = |suffix: &str| {
        report
            .results
            .iter()
            .find(|r| r.link.ends_with(suffix))
            .and_then(|r| r.diagnosis)
    };

    assert_eq!(diagnosis_of("/missing"), Some(Diagnosis::NotFound));
    assert_eq!(diagnosis_of("/error.png"), Some(Diagnosis::ServerError));
    assert_eq!(diagnosis_of("/members"), Some(Diagnosis::LoginRedirect));
    assert_eq!(diagnosis_of("/busy"), Some(Diagnosis::RateLimited));

    // The login redirect ends in a 200, so it is flagged but not broken
    assert_eq!(report.summary.total_links, 4);
    assert_eq!(report.summary.broken_links, 3);
    assert_eq!(report.summary.by_diagnosis.len(), 4);
}

#[tokio::test]
async fn test_unreachable_start_page_yields_empty_report() {
    let config = {
        let mut config = Config::for_url(format!("http://127.0.0.1:{}/", closed_port()));
        config.crawl.timeout_seconds = 2.0;
        config
    };

    let report = start_crawl(config).await.expect("Crawl failed");

    assert!(report.results.is_empty());
    assert_eq!(report.pages_crawled, 0);
    assert_eq!(report.summary.total_links, 0);
}

#[tokio::test]
async fn test_malformed_root_fails_fast() {
    for start_url in ["not a url", "ftp://example.com/", "https://"] {
        let result = start_crawl(Config::for_url(start_url)).await;
        assert!(
            matches!(result, Err(LinkSweepError::Config(_))),
            "{} should be rejected",
            start_url
        );
    }

    let mut config = Config::for_url("https://example.com/");
    config.crawl.timeout_seconds = -1.0;
    assert!(start_crawl(config).await.is_err());
}
