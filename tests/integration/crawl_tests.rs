//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end over real HTTP.

use sitegraph::config::{Config, CrawlerConfig, UserAgentConfig};
use sitegraph::crawler::Coordinator;
use sitegraph::output::{assemble, to_json, Location};
use sitegraph::state::Classification;
use sitegraph::SiteError;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts
fn create_test_config() -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrent_fetches: 4,
            request_timeout_ms: 5_000,
            connect_timeout_ms: 2_000,
            progress_interval_ms: 100,
            crawl_deadline_secs: Some(30),
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: Some("https://example.com/contact".to_string()),
        },
    }
}

/// Mounts a HEAD and a GET for an HTML page at `route`
///
/// Each method is expected exactly once; the server verifies on drop.
async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// Mounts a HEAD for a non-HTML resource; a GET would be a failure
async fn mount_asset(server: &MockServer, route: &str, content_type: &str) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", content_type))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

fn find<'a>(locations: &'a [Location], url: &str) -> &'a Location {
    locations
        .iter()
        .find(|l| l.url == url)
        .unwrap_or_else(|| panic!("no location for {}", url))
}

#[tokio::test]
async fn test_full_crawl_fixture_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>Home</title></head><body>
        <img src="/logo.png">
        <a href="/about.html">About</a>
        <a href="http://elsewhere.invalid/">Elsewhere</a>
        <a href="/missing.html">Missing</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/about.html",
        r#"<html><head><title>About</title></head><body><a href="/">Home</a></body></html>"#,
    )
    .await;
    mount_asset(&mock_server, "/logo.png", "image/png").await;
    // /missing.html falls through to wiremock's default 404

    let coordinator = Coordinator::from_config(&create_test_config()).expect("coordinator");
    let graph = coordinator
        .crawl(&format!("{}/", base_url))
        .await
        .expect("Crawl failed");

    assert_eq!(graph.len(), 5);
    assert!(graph.items().iter().all(|i| i.state().is_terminal()));

    let remote = graph.find("http://elsewhere.invalid/").expect("remote item");
    assert_eq!(remote.classification(), Classification::Remote);

    let locations = assemble(&graph);
    assert_eq!(locations.len(), 2);

    let home = find(&locations, &format!("{}/", base_url));
    assert_eq!(home.title, "Home");
    assert_eq!(home.links, vec![format!("{}/about.html", base_url)]);
    assert_eq!(home.assets, vec![format!("{}/logo.png", base_url)]);
    assert_eq!(home.broken, vec![format!("{}/missing.html", base_url)]);
    assert_eq!(home.remote, vec!["http://elsewhere.invalid/".to_string()]);

    let about = find(&locations, &format!("{}/about.html", base_url));
    assert_eq!(about.title, "About");
    assert_eq!(about.links, vec![format!("{}/", base_url)]);
    assert!(about.assets.is_empty());
    assert!(about.broken.is_empty());
}

#[tokio::test]
async fn test_cycle_fetches_each_page_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/a.html",
        r#"<html><head><title>A</title></head><body><a href="/b.html">B</a></body></html>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/b.html",
        r#"<html><head><title>B</title></head><body><a href="/a.html">A</a></body></html>"#,
    )
    .await;

    let graph = sitegraph::crawl(&create_test_config(), &format!("{}/a.html", base_url))
        .await
        .expect("Crawl failed");

    assert_eq!(graph.len(), 2);
    let locations = assemble(&graph);
    let a = find(&locations, &format!("{}/a.html", base_url));
    let b = find(&locations, &format!("{}/b.html", base_url));
    assert_eq!(a.links, vec![b.url.clone()]);
    assert_eq!(b.links, vec![a.url.clone()]);
}

#[tokio::test]
async fn test_index_alias_is_not_refetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/docs/",
        r#"<html><head><title>Docs</title></head><body>
        <a href="/docs/index.html">Self</a>
        <a href="/docs/INDEX.HTM">Self again</a>
        </body></html>"#,
    )
    .await;
    Mock::given(method("HEAD"))
        .and(path("/docs/index.html"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let graph = sitegraph::crawl(&create_test_config(), &format!("{}/docs/", base_url))
        .await
        .expect("Crawl failed");

    assert_eq!(graph.len(), 1);
    let locations = assemble(&graph);
    assert_eq!(locations.len(), 1);
    // The page links to itself through its aliases
    assert_eq!(locations[0].links, vec![format!("{}/docs/", base_url)]);
}

#[tokio::test]
async fn test_content_type_handling() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>Mixed</title></head><body>
        <link href="/style.css">
        <script src="/app.js"></script>
        <a href="/opaque">Opaque</a>
        <a href="/gone.html">Gone</a>
        </body></html>"#,
    )
    .await;
    mount_asset(&mock_server, "/style.css", "text/css").await;
    mount_asset(&mock_server, "/app.js", "application/javascript").await;

    // No Content-Type header at all
    Mock::given(method("HEAD"))
        .and(path("/opaque"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/gone.html"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&mock_server)
        .await;

    let graph = sitegraph::crawl(&create_test_config(), &format!("{}/", base_url))
        .await
        .expect("Crawl failed");

    let locations = assemble(&graph);
    assert_eq!(locations.len(), 1);
    let home = &locations[0];
    assert_eq!(
        home.assets,
        vec![
            format!("{}/app.js", base_url),
            format!("{}/style.css", base_url)
        ]
    );
    assert_eq!(
        home.broken,
        vec![
            format!("{}/gone.html", base_url),
            format!("{}/opaque", base_url)
        ]
    );
    assert!(home.links.is_empty());
}

#[tokio::test]
async fn test_user_agent_header_is_sent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("HEAD"))
        .and(path("/"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact)",
        ))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/gif"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let graph = sitegraph::crawl(&create_test_config(), &format!("{}/", base_url))
        .await
        .expect("Crawl failed");

    assert_eq!(graph.seed_item().classification(), Classification::Asset);
    assert!(assemble(&graph).is_empty());
}

#[tokio::test]
async fn test_invalid_seed_makes_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = sitegraph::crawl(&create_test_config(), "not a url").await;
    assert!(matches!(result, Err(SiteError::InvalidSeedUrl { .. })));

    let result = sitegraph::crawl(&create_test_config(), "/relative/path").await;
    assert!(matches!(result, Err(SiteError::InvalidSeedUrl { .. })));
}

#[tokio::test]
async fn test_json_report_shape() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>Only</title></head><body>No links</body></html>"#,
    )
    .await;

    let graph = sitegraph::crawl(&create_test_config(), &format!("{}/", base_url))
        .await
        .expect("Crawl failed");

    let json = to_json(&assemble(&graph)).expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

    let entries = value.as_array().expect("array of locations");
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry["URL"], format!("{}/", base_url));
    assert_eq!(entry["Title"], "Only");
    for key in ["Links", "Assets", "Broken", "Remote"] {
        assert_eq!(entry[key], serde_json::json!([]), "{} should be []", key);
    }
}
