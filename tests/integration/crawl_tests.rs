//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use std::time::Duration;
use sumi_sieve::config::{
    Config, CrawlerConfig, IndexConfig, IndexTierConfig, SearchConfig, UserAgentConfig,
    MIN_WRITER_MEMORY,
};
use sumi_sieve::crawler::{crawl, Coordinator, Fetcher};
use sumi_sieve::state::PageState;
use sumi_sieve::storage::{open_store, FullTextIndex, IndexStore, IndexTier};
use sumi_sieve::url::{in_scope, normalize};
use sumi_sieve::{QueryEngine, SumiError};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `seed` within `prefix`
fn create_test_config(seed: &str, prefix: &str, index_path: &str, tier: IndexTierConfig) -> Config {
    Config {
        crawler: CrawlerConfig {
            seed_url: seed.to_string(),
            domain_prefix: prefix.to_string(),
            timeout_seconds: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
        },
        index: IndexConfig {
            path: index_path.to_string(),
            tier,
            writer_memory_bytes: MIN_WRITER_MEMORY,
        },
        search: SearchConfig::default(),
    }
}

fn create_test_fetcher(timeout: Duration) -> Fetcher {
    Fetcher::new(&UserAgentConfig::default(), timeout).expect("Failed to build HTTP client")
}

fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ))
        .insert_header("content-type", "text/html")
}

/// Mounts a GET mock that must be hit exactly `times` times
async fn mount_page(server: &MockServer, route: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_seed_returning_404_is_visited_but_not_stored() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    // The error body links onward; nothing from a failed fetch is followed
    mount_page(
        &server,
        "/",
        ResponseTemplate::new(404)
            .set_body_string(r#"<html><body>Not found <a href="/child">child</a></body></html>"#)
            .insert_header("content-type", "text/html"),
        1,
    )
    .await;
    mount_page(&server, "/child", html_page("Child", "Never reached"), 0).await;

    let temp = TempDir::new().unwrap();
    let mut store = FullTextIndex::open(&temp.path().join("index"), MIN_WRITER_MEMORY).unwrap();
    let seed = normalize(&format!("{}/", base_url)).unwrap();

    let stats = {
        let mut coordinator = Coordinator::new(
            seed.clone(),
            base_url.as_str(),
            create_test_fetcher(Duration::from_secs(5)),
            &mut store,
        );
        let stats = coordinator.run().await;
        assert_eq!(coordinator.state_of(&seed), Some(PageState::Visited));
        stats
    };

    assert_eq!(stats.pages_visited, 1);
    assert_eq!(stats.fetch_failures, 1);
    assert_eq!(stats.links_discovered, 0);
    assert_eq!(stats.pages_stored, 0);
    assert_eq!(store.count().unwrap(), 0);
}

#[tokio::test]
async fn test_two_page_cycle() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(&server, "/a", html_page("Page A", r#"Alpha <a href="/b">B</a>"#), 1).await;
    mount_page(&server, "/b", html_page("Page B", r#"Beta <a href="/a">A</a>"#), 1).await;

    let temp = TempDir::new().unwrap();
    let mut store = FullTextIndex::open(&temp.path().join("index"), MIN_WRITER_MEMORY).unwrap();
    let seed = normalize(&format!("{}/a", base_url)).unwrap();
    let back = normalize(&format!("{}/b", base_url)).unwrap();

    let mut coordinator = Coordinator::new(
        seed.clone(),
        base_url.as_str(),
        create_test_fetcher(Duration::from_secs(5)),
        &mut store,
    );
    let stats = coordinator.run().await;

    assert_eq!(coordinator.state_of(&seed), Some(PageState::Visited));
    assert_eq!(coordinator.state_of(&back), Some(PageState::Visited));
    assert_eq!(stats.pages_visited, 2);
    assert_eq!(stats.pages_stored, 2);
}

#[tokio::test]
async fn test_link_cycle_visits_each_page_once() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(&server, "/", html_page("Home", r#"Welcome <a href="/a">A</a>"#), 1).await;
    mount_page(&server, "/a", html_page("Page A", r#"Alpha <a href="/b">B</a>"#), 1).await;
    mount_page(
        &server,
        "/b",
        html_page("Page B", r#"Beta <a href="/a">back to A</a> <a href="/">home</a>"#),
        1,
    )
    .await;

    let temp = TempDir::new().unwrap();
    let mut store = FullTextIndex::open(&temp.path().join("index"), MIN_WRITER_MEMORY).unwrap();
    let seed = normalize(&format!("{}/", base_url)).unwrap();

    let mut coordinator = Coordinator::new(
        seed,
        base_url.as_str(),
        create_test_fetcher(Duration::from_secs(5)),
        &mut store,
    );
    let stats = coordinator.run().await;

    let mut visited: Vec<String> = coordinator.visited().map(|u| u.to_string()).collect();
    visited.sort();
    assert_eq!(
        visited,
        vec![
            format!("{}/", base_url),
            format!("{}/a", base_url),
            format!("{}/b", base_url),
        ]
    );
    assert_eq!(stats.pages_visited, 3);
    assert_eq!(stats.pages_visited as usize, visited.len());
    assert_eq!(stats.pages_stored, 3);
}

#[tokio::test]
async fn test_out_of_scope_links_are_not_fetched() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let prefix = format!("{}/docs/", base_url);

    mount_page(
        &server,
        "/docs/",
        html_page(
            "Docs",
            r#"Index of docs
            <a href="guide.html">Guide</a>
            <a href="/blog/">Blog</a>
            <a href="https://other.invalid/docs/">Elsewhere</a>
            <a href="mailto:someone@example.com">Mail</a>"#,
        ),
        1,
    )
    .await;
    mount_page(&server, "/docs/guide.html", html_page("Guide", "Guide text"), 1).await;
    mount_page(&server, "/blog/", html_page("Blog", "Not in scope"), 0).await;

    let temp = TempDir::new().unwrap();
    let mut store = FullTextIndex::open(&temp.path().join("index"), MIN_WRITER_MEMORY).unwrap();
    let seed = normalize(&prefix).unwrap();

    let mut coordinator = Coordinator::new(
        seed,
        prefix.as_str(),
        create_test_fetcher(Duration::from_secs(5)),
        &mut store,
    );
    let stats = coordinator.run().await;

    assert_eq!(stats.pages_visited, 2);
    assert!(coordinator.visited().all(|u| in_scope(u.as_str(), &prefix)));
}

#[tokio::test]
async fn test_fragments_do_not_cause_refetch() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        html_page(
            "Home",
            r##"Sections
            <a href="/page#intro">Intro</a>
            <a href="/page#usage">Usage</a>
            <a href="/page">Page</a>
            <a href="#top">Top</a>"##,
        ),
        1,
    )
    .await;
    mount_page(&server, "/page", html_page("Page", "Body text"), 1).await;

    let temp = TempDir::new().unwrap();
    let mut store = FullTextIndex::open(&temp.path().join("index"), MIN_WRITER_MEMORY).unwrap();
    let seed = normalize(&format!("{}/", base_url)).unwrap();

    let stats = Coordinator::new(
        seed,
        base_url.as_str(),
        create_test_fetcher(Duration::from_secs(5)),
        &mut store,
    )
    .run()
    .await;

    assert_eq!(stats.pages_visited, 2);
    assert!(store
        .get(&format!("{}/page", base_url))
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_stored_pages_are_retrievable() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        html_page(
            "Home",
            r#"<h1>Welcome</h1><p>Start here.</p><script>var hidden = 1;</script>
            <a href="/untitled">Untitled</a>"#,
        ),
        1,
    )
    .await;
    mount_page(
        &server,
        "/untitled",
        ResponseTemplate::new(200)
            .set_body_string("<html><body><p>No title on this one</p></body></html>")
            .insert_header("content-type", "text/html"),
        1,
    )
    .await;

    let temp = TempDir::new().unwrap();
    let mut store = FullTextIndex::open(&temp.path().join("index"), MIN_WRITER_MEMORY).unwrap();
    let seed = normalize(&format!("{}/", base_url)).unwrap();

    let stats = Coordinator::new(
        seed,
        base_url.as_str(),
        create_test_fetcher(Duration::from_secs(5)),
        &mut store,
    )
    .run()
    .await;
    assert_eq!(stats.pages_stored, 2);

    let home = store.get(&format!("{}/", base_url)).unwrap().unwrap();
    assert_eq!(home.title, "Home");
    assert!(home.content.contains("Welcome"));
    assert!(home.content.contains("Start here."));
    assert!(!home.content.contains("hidden"));

    let untitled_url = format!("{}/untitled", base_url);
    let untitled = store.get(&untitled_url).unwrap().unwrap();
    assert_eq!(untitled.title, untitled_url);
    assert_eq!(untitled.content, "No title on this one");
}

#[tokio::test]
async fn test_page_without_text_is_not_stored_but_links_are_followed() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        ResponseTemplate::new(200)
            .set_body_string(
                r#"<html><head><script>init();</script><style>p { color: red; }</style></head>
                <body><a href="/next"></a></body></html>"#,
            )
            .insert_header("content-type", "text/html"),
        1,
    )
    .await;
    mount_page(&server, "/next", html_page("Next", "Real words"), 1).await;

    let temp = TempDir::new().unwrap();
    let mut store = FullTextIndex::open(&temp.path().join("index"), MIN_WRITER_MEMORY).unwrap();
    let seed = normalize(&format!("{}/", base_url)).unwrap();

    let stats = Coordinator::new(
        seed,
        base_url.as_str(),
        create_test_fetcher(Duration::from_secs(5)),
        &mut store,
    )
    .run()
    .await;

    assert_eq!(stats.pages_visited, 2);
    assert_eq!(stats.extraction_failures, 1);
    assert_eq!(stats.pages_stored, 1);
    assert!(store.get(&format!("{}/", base_url)).unwrap().is_none());
    assert!(store.get(&format!("{}/next", base_url)).unwrap().is_some());
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        html_page("Home", r#"Home text <a href="/slow">Slow</a>"#),
        1,
    )
    .await;
    mount_page(
        &server,
        "/slow",
        html_page("Slow", "Too late").set_delay(Duration::from_secs(3)),
        1,
    )
    .await;

    let temp = TempDir::new().unwrap();
    let mut store = FullTextIndex::open(&temp.path().join("index"), MIN_WRITER_MEMORY).unwrap();
    let seed = normalize(&format!("{}/", base_url)).unwrap();

    let stats = Coordinator::new(
        seed,
        base_url.as_str(),
        create_test_fetcher(Duration::from_secs(1)),
        &mut store,
    )
    .run()
    .await;

    assert_eq!(stats.pages_visited, 2);
    assert_eq!(stats.fetch_failures, 1);
    assert_eq!(stats.pages_stored, 1);
}

#[tokio::test]
async fn test_crawl_replaces_previous_index() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    mount_page(&server, "/", html_page("Home", "Fresh content"), 2).await;

    let temp = TempDir::new().unwrap();
    let index_path = temp.path().join("index");
    let config = create_test_config(
        &format!("{}/", base_url),
        &base_url,
        &index_path.to_string_lossy(),
        IndexTierConfig::Indexed,
    );

    let first = crawl(&config).await.unwrap();
    let second = crawl(&config).await.unwrap();

    assert_eq!(first.documents_indexed, 1);
    assert_eq!(second.documents_indexed, 1);
    assert!(second.finished_at.is_some());
}

#[tokio::test]
async fn test_crawl_refuses_to_clear_foreign_directory() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    mount_page(&server, "/", html_page("Home", "Content"), 0).await;

    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    std::fs::create_dir_all(&project).unwrap();
    std::fs::write(project.join("notes.txt"), b"keep me").unwrap();

    let config = create_test_config(
        &format!("{}/", base_url),
        &base_url,
        &project.to_string_lossy(),
        IndexTierConfig::Indexed,
    );

    let result = crawl(&config).await;
    assert!(matches!(result, Err(SumiError::IndexOpen { .. })));
    assert_eq!(std::fs::read(project.join("notes.txt")).unwrap(), b"keep me");
}

#[tokio::test]
async fn test_crawl_into_substring_tier() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        html_page("Whoosh Guide", r#"Searching with eggs <a href="/mammals">More</a>"#),
        1,
    )
    .await;
    mount_page(&server, "/mammals", html_page("Mammals", "A mammal lays no egg"), 1).await;

    let temp = TempDir::new().unwrap();
    let index_path = temp.path().join("pages.db");
    let config = create_test_config(
        &format!("{}/", base_url),
        &base_url,
        &index_path.to_string_lossy(),
        IndexTierConfig::Substring,
    );

    let stats = crawl(&config).await.unwrap();
    assert_eq!(stats.pages_visited, 2);
    assert_eq!(stats.documents_indexed, 2);

    let store = open_store(&config.index).unwrap();
    assert_eq!(store.tier(), IndexTier::Substring);

    let results = QueryEngine::new(store.as_ref()).search("egg", true, 20);
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.score == 1.0));
    // Equal scores keep insertion order
    assert_eq!(results[0].url, format!("{}/", base_url));
}
