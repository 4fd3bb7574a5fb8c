//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the listing and detail APIs and
//! test the full discover, fetch, aggregate and persist cycle end-to-end.

use futures::StreamExt;
use job_scout::config::{
    ApiConfig, CategoryEntry, Config, CrawlerConfig, OutputConfig, SinkKind, UserAgentConfig,
};
use job_scout::crawler::{
    build_http_client, crawl_all, discover, run_crawl_with_limiter, ApiClient, RequestLimiter,
    SearchCoordinator,
};
use job_scout::storage::{JsonSnapshotSink, SqliteStorage};
use job_scout::CrawlError;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PATH: &str = "/voyager/api/jobs/search";
const DETAIL_PATH: &str = "/voyager/api/jobs/jobPostings";

fn listing_body(ids: &[&str], total: usize) -> Value {
    let urns: Vec<String> = ids
        .iter()
        .map(|id| format!("urn:li:fsd_jobPostingCard:({},JOB_DETAILS)", id))
        .collect();

    json!({
        "metadata": {
            "jobCardPrefetchQueries": [{ "prefetchJobPostingCardUrns": urns }]
        },
        "paging": { "total": total, "start": 0, "count": ids.len() }
    })
}

fn detail_body(id: &str) -> Value {
    json!({
        "title": format!("Job {}", id),
        "description": { "text": format!("Description of {}", id) },
        "companyDetails": {
            "com.linkedin.voyager.deco.jobs.web.shared.WebJobPostingCompany": {
                "companyResolutionResult": { "name": "Acme" }
            }
        }
    })
}

async fn mount_listing(server: &MockServer, term: &str, start: usize, ids: &[&str], total: usize) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("keywords", term))
        .and(query_param("start", start.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(ids, total)))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("{}/{}", DETAIL_PATH, id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body(id)))
        .mount(server)
        .await;
}

fn category(name: &str, terms: &[&str]) -> CategoryEntry {
    CategoryEntry {
        name: name.to_string(),
        search_terms: terms.iter().map(|t| t.to_string()).collect(),
    }
}

fn sqlite_output(dir: &TempDir) -> OutputConfig {
    OutputConfig {
        sink: SinkKind::Sqlite,
        snapshot_path: String::new(),
        database_path: dir.path().join("jobs.db").display().to_string(),
    }
}

/// Creates a test configuration pointing at the mock server
fn create_test_config(
    server: &MockServer,
    output: OutputConfig,
    categories: Vec<CategoryEntry>,
) -> Config {
    Config {
        crawler: CrawlerConfig {
            requests_per_second: 1000,
            burst: 100,
            page_size: 100,
        },
        api: ApiConfig {
            listing_url: format!("{}{}", server.uri(), LISTING_PATH),
            detail_url: format!("{}{}", server.uri(), DETAIL_PATH),
            geo_id: "103644278".to_string(),
            token_env: None,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output,
        categories,
    }
}

fn api_client(config: &Config, limiter: Arc<RequestLimiter>) -> ApiClient {
    let client = build_http_client(&config.user_agent).unwrap();
    ApiClient::new(client, &config.api, limiter).unwrap()
}

/// Mounts the two overlapping "Data Science" searches: {A, B} and {B, C}
async fn mount_overlap(server: &MockServer) {
    mount_listing(server, "data scientist", 0, &["A", "B"], 2).await;
    mount_listing(server, "data science", 0, &["B", "C"], 2).await;
    for id in ["A", "B", "C"] {
        mount_detail(server, id).await;
    }
}

#[tokio::test]
async fn test_overlapping_searches_end_to_end() {
    let server = MockServer::start().await;
    mount_overlap(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        &server,
        sqlite_output(&dir),
        vec![category("Data Science", &["data scientist", "data science"])],
    );

    let report = run_crawl_with_limiter(&config, Arc::new(RequestLimiter::unlimited()))
        .await
        .unwrap();

    assert_eq!(report.total_fetched(), 4);
    assert_eq!(report.total_failed(), 0);
    assert_eq!(report.persisted.new_jobs, 3);
    assert_eq!(report.persisted.new_associations, 4);

    let storage = SqliteStorage::new(&dir.path().join("jobs.db")).unwrap();
    let counts = storage.counts().unwrap();
    assert_eq!(counts.jobs, 3);
    assert_eq!(counts.searches, 2);
    assert_eq!(counts.search_jobs, 4);
    assert_eq!(counts.job_categories, 3);

    for (term, id) in [
        ("data scientist", "A"),
        ("data scientist", "B"),
        ("data science", "B"),
        ("data science", "C"),
    ] {
        assert!(
            storage.get_association(term, id).unwrap().is_some(),
            "missing association {} / {}",
            term,
            id
        );
    }
    assert!(storage
        .get_association("data scientist", "C")
        .unwrap()
        .is_none());

    let job = storage.get_job("B").unwrap().unwrap();
    assert_eq!(job.title, "Job B");
    assert_eq!(job.company, "Acme");
    assert_eq!(job.description, "Description of B");
}

#[tokio::test]
async fn test_every_request_goes_through_limiter() {
    let server = MockServer::start().await;
    mount_overlap(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        &server,
        sqlite_output(&dir),
        vec![category("Data Science", &["data scientist", "data science"])],
    );

    let limiter = Arc::new(RequestLimiter::unlimited());
    let report = run_crawl_with_limiter(&config, Arc::clone(&limiter))
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 6);
    assert_eq!(report.requests, 6);
    assert_eq!(limiter.admitted(), 6);
}

#[tokio::test]
async fn test_rerun_keeps_first_seen() {
    let server = MockServer::start().await;
    mount_overlap(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        &server,
        sqlite_output(&dir),
        vec![category("Data Science", &["data scientist", "data science"])],
    );

    run_crawl_with_limiter(&config, Arc::new(RequestLimiter::unlimited()))
        .await
        .unwrap();
    let first = SqliteStorage::new(&dir.path().join("jobs.db"))
        .unwrap()
        .get_association("data science", "B")
        .unwrap()
        .unwrap();

    // Stored timestamps have second precision
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let report = run_crawl_with_limiter(&config, Arc::new(RequestLimiter::unlimited()))
        .await
        .unwrap();
    assert_eq!(report.persisted.new_jobs, 0);
    assert_eq!(report.persisted.new_associations, 0);

    let storage = SqliteStorage::new(&dir.path().join("jobs.db")).unwrap();
    let second = storage.get_association("data science", "B").unwrap().unwrap();

    assert_eq!(second.first_seen, first.first_seen);
    assert!(second.last_seen > first.last_seen);

    let counts = storage.counts().unwrap();
    assert_eq!(counts.jobs, 3);
    assert_eq!(counts.search_jobs, 4);
}

#[tokio::test]
async fn test_detail_failure_is_isolated() {
    let server = MockServer::start().await;
    mount_listing(&server, "security engineer", 0, &["1", "2", "3"], 3).await;
    mount_detail(&server, "1").await;
    mount_detail(&server, "3").await;
    Mock::given(method("GET"))
        .and(path(format!("{}/2", DETAIL_PATH)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        &server,
        sqlite_output(&dir),
        vec![category("Security", &["security engineer"])],
    );

    let report = run_crawl_with_limiter(&config, Arc::new(RequestLimiter::unlimited()))
        .await
        .unwrap();

    assert_eq!(report.searches[0].discovered, 3);
    assert_eq!(report.searches[0].fetched, 2);
    assert_eq!(report.searches[0].failed, 1);
    assert!(report.searches[0].discovery_error.is_none());

    let storage = SqliteStorage::new(&dir.path().join("jobs.db")).unwrap();
    assert_eq!(storage.counts().unwrap().jobs, 2);
    assert!(storage.get_job("2").unwrap().is_none());
}

#[tokio::test]
async fn test_undecodable_detail_is_dropped() {
    let server = MockServer::start().await;
    mount_listing(&server, "security analyst", 0, &["1", "2"], 2).await;
    mount_detail(&server, "1").await;
    Mock::given(method("GET"))
        .and(path(format!("{}/2", DETAIL_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        &server,
        sqlite_output(&dir),
        vec![category("Security", &["security analyst"])],
    );
    let api = api_client(&config, Arc::new(RequestLimiter::unlimited()));

    let outcome = SearchCoordinator::new(api.clone(), 100)
        .run("Security", "security analyst")
        .await;
    assert_eq!(outcome.group.jobs.len(), 1);
    assert_eq!(outcome.failed, 1);

    let err = api.job_posting("2").await.unwrap_err();
    assert!(matches!(err, CrawlError::Decode { .. }));
}

#[tokio::test]
async fn test_short_pages_continue_until_total() {
    let server = MockServer::start().await;
    mount_listing(&server, "data scientist", 0, &["A"], 3).await;
    mount_listing(&server, "data scientist", 1, &["B", "C"], 3).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, sqlite_output(&dir), vec![]);
    let limiter = Arc::new(RequestLimiter::unlimited());
    let api = api_client(&config, Arc::clone(&limiter));

    let ids: Vec<_> = discover(api, "data scientist".to_string(), 2)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(ids, vec!["A", "B", "C"]);
    assert_eq!(limiter.admitted(), 2);
}

#[tokio::test]
async fn test_empty_page_before_total_is_inconsistency() {
    let server = MockServer::start().await;
    mount_listing(&server, "data science", 0, &["A", "B"], 5).await;
    mount_listing(&server, "data science", 2, &[], 5).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, sqlite_output(&dir), vec![]);
    let api = api_client(&config, Arc::new(RequestLimiter::unlimited()));

    let items: Vec<_> = discover(api, "data science".to_string(), 2)
        .collect::<Vec<_>>()
        .await;

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_ref().unwrap(), "A");
    assert_eq!(items[1].as_ref().unwrap(), "B");
    match &items[2] {
        Err(CrawlError::UpstreamInconsistency {
            expected, received, ..
        }) => {
            assert_eq!(*expected, 5);
            assert_eq!(*received, 2);
        }
        other => panic!("expected UpstreamInconsistency, got {:?}", other),
    }
}

#[tokio::test]
async fn test_zero_total_stops_after_first_page() {
    let server = MockServer::start().await;
    mount_listing(&server, "quant", 0, &[], 0).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, sqlite_output(&dir), vec![]);
    let limiter = Arc::new(RequestLimiter::unlimited());
    let api = api_client(&config, Arc::clone(&limiter));

    let items: Vec<_> = discover(api, "quant".to_string(), 10).collect().await;

    assert!(items.is_empty());
    assert_eq!(limiter.admitted(), 1);
}

#[tokio::test]
async fn test_listing_failure_aborts_only_its_search() {
    let server = MockServer::start().await;
    mount_listing(&server, "security engineer", 0, &["1"], 1).await;
    mount_detail(&server, "1").await;
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("keywords", "security analyst"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("jobs.json");
    let config = create_test_config(
        &server,
        OutputConfig {
            sink: SinkKind::Json,
            snapshot_path: snapshot.display().to_string(),
            database_path: String::new(),
        },
        vec![
            category("Data Science", &["data scientist"]),
            category("Security", &["security engineer", "security analyst"]),
        ],
    );
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("keywords", "data scientist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(&[], 0)))
        .mount(&server)
        .await;

    let report = run_crawl_with_limiter(&config, Arc::new(RequestLimiter::unlimited()))
        .await
        .unwrap();
    assert_eq!(report.aborted_searches(), 1);
    assert_eq!(report.total_fetched(), 1);

    let tree = JsonSnapshotSink::load(&snapshot).unwrap();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].category, "Data Science");
    assert!(tree[0].searches.is_empty());
    assert_eq!(tree[1].searches.len(), 1);
    assert_eq!(tree[1].searches[0].search_term, "security engineer");
    assert_eq!(tree[1].searches[0].jobs[0].job_id, "1");
}

#[tokio::test]
async fn test_limiter_paces_requests() {
    let server = MockServer::start().await;
    mount_listing(&server, "data scientist", 0, &["A", "B", "C", "D"], 4).await;
    for id in ["A", "B", "C", "D"] {
        mount_detail(&server, id).await;
    }

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        &server,
        sqlite_output(&dir),
        vec![category("Data Science", &["data scientist"])],
    );
    // 10 per second, no burst: five requests need at least ~400ms
    let limiter = Arc::new(RequestLimiter::new(10, 1));
    let api = api_client(&config, Arc::clone(&limiter));

    let start = Instant::now();
    let results = crawl_all(&config, &api).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(350));
    assert_eq!(limiter.admitted(), 5);
    assert_eq!(results.categories[0].job_count(), 4);
}

#[tokio::test]
async fn test_access_token_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(&["9"], 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/9", DETAIL_PATH)))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body("9")))
        .mount(&server)
        .await;

    std::env::set_var("JOB_SCOUT_TEST_BEARER", "s3cret");

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(
        &server,
        sqlite_output(&dir),
        vec![category("Ops", &["sre"])],
    );
    config.api.token_env = Some("JOB_SCOUT_TEST_BEARER".to_string());

    let api = api_client(&config, Arc::new(RequestLimiter::unlimited()));
    let outcome = SearchCoordinator::new(api, 100).run("Ops", "sre").await;

    assert!(outcome.discovery_error.is_none());
    assert_eq!(outcome.group.jobs.len(), 1);
    assert_eq!(outcome.group.jobs[0].title, "Job 9");
}
