//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the listing, metadata and review
//! endpoints and drive full runs end-to-end against a temporary checkpoint.

use serde_json::{json, Value};
use std::path::Path;
use steam_harvest::config::{Config, CrawlerConfig, EndpointConfig, OutputConfig, UserAgentConfig};
use steam_harvest::crawler::{run_crawl, CrawlOptions};
use steam_harvest::storage::{CheckpointStore, CsvCheckpoint};
use steam_harvest::HarvestError;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing every endpoint at the mock server
fn create_test_config(base_url: &str, top_n: usize, csv_path: &Path) -> Config {
    Config {
        endpoints: EndpointConfig {
            listing_url: format!("{}/api.php?request=all", base_url),
            details_url: format!("{}/appdetails?appids={{appid}}", base_url),
            reviews_url: format!("{}/appreviews/{{appid}}?json=1", base_url),
        },
        crawler: CrawlerConfig {
            top_n,
            sleep_secs: 0.0, // No pacing in tests
            max_attempts: 3,
            listing_timeout_secs: 5,
            detail_timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        output: OutputConfig {
            csv_path: csv_path.display().to_string(),
        },
    }
}

fn options(resume: bool) -> CrawlOptions {
    CrawlOptions {
        resume,
        show_progress: false,
    }
}

fn details_body(appid: u64, name: &str) -> Value {
    json!({
        appid.to_string(): {
            "success": true,
            "data": {
                "name": name,
                "release_date": {"date": "21 Aug, 2012"},
                "price_overview": {"initial": 1499, "final": 749},
                "genres": [{"description": "Action"}, {"description": "Free to Play"}],
                "categories": [{"description": "Multi-player"}]
            }
        }
    })
}

async fn mount_listing(server: &MockServer, listing: Value) {
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing))
        .mount(server)
        .await;
}

async fn mount_details(server: &MockServer, appid: u64, body: Value) {
    Mock::given(method("GET"))
        .and(path("/appdetails"))
        .and(query_param("appids", appid.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_reviews(server: &MockServer, appid: u64, total: u64, positive: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/appreviews/{}", appid)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": 1,
            "query_summary": {"total_reviews": total, "total_positive": positive}
        })))
        .mount(server)
        .await;
}

/// Number of metadata requests the server saw for `appid`
async fn detail_requests(server: &MockServer, appid: u64) -> usize {
    let wanted = format!("appids={}", appid);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/appdetails" && r.url.query() == Some(wanted.as_str()))
        .count()
}

fn saved_ids(csv_path: &Path) -> Vec<u64> {
    CsvCheckpoint::new(csv_path)
        .load_records()
        .unwrap()
        .into_iter()
        .map(|r| r.appid)
        .collect()
}

#[tokio::test]
async fn test_top_n_selection_by_owner_estimate() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("data").join("games.csv");

    mount_listing(
        &mock_server,
        json!({
            "10": {"appid": 10, "owners": "1,000 .. 2,000"},
            "20": {"appid": 20, "owners": "5,000 .. 10,000"},
            "30": {"appid": 30, "owners": "1,000 .. 2,000"}
        }),
    )
    .await;
    for appid in [10, 20, 30] {
        mount_details(&mock_server, appid, details_body(appid, &format!("App {}", appid))).await;
        mount_reviews(&mock_server, appid, 100, 80).await;
    }

    let config = create_test_config(&mock_server.uri(), 2, &csv_path);
    let report = run_crawl(config, options(false)).await.unwrap();

    assert_eq!(report.ranked, 2);
    assert_eq!(report.rows_saved(), 2);
    // Ties keep listing order, so 10 beats 30
    assert_eq!(saved_ids(&csv_path), vec![20, 10]);
    assert_eq!(detail_requests(&mock_server, 30).await, 0);

    let records = CsvCheckpoint::new(&csv_path).load_records().unwrap();
    let first = &records[0];
    assert_eq!(first.name.as_deref(), Some("App 20"));
    assert_eq!(first.release_year, Some(2012));
    assert!((first.price_usd - 14.99).abs() < 1e-9);
    assert_eq!(first.total_reviews, Some(100));
    assert_eq!(first.positive_ratio, Some(0.8));
    assert_eq!(first.genres, vec!["Action", "Free to Play"]);
    assert!(first.is_multiplayer);

    let header = std::fs::read_to_string(&csv_path).unwrap();
    assert!(header.starts_with(
        "appid,name,release_year,price_usd,total_reviews,total_positive,positive_ratio,genres,is_multiplayer"
    ));
}

#[tokio::test]
async fn test_not_found_apps_are_skipped_without_retry() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("games.csv");

    mount_listing(
        &mock_server,
        json!({"1": {"owners": "0 .. 300"}, "2": {"owners": "0 .. 200"}, "3": {"owners": "0 .. 100"}}),
    )
    .await;
    mount_details(&mock_server, 1, details_body(1, "Listed")).await;
    mount_reviews(&mock_server, 1, 10, 5).await;
    mount_details(&mock_server, 2, json!({"2": {"success": false}})).await;
    Mock::given(method("GET"))
        .and(path("/appdetails"))
        .and(query_param("appids", "3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 10, &csv_path);
    let report = run_crawl(config, options(false)).await.unwrap();

    assert_eq!(report.progress.succeeded, 1);
    assert_eq!(report.progress.not_found, 2);
    assert_eq!(report.progress.dropped, 0);
    assert_eq!(detail_requests(&mock_server, 2).await, 1);
    assert_eq!(detail_requests(&mock_server, 3).await, 1);
    assert_eq!(saved_ids(&csv_path), vec![1]);
}

#[tokio::test]
async fn test_transient_failure_then_success() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("games.csv");

    mount_listing(&mock_server, json!({"7": {"owners": "0 .. 20,000"}})).await;

    // First two metadata calls fail, the third succeeds
    Mock::given(method("GET"))
        .and(path("/appdetails"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    mount_details(&mock_server, 7, details_body(7, "Flaky")).await;
    mount_reviews(&mock_server, 7, 3, 3).await;

    let config = create_test_config(&mock_server.uri(), 1, &csv_path);
    let report = run_crawl(config, options(false)).await.unwrap();

    assert_eq!(report.progress.succeeded, 1);
    assert_eq!(report.progress.dropped, 0);
    assert_eq!(detail_requests(&mock_server, 7).await, 3);
    assert_eq!(saved_ids(&csv_path), vec![7]);
}

#[tokio::test]
async fn test_exhausted_retries_drop_only_that_app() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("games.csv");

    mount_listing(
        &mock_server,
        json!({"1": {"owners": "0 .. 20"}, "2": {"owners": "0 .. 10"}}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/appdetails"))
        .and(query_param("appids", "1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_details(&mock_server, 2, details_body(2, "Healthy")).await;
    mount_reviews(&mock_server, 2, 1, 1).await;

    let config = create_test_config(&mock_server.uri(), 10, &csv_path);
    let report = run_crawl(config, options(false)).await.unwrap();

    assert_eq!(report.progress.dropped, 1);
    assert_eq!(report.progress.succeeded, 1);
    assert_eq!(detail_requests(&mock_server, 1).await, 3);
    assert_eq!(saved_ids(&csv_path), vec![2]);
}

#[tokio::test]
async fn test_review_failure_still_yields_record() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("games.csv");

    mount_listing(&mock_server, json!({"5": {"owners": "0 .. 20,000"}})).await;
    mount_details(&mock_server, 5, details_body(5, "Quiet")).await;
    Mock::given(method("GET"))
        .and(path("/appreviews/5"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 1, &csv_path);
    let report = run_crawl(config, options(false)).await.unwrap();

    assert_eq!(report.progress.succeeded, 1);

    let records = CsvCheckpoint::new(&csv_path).load_records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name.as_deref(), Some("Quiet"));
    assert_eq!(records[0].total_reviews, None);
    assert_eq!(records[0].positive_ratio, None);
}

#[tokio::test]
async fn test_resume_is_idempotent() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("games.csv");

    mount_listing(
        &mock_server,
        json!({"1": {"owners": "0 .. 30"}, "2": {"owners": "0 .. 20"}, "3": {"owners": "0 .. 10"}}),
    )
    .await;
    for appid in [1, 2, 3] {
        mount_details(&mock_server, appid, details_body(appid, "Resumable")).await;
        mount_reviews(&mock_server, appid, 2, 1).await;
    }

    // First run only gets the top two
    let first = create_test_config(&mock_server.uri(), 2, &csv_path);
    let report = run_crawl(first, options(true)).await.unwrap();
    assert_eq!(report.rows_saved(), 2);

    // Second run widens the population and only fetches the new one
    let second = create_test_config(&mock_server.uri(), 3, &csv_path);
    let report = run_crawl(second, options(true)).await.unwrap();
    assert_eq!(report.known, 2);
    assert_eq!(report.progress.attempted, 1);
    assert_eq!(report.rows_saved(), 3);
    assert_eq!(detail_requests(&mock_server, 1).await, 1);
    assert_eq!(detail_requests(&mock_server, 3).await, 1);

    // Third run has nothing to do and leaves the file alone
    let before = std::fs::read(&csv_path).unwrap();
    let third = create_test_config(&mock_server.uri(), 3, &csv_path);
    let report = run_crawl(third, options(true)).await.unwrap();
    assert_eq!(report.progress.attempted, 0);
    assert!(!report.save.written);
    assert_eq!(std::fs::read(&csv_path).unwrap(), before);

    assert_eq!(saved_ids(&csv_path), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_fresh_run_replaces_checkpoint() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("games.csv");

    mount_listing(&mock_server, json!({"2": {"owners": "0 .. 20"}})).await;
    mount_details(&mock_server, 2, details_body(2, "Fresh")).await;
    mount_reviews(&mock_server, 2, 0, 0).await;

    std::fs::write(
        &csv_path,
        "appid,name,release_year,price_usd,total_reviews,total_positive,positive_ratio,genres,is_multiplayer\n\
         99,Stale,2001,0.0,,,,,0\n",
    )
    .unwrap();

    let config = create_test_config(&mock_server.uri(), 1, &csv_path);
    let report = run_crawl(config, options(false)).await.unwrap();

    assert_eq!(report.known, 0);
    assert_eq!(saved_ids(&csv_path), vec![2]);
}

#[tokio::test]
async fn test_empty_run_creates_no_file() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("games.csv");

    mount_listing(&mock_server, json!({})).await;

    let config = create_test_config(&mock_server.uri(), 10, &csv_path);
    let report = run_crawl(config, options(false)).await.unwrap();

    assert_eq!(report.ranked, 0);
    assert_eq!(report.rows_saved(), 0);
    assert!(!CsvCheckpoint::new(&csv_path).exists());
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("games.csv");

    Mock::given(method("GET"))
        .and(path("/api.php"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 10, &csv_path);
    let result = run_crawl(config, options(false)).await;

    assert!(matches!(result, Err(HarvestError::Source(_))));
    assert!(!csv_path.exists());
    assert_eq!(detail_requests(&mock_server, 1).await, 0);
}

#[tokio::test]
async fn test_listing_that_is_not_a_mapping_is_fatal() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("games.csv");

    mount_listing(&mock_server, json!([1, 2, 3])).await;

    let config = create_test_config(&mock_server.uri(), 10, &csv_path);
    let result = run_crawl(config, options(false)).await;

    assert!(matches!(result, Err(HarvestError::Source(_))));
    assert!(!csv_path.exists());
}
