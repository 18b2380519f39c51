//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test the real
//! HTTP transport and the full crawl-then-combine cycle end-to-end.

use rent_harvest::config::{Config, HttpConfig};
use rent_harvest::crawler::{Coordinator, FetchError, HttpTransport, StopReason, Transport};
use rent_harvest::output::{AssumeYes, Consolidator};
use rent_harvest::PropertyRecord;
use std::path::Path;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration pointed at the mock server
fn create_test_config(base_url: &str, output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.site.listing_url = format!("{}/rent?page=", base_url);
    config.site.origin = base_url.to_string();
    config.crawler.batch_size = 1;
    config.crawler.max_pages = 10;
    config.crawler.request_delay_ms = 0;
    config.http.timeout_secs = 5;
    config.http.retry_backoff_ms = 0;
    config.output.directory = output_dir.to_string_lossy().into_owned();
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn detail_page(title: &str, price: &str, features: &[&str]) -> ResponseTemplate {
    let amenities: String = features.iter().map(|f| format!("<a>{}</a>", f)).collect();
    html(&format!(
        r#"<div class="col-md-8"><h1>{}</h1></div>
           <div class="content-block position-relative">
             <p><i class="fa-solid fa-location-dot"></i> Lekki, Lagos</p>
           </div>
           <div class="pricing"><h2><strong>{}</strong></h2></div>
           <div class="amen-grid">{}</div>"#,
        title, price, amenities
    ))
}

async fn mount_listing(server: &MockServer, page: &str, hrefs: &[&str]) {
    let cards: String = hrefs
        .iter()
        .map(|href| format!(r#"<div class="property-listing"><a href="{}">card</a></div>"#, href))
        .collect();

    Mock::given(method("GET"))
        .and(path("/rent"))
        .and(query_param("page", page))
        .respond_with(html(&cards))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_http_transport_returns_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html("hello"))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(&HttpConfig::default()).unwrap();
    let body = transport
        .get(&format!("{}/ok", mock_server.uri()))
        .await
        .unwrap();

    assert!(body.contains("hello"));
}

#[tokio::test]
async fn test_http_transport_sends_user_agent() {
    let mock_server = MockServer::start().await;
    let config = HttpConfig {
        user_agent: "RentHarvestTest/1.0".to_string(),
        ..HttpConfig::default()
    };

    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header("user-agent", "RentHarvestTest/1.0"))
        .respond_with(html("matched"))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(&config).unwrap();
    let body = transport
        .get(&format!("{}/ua", mock_server.uri()))
        .await
        .unwrap();

    assert!(body.contains("matched"));
}

#[tokio::test]
async fn test_http_transport_non_success_is_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(&HttpConfig::default()).unwrap();
    let result = transport
        .get(&format!("{}/down", mock_server.uri()))
        .await;

    assert!(matches!(result, Err(FetchError::Status { status: 503, .. })));
}

#[tokio::test]
async fn test_http_transport_follows_redirects() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/new", mock_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html("moved here"))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(&HttpConfig::default()).unwrap();
    let body = transport
        .get(&format!("{}/old", mock_server.uri()))
        .await
        .unwrap();

    assert!(body.contains("moved here"));
}

#[tokio::test]
async fn test_full_crawl_and_combine() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let output = tempfile::TempDir::new().unwrap();

    mount_listing(&mock_server, "1", &["/property/a", "/property/b"]).await;
    mount_listing(&mock_server, "2", &["/property/c", "/property/missing"]).await;
    // Page 3 is not mounted: wiremock answers 404 and the crawl ends there

    Mock::given(method("GET"))
        .and(path("/property/a"))
        .respond_with(detail_page("Flat A", "₦ 1,000,000", &["Pool", "Gym"]))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/property/b"))
        .respond_with(detail_page("Flat B", "₦ 2,000,000", &[]))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/property/c"))
        .respond_with(detail_page("Flat C", "₦ 3,000,000", &["Parking"]))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, output.path());
    let report = Coordinator::new(config)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::ListingExhausted { page: 3 });
    assert_eq!(report.pages_processed, 2);
    assert_eq!(report.collected, 3);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].url, format!("{}/property/missing", base_url));
    assert_eq!(report.batch_files.len(), 2);
    assert!(output.path().join("failed_urls.csv").exists());

    let consolidator = Consolidator::new(output.path());
    let merged = consolidator
        .combine()
        .expect("Combine failed")
        .expect("Expected batch files");
    assert_eq!(merged.rows, 3);

    let records: Vec<PropertyRecord> = csv::Reader::from_path(&merged.output_path)
        .unwrap()
        .deserialize()
        .map(|r| r.unwrap())
        .collect();

    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Flat A", "Flat B", "Flat C"]);
    assert_eq!(records[0].location, "Lekki, Lagos");
    assert_eq!(records[0].price, "₦ 1,000,000");
    assert_eq!(
        records[0].features,
        Some(vec!["Pool".to_string(), "Gym".to_string()])
    );
    assert_eq!(records[1].features, None);
    assert_eq!(records[1].spec, "N/A");

    let removed = consolidator.cleanup(&merged, &AssumeYes).unwrap();
    assert_eq!(removed, 2);
    assert!(merged.output_path.exists());
}
