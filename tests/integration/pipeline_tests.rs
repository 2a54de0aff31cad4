//! Integration tests for the scrape-and-report pipeline
//!
//! These tests use wiremock for both the scraped site and the webhook
//! endpoint and run the full pipeline end-to-end.

use scrape_herald::config::{load_config, Config};
use scrape_herald::output::limits::{EMBED_TOTAL_LIMIT, MAX_FIELDS};
use scrape_herald::output::WebhookPayload;
use scrape_herald::scrape::HeadingLevel;
use scrape_herald::{
    ConsoleReporter, DeliveryError, FetchError, HeraldError, Pipeline, Reporter, WebhookReporter,
};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WEBHOOK_PATH: &str = "/api/webhooks/1/secret-token";

const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Acme Widgets</title>
  <meta name="description" content="Hand made widgets since 1999">
  <meta property="og:title" content="Acme">
  <link rel="icon" sizes="512x512" href="/icon-512.png">
</head>
<body>
  <h1>Welcome</h1>
  <h1>Our Widgets</h1>
  <p>Every widget is assembled by hand in our workshop and tested before it ships.</p>
  <a href="/about#team">About</a>
  <a href="https://partner.example.org/">Partner</a>
  <a href="mailto:hello@example.com">Mail</a>
</body>
</html>"#;

/// Creates a test configuration with fast retries and the given webhook
fn create_test_config(webhook_base: Option<&str>) -> Config {
    let mut config = Config::default();
    config.fetch.timeout_ms = 2_000;
    config.fetch.max_retries = 1;
    config.fetch.backoff_ms = 10;
    config.fetch.max_backoff_ms = 20;
    config.webhook.url = webhook_base.map(|base| format!("{}{}", base, WEBHOOK_PATH));
    config
}

fn html(status: u16, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

/// Keeps every payload it is asked to deliver
#[derive(Default)]
struct RecordingReporter {
    delivered: Mutex<Vec<WebhookPayload>>,
}

impl RecordingReporter {
    fn delivered(&self) -> Vec<WebhookPayload> {
        self.delivered.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<(), DeliveryError> {
        self.delivered.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

#[tokio::test]
async fn test_full_run_delivers_one_report() {
    let site = MockServer::start().await;
    let hook = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(200, HOME_PAGE).insert_header("server", "mock-nginx"))
        .expect(1)
        .mount(&site)
        .await;

    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&hook)
        .await;

    let config = create_test_config(Some(&hook.uri()));
    let reporter = WebhookReporter::new(&config.webhook).unwrap();
    let pipeline = Pipeline::new(config, reporter).unwrap();

    let report = pipeline.run(&format!("{}/", site.uri())).await.unwrap();

    assert_eq!(report.run.status_code, 200);
    assert_eq!(report.metadata.title.as_deref(), Some("Acme Widgets"));
    assert_eq!(report.metadata.headings_at(HeadingLevel::H1).len(), 2);
    assert_eq!(
        report.metadata.favicon.as_deref(),
        Some(format!("{}/icon-512.png", site.uri()).as_str())
    );
    assert!(report
        .metadata
        .internal_links
        .contains(&format!("{}/about", site.uri())));
    assert!(report
        .metadata
        .external_links
        .contains("https://partner.example.org/"));
    assert_eq!(report.metadata.external_links.count(), 1);

    let requests = hook.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let fields = body["embeds"][0]["fields"].as_array().unwrap();
    let value_of = |name: &str| {
        fields
            .iter()
            .find(|f| f["name"] == name)
            .map(|f| f["value"].as_str().unwrap_or_default().to_string())
    };

    assert_eq!(body["username"], "Scrape Herald");
    assert_eq!(body["allowed_mentions"]["parse"], serde_json::json!([]));
    assert_eq!(value_of("Status").as_deref(), Some("200 OK"));
    assert_eq!(value_of("Server").as_deref(), Some("mock-nginx"));
    assert_eq!(value_of("Title").as_deref(), Some("Acme Widgets"));
    assert_eq!(value_of("Language").as_deref(), Some("en"));
    assert_eq!(value_of("Internal Links").as_deref(), Some("1"));
    assert_eq!(value_of("External Links").as_deref(), Some("1"));
    assert!(value_of("H1 Headlines (2)").unwrap().contains("Our Widgets"));
    assert!(value_of("Open Graph & Twitter Cards")
        .unwrap()
        .contains("og:title: Acme"));
    assert!(fields.len() <= MAX_FIELDS);
}

#[tokio::test]
async fn test_unreachable_page_sends_nothing() {
    let site = MockServer::start().await;
    let hook = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html(200, HOME_PAGE).set_delay(Duration::from_millis(500)))
        .mount(&site)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&hook)
        .await;

    let mut config = create_test_config(Some(&hook.uri()));
    config.fetch.timeout_ms = 100;
    let reporter = WebhookReporter::new(&config.webhook).unwrap();
    let pipeline = Pipeline::new(config, reporter).unwrap();

    let result = pipeline.run(&site.uri()).await;

    match result {
        Err(HeraldError::Fetch(FetchError::Exhausted { attempts, .. })) => assert_eq!(attempts, 2),
        other => panic!("expected exhausted fetch, got {:?}", other.map(|r| r.run)),
    }
}

#[tokio::test]
async fn test_error_page_is_still_reported() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(html(404, "<html><head><title>Not Found</title></head></html>"))
        .expect(1)
        .mount(&site)
        .await;

    let pipeline = Pipeline::new(create_test_config(None), RecordingReporter::default()).unwrap();
    let report = pipeline
        .run(&format!("{}/missing", site.uri()))
        .await
        .unwrap();

    assert_eq!(report.run.status_code, 404);
    let delivered = pipeline.reporter().delivered();
    assert_eq!(delivered.len(), 1);
    let embed = &delivered[0].embeds[0];
    assert_eq!(embed.field("Status").unwrap().value, "404 Not Found");
    assert_eq!(embed.field("Title").unwrap().value, "Not Found");
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .respond_with(html(200, HOME_PAGE))
        .mount(&site)
        .await;

    let pipeline = Pipeline::new(create_test_config(None), RecordingReporter::default()).unwrap();
    let report = pipeline.run(&site.uri()).await.unwrap();

    assert_eq!(report.run.status_code, 200);
    assert_eq!(site.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_earlier_server_error_reported_when_retry_times_out() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html(503, "<html><head><title>Maintenance</title></head></html>"))
        .up_to_n_times(1)
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .respond_with(html(200, HOME_PAGE).set_delay(Duration::from_millis(800)))
        .mount(&site)
        .await;

    let mut config = create_test_config(None);
    config.fetch.timeout_ms = 200;
    let pipeline = Pipeline::new(config, RecordingReporter::default()).unwrap();

    let report = pipeline.run(&site.uri()).await.unwrap();

    assert_eq!(report.run.status_code, 503);
    assert_eq!(report.metadata.title.as_deref(), Some("Maintenance"));
    let delivered = pipeline.reporter().delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(
        delivered[0].embeds[0].field("Status").unwrap().value,
        "503 Service Unavailable"
    );
}

#[tokio::test]
async fn test_link_counts_kept_on_content_heavy_page() {
    let site = MockServer::start().await;

    let mut body = format!(
        r#"<html><head><title>Heavy</title>
        <meta name="description" content="{}">
        <meta name="keywords" content="{}">
        <meta name="robots" content="{}">"#,
        "d".repeat(1200),
        "k".repeat(1200),
        "r".repeat(1800)
    );
    for i in 0..12 {
        body.push_str(&format!(
            r#"<meta property="og:tag{}" content="{}">"#,
            i,
            "o".repeat(120)
        ));
    }
    body.push_str("</head><body>");
    for i in 0..30 {
        body.push_str(&format!(
            "<h1>Headline number {i} {pad}</h1><h2>Subheadline number {i} {pad}</h2><p>Paragraph {i} {pad}</p>\
             <a href=\"/page/{i}\">in</a><a href=\"https://site{i}.example/\">out</a>",
            i = i,
            pad = "w".repeat(80)
        ));
    }
    for i in 0..6 {
        body.push_str(&format!(r#"<img src="/images/{}/{}.png">"#, "p".repeat(150), i));
    }
    body.push_str("</body></html>");

    Mock::given(method("GET"))
        .respond_with(html(200, &body))
        .mount(&site)
        .await;

    let pipeline = Pipeline::new(create_test_config(None), RecordingReporter::default()).unwrap();
    let report = pipeline.run(&site.uri()).await.unwrap();

    assert_eq!(report.metadata.internal_links.count(), 30);
    assert_eq!(report.metadata.external_links.count(), 30);

    let embed = &report.payload.embeds[0];
    assert!(embed.char_len() <= EMBED_TOTAL_LIMIT);
    assert!(embed.fields.len() <= MAX_FIELDS);
    assert_eq!(embed.field("Status").unwrap().value, "200 OK");
    assert_eq!(embed.field("Internal Links").unwrap().value, "30");
    assert_eq!(embed.field("External Links").unwrap().value, "30");
}

#[tokio::test]
async fn test_redirect_reports_final_url() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html(200, HOME_PAGE))
        .mount(&site)
        .await;

    let pipeline = Pipeline::new(create_test_config(None), RecordingReporter::default()).unwrap();
    let report = pipeline.run(&format!("{}/old", site.uri())).await.unwrap();

    let final_url = format!("{}/new", site.uri());
    assert_eq!(report.run.final_url.as_str(), final_url);
    assert_eq!(
        report.payload.embeds[0].field("Final URL").unwrap().value,
        final_url
    );
}

#[tokio::test]
async fn test_rejected_delivery_is_an_error() {
    let site = MockServer::start().await;
    let hook = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html(200, HOME_PAGE))
        .mount(&site)
        .await;

    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("{\"message\": \"Invalid Form Body\"}"))
        .expect(1)
        .mount(&hook)
        .await;

    let config = create_test_config(Some(&hook.uri()));
    let reporter = WebhookReporter::new(&config.webhook).unwrap();
    let pipeline = Pipeline::new(config, reporter).unwrap();

    match pipeline.run(&site.uri()).await {
        Err(HeraldError::Delivery(DeliveryError::Rejected { status, body })) => {
            assert_eq!(status, 400);
            assert!(body.contains("Invalid Form Body"));
        }
        other => panic!("expected rejected delivery, got {:?}", other.map(|r| r.run)),
    }
}

#[tokio::test]
async fn test_empty_body_is_not_delivered() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&site)
        .await;

    let pipeline = Pipeline::new(create_test_config(None), RecordingReporter::default()).unwrap();
    let result = pipeline.run(&site.uri()).await;

    assert!(matches!(result, Err(HeraldError::Parse(_))));
    assert!(pipeline.reporter().delivered().is_empty());
}

#[tokio::test]
async fn test_oversized_page_fits_limits() {
    let site = MockServer::start().await;

    let mut body = String::from("<html><head><title>Big</title></head><body>");
    for i in 0..200 {
        body.push_str(&format!(
            "<h1>{}</h1><h2>{}</h2><a href=\"/p/{}\">x</a><a href=\"https://other{}.example/\">y</a><img src=\"/img/{}.png\">",
            "*".repeat(40),
            "_".repeat(40),
            i,
            i,
            i
        ));
    }
    body.push_str("</body></html>");

    Mock::given(method("GET"))
        .respond_with(html(200, &body))
        .mount(&site)
        .await;

    let pipeline = Pipeline::new(create_test_config(None), RecordingReporter::default()).unwrap();
    let report = pipeline.run(&site.uri()).await.unwrap();

    let embed = &report.payload.embeds[0];
    assert!(embed.char_len() <= EMBED_TOTAL_LIMIT);
    assert!(embed.fields.len() <= MAX_FIELDS);
    assert_eq!(report.metadata.internal_links.count(), 200);
    assert_eq!(report.metadata.image_count, 200);
}

#[tokio::test]
async fn test_dry_run_needs_no_webhook() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html(200, HOME_PAGE))
        .mount(&site)
        .await;

    let pipeline = Pipeline::new(create_test_config(None), ConsoleReporter).unwrap();
    let report = pipeline.run(&site.uri()).await.unwrap();

    assert_eq!(report.payload.embeds.len(), 1);
}

#[tokio::test]
async fn test_runs_are_independent() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html(200, HOME_PAGE))
        .mount(&site)
        .await;

    let pipeline = Pipeline::new(create_test_config(None), RecordingReporter::default()).unwrap();

    assert!(pipeline.run("not a url").await.is_err());
    assert!(pipeline.run(&format!("{}/ok", site.uri())).await.is_ok());
    assert_eq!(pipeline.reporter().delivered().len(), 1);
}

#[test]
fn test_config_file_loads_with_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[fetch]\ntimeout-ms = 5000\n\n[webhook]\nurl = \"https://discord.com/api/webhooks/1/token\""
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.fetch.timeout_ms, 5000);
    assert_eq!(config.fetch.max_retries, 5);
    assert_eq!(config.webhook.username, "Scrape Herald");
    assert!(WebhookReporter::new(&config.webhook).is_ok());
}
