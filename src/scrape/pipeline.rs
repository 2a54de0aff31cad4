//! Single-page pipeline: Fetcher → Parser → Extractor → Formatter → Reporter
//!
//! Each call to [`Pipeline::run`] is an independent execution. The only
//! state shared between runs is the immutable configuration and the HTTP
//! client's connection pool.

use crate::config::Config;
use crate::output::{build_payload, format_markdown_report, format_metadata, Reporter, WebhookPayload};
use crate::scrape::extractor::extract_metadata;
use crate::scrape::fetcher::{build_http_client, fetch_page, FetchResult};
use crate::scrape::metadata::{PageMetadata, RunInfo};
use crate::scrape::parser::parse_document;
use crate::url::validate_target_url;
use crate::{FetchError, HeraldError, ParseError};
use reqwest::Client;

/// Everything a successful run produced
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub run: RunInfo,
    pub metadata: PageMetadata,
    /// The message that was delivered
    pub payload: WebhookPayload,
}

/// Runs the scrape-and-report pipeline for one page at a time
pub struct Pipeline<R> {
    config: Config,
    client: Client,
    reporter: R,
}

impl<R: Reporter> Pipeline<R> {
    /// Creates a pipeline with its own HTTP client
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `reporter` - Where finished reports are delivered
    pub fn new(config: Config, reporter: R) -> Result<Self, HeraldError> {
        let client = build_http_client(&config.fetch).map_err(FetchError::Client)?;

        Ok(Self {
            config,
            client,
            reporter,
        })
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Scrapes one page and delivers its report
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapeReport)` - The page was fetched (any HTTP status) and the report accepted
    /// * `Err(HeraldError::Url)` - The target is not an absolute http(s) URL
    /// * `Err(HeraldError::Fetch)` - No response after all retries; nothing is delivered
    /// * `Err(HeraldError::Parse)` - The body is empty or binary; nothing is delivered
    /// * `Err(HeraldError::Delivery)` - The destination rejected or missed the report
    pub async fn run(&self, target: &str) -> Result<ScrapeReport, HeraldError> {
        let url = validate_target_url(target)?;
        tracing::info!("Starting scrape for: {}", url);

        let fetch = fetch_page(&self.client, &self.config.fetch, &url).await?;
        let run = RunInfo::from_fetch(&url, &fetch);
        let metadata = analyze(&fetch)?;
        drop(fetch);

        let fields = format_metadata(&metadata);
        let payload = build_payload(&run, fields, &self.config.webhook, chrono::Utc::now());

        if let Err(e) = self.reporter.deliver(&payload).await {
            tracing::error!("Failed to deliver report for {}: {}", run.final_url, e);
            println!("{}", format_markdown_report(&payload));
            return Err(e.into());
        }

        tracing::info!(
            "Report for {} delivered (page status {})",
            run.final_url,
            run.status_code
        );

        Ok(ScrapeReport {
            run,
            metadata,
            payload,
        })
    }
}

/// Parses a fetched body and extracts its metadata
///
/// Kept synchronous so the document tree never lives across an await point.
pub fn analyze(fetch: &FetchResult) -> Result<PageMetadata, ParseError> {
    let document = parse_document(&fetch.body, &fetch.final_url)?;
    Ok(extract_metadata(&document, fetch))
}
