//! HTTP fetcher implementation
//!
//! This module handles the single page request of a run, including:
//! - Building the HTTP client from the fetch configuration
//! - Following redirects and recording the final URL
//! - Retry logic with bounded exponential backoff for transient failures
//! - Error classification

use crate::config::FetchConfig;
use crate::FetchError;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use url::Url;

/// A completed page fetch
///
/// Any HTTP response counts as completed, including 4xx and 5xx.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Response headers, names lower-cased
    pub headers: HashMap<String, String>,
    /// Decoded page body
    pub body: String,
    /// Duration of the attempt that produced this response, body included
    pub elapsed_millis: u64,
    /// Number of attempts made, starting at 1
    pub attempts: u32,
}

impl FetchResult {
    /// Looks up a response header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    /// The `charset` parameter of the `Content-Type` header, if declared
    pub fn charset(&self) -> Option<String> {
        self.header("content-type")
            .and_then(charset_from_content_type)
    }
}

/// Extracts the `charset=` parameter from a Content-Type style value
///
/// # Examples
///
/// ```
/// use scrape_herald::scrape::charset_from_content_type;
///
/// assert_eq!(
///     charset_from_content_type("text/html; charset=\"UTF-8\""),
///     Some("UTF-8".to_string())
/// );
/// assert_eq!(charset_from_content_type("text/html"), None);
/// ```
pub fn charset_from_content_type(value: &str) -> Option<String> {
    value.split(';').find_map(|part| {
        let part = part.trim();
        let (key, val) = part.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let val = val.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if val.is_empty() {
            None
        } else {
            Some(val.to_string())
        }
    })
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_millis(config.timeout_ms);

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page with retry logic
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx, 3xx, 4xx (except 429) | Completed fetch |
/// | HTTP 429, 5xx | Retry; the last response is returned once retries run out |
/// | Timeout, connection error, body read error | Retry; `FetchError::Exhausted` once retries run out |
///
/// Attempt `n + 1` waits `backoff-ms * 2^(n-1)`, capped at `max-backoff-ms`.
/// A `Retry-After` header on a retried response raises that delay.
/// If a later attempt fails at the transport level after a 429/5xx was
/// received, the last such response is returned instead of an error.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `config` - Retry and backoff settings
/// * `url` - The URL to fetch
pub async fn fetch_page(
    client: &Client,
    config: &FetchConfig,
    url: &Url,
) -> Result<FetchResult, FetchError> {
    let max_attempts = config.max_retries.saturating_add(1);
    let mut last_error = String::new();
    let mut last_response: Option<FetchResult> = None;

    for attempt in 1..=max_attempts {
        match fetch_once(client, url).await {
            Ok(mut result) => {
                result.attempts = attempt;

                if is_retryable_status(result.status_code) && attempt < max_attempts {
                    let delay = retry_delay(config, attempt, retry_after(&result));
                    tracing::warn!(
                        "Fetch of {} returned {} (attempt {}/{}), retrying in {}ms",
                        url,
                        result.status_code,
                        attempt,
                        max_attempts,
                        delay.as_millis()
                    );
                    last_response = Some(result);
                    tokio::time::sleep(delay).await;
                    continue;
                }

                tracing::info!(
                    "Fetched {} (status: {}, load time: {}ms, attempts: {})",
                    result.final_url,
                    result.status_code,
                    result.elapsed_millis,
                    attempt
                );
                return Ok(result);
            }
            Err(e) => {
                last_error = describe_error(&e);

                if attempt < max_attempts {
                    let delay = backoff_delay(config, attempt);
                    tracing::warn!(
                        "Fetch of {} failed (attempt {}/{}): {}; retrying in {}ms",
                        url,
                        attempt,
                        max_attempts,
                        last_error,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                } else {
                    tracing::error!(
                        "Fetch of {} failed (attempt {}/{}): {}",
                        url,
                        attempt,
                        max_attempts,
                        last_error
                    );
                }
            }
        }
    }

    // A response from an earlier attempt outranks a later transport failure
    if let Some(mut result) = last_response {
        result.attempts = max_attempts;
        tracing::warn!(
            "Reporting earlier {} response for {} after later attempts failed",
            result.status_code,
            url
        );
        return Ok(result);
    }

    Err(FetchError::Exhausted {
        url: url.to_string(),
        attempts: max_attempts,
        message: last_error,
    })
}

/// Performs one GET and reads the full body
async fn fetch_once(client: &Client, url: &Url) -> Result<FetchResult, reqwest::Error> {
    let started = Instant::now();
    let response = client.get(url.clone()).send().await?;

    let status = response.status();
    let final_url = response.url().clone();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
        })
        .collect();

    let body = response.text().await?;

    Ok(FetchResult {
        final_url,
        status_code: status.as_u16(),
        headers,
        body,
        elapsed_millis: started.elapsed().as_millis() as u64,
        attempts: 1,
    })
}

/// Returns true for statuses that indicate a transient server-side problem
pub fn is_retryable_status(status_code: u16) -> bool {
    status_code == StatusCode::TOO_MANY_REQUESTS.as_u16() || (500..600).contains(&status_code)
}

/// Delay before the attempt following attempt number `attempt`
pub fn backoff_delay(config: &FetchConfig, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(20);
    let millis = config
        .backoff_ms
        .saturating_mul(1u64 << exponent)
        .min(config.max_backoff_ms);
    Duration::from_millis(millis)
}

/// The `Retry-After` header, when given in whole seconds
pub fn retry_after(result: &FetchResult) -> Option<Duration> {
    result
        .header("retry-after")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Delay before retrying a 429/5xx response
///
/// `Retry-After` acts as a floor on the backoff schedule but is itself
/// capped at `max-backoff-ms` so a run always terminates.
pub fn retry_delay(config: &FetchConfig, attempt: u32, retry_after: Option<Duration>) -> Duration {
    let backoff = backoff_delay(config, attempt);
    match retry_after {
        Some(requested) => backoff.max(requested.min(Duration::from_millis(config.max_backoff_ms))),
        None => backoff,
    }
}

fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("Request timeout: {}", e)
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else if e.is_redirect() {
        format!("Redirect error: {}", e)
    } else {
        e.to_string()
    }
}
