use serde::Deserialize;

/// Main configuration structure for Scrape-Herald
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// Page fetching behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Total request timeout per attempt (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Retries after the first attempt on transport errors, 429 and 5xx
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base delay before the first retry; doubled on each further retry (milliseconds)
    #[serde(rename = "backoff-ms")]
    pub backoff_ms: u64,

    /// Upper bound for a single retry delay (milliseconds)
    #[serde(rename = "max-backoff-ms")]
    pub max_backoff_ms: u64,

    /// Maximum number of redirects followed
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,

    /// User-Agent header sent with the page request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_retries: 5,
            backoff_ms: 1_000,
            max_backoff_ms: 30_000,
            max_redirects: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string(),
        }
    }
}

/// Report destination configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Webhook endpoint; required unless running dry
    pub url: Option<String>,

    /// Display name the message is posted under
    pub username: String,

    /// Avatar shown next to the message
    #[serde(rename = "avatar-url")]
    pub avatar_url: Option<String>,

    /// Timeout for the single delivery attempt (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: "Scrape Herald".to_string(),
            avatar_url: None,
            timeout_ms: 10_000,
        }
    }
}
