//! Scrape-Herald: a single-page SEO reporter
//!
//! This crate fetches one web page, extracts its metadata and SEO signals,
//! formats them within a webhook destination's size limits and delivers the
//! result as a single message.

pub mod config;
pub mod output;
pub mod scrape;
pub mod url;

use thiserror::Error;

/// Main error type for Scrape-Herald operations
#[derive(Debug, Error)]
pub enum HeraldError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Raised when no HTTP response could be obtained for the target page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No response from {url} after {attempts} attempt(s): {message}")]
    Exhausted {
        url: String,
        attempts: u32,
        message: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Raised when the fetched body cannot be treated as an HTML document
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Empty document body from {url}")]
    Empty { url: String },

    #[error("Document body from {url} is not text")]
    Binary { url: String },
}

/// Raised when the report could not be handed to the destination
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Webhook rejected the report with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Webhook at {host} unreachable: {message}")]
    Transport { host: String, message: String },

    #[error("No webhook URL configured")]
    MissingWebhook,

    #[error("Failed to build webhook client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Result type alias for Scrape-Herald operations
pub type Result<T> = std::result::Result<T, HeraldError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use output::{ConsoleReporter, Reporter, WebhookReporter};
pub use scrape::{FetchResult, PageMetadata, Pipeline, ScrapeReport};
pub use crate::url::{extract_domain, validate_target_url};
