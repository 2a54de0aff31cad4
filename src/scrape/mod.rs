//! Scrape module: everything between a target URL and a metadata record
//!
//! This module contains:
//! - HTTP fetching with retry logic
//! - HTML parsing
//! - Metadata and SEO signal extraction
//! - The pipeline that runs one page through to delivery

mod extractor;
mod fetcher;
mod metadata;
mod parser;
mod pipeline;

pub use extractor::{extract_metadata, MAX_IMAGES, MAX_PARAGRAPHS, MIN_PARAGRAPH_CHARS};
pub use fetcher::{
    backoff_delay, build_http_client, charset_from_content_type, fetch_page, is_retryable_status,
    retry_after, retry_delay, FetchResult,
};
pub use metadata::{Heading, HeadingLevel, LinkSet, PageMetadata, RunInfo};
pub use parser::parse_document;
pub use pipeline::{analyze, Pipeline, ScrapeReport};
