//! Structured record produced by the extractor
//!
//! Every optional field keeps the absent-vs-empty distinction: `None` means
//! the page did not provide the value, and the formatter omits it.

use crate::scrape::fetcher::FetchResult;
use std::collections::{BTreeMap, HashSet};
use url::Url;

/// Heading rank kept by the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingLevel {
    H1,
    H2,
}

impl HeadingLevel {
    /// Maps an element name to a heading level
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(Self::H1),
            "h2" => Some(Self::H2),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Self::H1 => 1,
            Self::H2 => 2,
        }
    }
}

/// A non-empty `<h1>` or `<h2>` in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
}

/// Ordered, de-duplicated set of absolute URLs
#[derive(Debug, Clone, Default)]
pub struct LinkSet {
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL; returns false if it was already present
    pub fn insert(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Number of distinct URLs
    pub fn count(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// The first `n` URLs in first-seen order
    pub fn sample(&self, n: usize) -> &[String] {
        &self.urls[..n.min(self.urls.len())]
    }
}

/// Metadata and SEO signals extracted from one page
#[derive(Debug, Clone, Default)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub canonical_url: Option<String>,
    pub charset: Option<String>,
    pub language: Option<String>,
    pub robots: Option<String>,

    pub headings: Vec<Heading>,
    pub paragraphs: Vec<String>,

    /// Each successfully parsed `application/ld+json` block
    pub json_ld: Vec<serde_json::Value>,

    /// `og:*` tags keyed by suffix; later declarations win
    pub open_graph: BTreeMap<String, String>,
    /// `twitter:*` tags keyed by suffix; later declarations win
    pub twitter_card: BTreeMap<String, String>,

    pub favicon: Option<String>,

    /// Distinct image URLs in first-seen order, capped for display
    pub images: Vec<String>,
    /// Distinct image URLs found, before the cap
    pub image_count: usize,

    pub internal_links: LinkSet,
    pub external_links: LinkSet,
}

impl PageMetadata {
    /// Heading texts at the given level, in document order
    pub fn headings_at(&self, level: HeadingLevel) -> Vec<&str> {
        self.headings
            .iter()
            .filter(|h| h.level == level)
            .map(|h| h.text.as_str())
            .collect()
    }
}

/// Run-level facts about the fetch, reported alongside the metadata
#[derive(Debug, Clone)]
pub struct RunInfo {
    /// URL the run was started with
    pub requested_url: Url,
    /// URL after redirects
    pub final_url: Url,
    pub status_code: u16,
    pub elapsed_millis: u64,
    pub server: Option<String>,
    pub content_length: Option<String>,
    pub last_modified: Option<String>,
}

impl RunInfo {
    pub fn from_fetch(requested_url: &Url, fetch: &FetchResult) -> Self {
        let header = |name: &str| fetch.header(name).map(|v| v.to_string());

        Self {
            requested_url: requested_url.clone(),
            final_url: fetch.final_url.clone(),
            status_code: fetch.status_code,
            elapsed_millis: fetch.elapsed_millis,
            server: header("server"),
            content_length: header("content-length"),
            last_modified: header("last-modified"),
        }
    }

    /// True if the response came from a different URL than requested
    pub fn was_redirected(&self) -> bool {
        self.requested_url != self.final_url
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_link_set_dedup_preserves_order() {
        let mut links = LinkSet::new();
        assert!(links.insert("https://a.com/1".to_string()));
        assert!(links.insert("https://a.com/2".to_string()));
        assert!(!links.insert("https://a.com/1".to_string()));
        assert!(links.insert("https://a.com/3".to_string()));

        assert_eq!(links.count(), 3);
        assert_eq!(links.sample(2), &["https://a.com/1", "https://a.com/2"]);
        assert_eq!(links.sample(10).len(), 3);
        assert!(links.contains("https://a.com/3"));
    }

    #[test]
    fn test_heading_level_from_tag() {
        assert_eq!(HeadingLevel::from_tag("h1"), Some(HeadingLevel::H1));
        assert_eq!(HeadingLevel::from_tag("h2"), Some(HeadingLevel::H2));
        assert_eq!(HeadingLevel::from_tag("h3"), None);
        assert_eq!(HeadingLevel::H2.as_u8(), 2);
    }

    #[test]
    fn test_run_info_from_fetch() {
        let mut headers = HashMap::new();
        headers.insert("server".to_string(), "nginx".to_string());
        headers.insert("last-modified".to_string(), "Tue, 01 Jan 2030".to_string());

        let fetch = FetchResult {
            final_url: Url::parse("https://example.com/home").unwrap(),
            status_code: 200,
            headers,
            body: String::new(),
            elapsed_millis: 120,
            attempts: 1,
        };
        let requested = Url::parse("https://example.com/").unwrap();
        let run = RunInfo::from_fetch(&requested, &fetch);

        assert_eq!(run.server.as_deref(), Some("nginx"));
        assert!(run.content_length.is_none());
        assert!(run.was_redirected());
        assert!(run.is_success());
    }
}
