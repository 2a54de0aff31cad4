//! Metadata extraction from a parsed page
//!
//! This module walks the document tree once per field and builds a
//! [`PageMetadata`]. No field can fail the extraction: anything missing or
//! malformed degrades to `None` or an empty collection.
//!
//! All URLs leave this module absolute, resolved against the effective base
//! (`<base href>` when present, otherwise the final URL after redirects).

use crate::scrape::fetcher::{charset_from_content_type, FetchResult};
use crate::scrape::metadata::{Heading, HeadingLevel, LinkSet, PageMetadata};
use crate::url::{classify_link, resolve_link, resolve_resource, LinkClassification};
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashSet};
use url::Url;

/// Paragraphs must be strictly longer than this (in characters) to be kept
pub const MIN_PARAGRAPH_CHARS: usize = 50;

/// Maximum number of paragraphs kept
pub const MAX_PARAGRAPHS: usize = 5;

/// Maximum number of image URLs kept; the full distinct count is recorded separately
pub const MAX_IMAGES: usize = 20;

/// `rel` values recognised as page icons, compared after lower-casing and
/// collapsing whitespace
const ICON_RELATIONS: &[&str] = &[
    "icon",
    "shortcut icon",
    "icon shortcut",
    "apple-touch-icon",
    "apple-touch-icon-precomposed",
    "mask-icon",
    "fluid-icon",
];

/// Extracts the full metadata record from a parsed page
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `fetch` - The fetch that produced it (final URL and response headers)
///
/// # Example
///
/// ```
/// use scrape_herald::scrape::{extract_metadata, parse_document, FetchResult};
/// use std::collections::HashMap;
/// use url::Url;
///
/// let fetch = FetchResult {
///     final_url: Url::parse("https://example.com/").unwrap(),
///     status_code: 200,
///     headers: HashMap::new(),
///     body: "<title> Home </title>".to_string(),
///     elapsed_millis: 5,
///     attempts: 1,
/// };
/// let document = parse_document(&fetch.body, &fetch.final_url).unwrap();
/// let metadata = extract_metadata(&document, &fetch);
/// assert_eq!(metadata.title.as_deref(), Some("Home"));
/// ```
pub fn extract_metadata(document: &Html, fetch: &FetchResult) -> PageMetadata {
    let page_url = &fetch.final_url;
    let base_url = effective_base(document, page_url);

    let (open_graph, twitter_card) = extract_social_tags(document);
    let (images, image_count) = extract_images(document, &base_url);
    let (internal_links, external_links) = extract_links(document, page_url, &base_url);

    let metadata = PageMetadata {
        title: extract_title(document),
        description: meta_content(document, "description"),
        keywords: meta_content(document, "keywords"),
        canonical_url: extract_canonical(document, &base_url),
        charset: extract_charset(document, fetch),
        language: extract_language(document),
        robots: meta_content(document, "robots"),
        headings: extract_headings(document),
        paragraphs: extract_paragraphs(document),
        json_ld: extract_json_ld(document),
        open_graph,
        twitter_card,
        favicon: extract_favicon(document, &base_url),
        images,
        image_count,
        internal_links,
        external_links,
    };

    tracing::debug!(
        "Extracted {} headings, {} images, {} internal / {} external links from {}",
        metadata.headings.len(),
        metadata.image_count,
        metadata.internal_links.count(),
        metadata.external_links.count(),
        page_url
    );

    metadata
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Text content with runs of whitespace collapsed to single spaces
fn collapsed_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(|t| t.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Lower-cased, whitespace-collapsed `rel` attribute
fn rel_of(element: ElementRef) -> Option<String> {
    element.value().attr("rel").map(|rel| {
        rel.split_whitespace()
            .map(|t| t.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    })
}

/// Resolves the `<base href>` against the page URL, falling back to the page URL
fn effective_base(document: &Html, page_url: &Url) -> Url {
    selector("base[href]")
        .and_then(|sel| {
            document
                .select(&sel)
                .next()
                .and_then(|el| el.value().attr("href"))
                .and_then(|href| resolve_resource(href, page_url))
        })
        .unwrap_or_else(|| page_url.clone())
}

/// Extracts the page title from the first `<title>` element
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = selector("title")?;

    document
        .select(&title_selector)
        .next()
        .and_then(|element| non_empty(&element.text().collect::<String>()))
}

/// Content of the first `<meta name="...">` whose name matches case-insensitively
fn meta_content(document: &Html, name: &str) -> Option<String> {
    let meta_selector = selector("meta[name]")?;

    document
        .select(&meta_selector)
        .find(|el| {
            el.value()
                .attr("name")
                .map(|n| n.trim().eq_ignore_ascii_case(name))
                .unwrap_or(false)
        })
        .and_then(|el| el.value().attr("content"))
        .and_then(non_empty)
}

fn extract_canonical(document: &Html, base_url: &Url) -> Option<String> {
    let link_selector = selector("link[rel][href]")?;

    document
        .select(&link_selector)
        .find(|el| {
            rel_of(*el)
                .map(|rel| rel.split(' ').any(|t| t == "canonical"))
                .unwrap_or(false)
        })
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| resolve_resource(href, base_url))
        .map(|url| url.to_string())
}

/// `<meta charset>`, then `<meta http-equiv="Content-Type">`, then the HTTP header
fn extract_charset(document: &Html, fetch: &FetchResult) -> Option<String> {
    let declared = selector("meta[charset]").and_then(|sel| {
        document
            .select(&sel)
            .find_map(|el| el.value().attr("charset").and_then(non_empty))
    });

    declared
        .or_else(|| {
            selector("meta[http-equiv][content]").and_then(|sel| {
                document
                    .select(&sel)
                    .filter(|el| {
                        el.value()
                            .attr("http-equiv")
                            .map(|v| v.trim().eq_ignore_ascii_case("content-type"))
                            .unwrap_or(false)
                    })
                    .find_map(|el| {
                        el.value()
                            .attr("content")
                            .and_then(charset_from_content_type)
                    })
            })
        })
        .or_else(|| fetch.charset())
}

fn extract_language(document: &Html) -> Option<String> {
    document
        .root_element()
        .value()
        .attr("lang")
        .and_then(non_empty)
}

/// Non-empty `<h1>` and `<h2>` elements in document order
fn extract_headings(document: &Html) -> Vec<Heading> {
    let Some(heading_selector) = selector("h1, h2") else {
        return Vec::new();
    };

    document
        .select(&heading_selector)
        .filter_map(|el| {
            let level = HeadingLevel::from_tag(el.value().name())?;
            let text = collapsed_text(el);
            if text.is_empty() {
                None
            } else {
                Some(Heading { level, text })
            }
        })
        .collect()
}

fn extract_paragraphs(document: &Html) -> Vec<String> {
    let Some(paragraph_selector) = selector("p") else {
        return Vec::new();
    };

    document
        .select(&paragraph_selector)
        .map(collapsed_text)
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .take(MAX_PARAGRAPHS)
        .collect()
}

/// Parses every `application/ld+json` block independently
///
/// A block that fails to parse is skipped; the others are still returned.
fn extract_json_ld(document: &Html) -> Vec<serde_json::Value> {
    let Some(script_selector) = selector("script[type]") else {
        return Vec::new();
    };

    document
        .select(&script_selector)
        .filter(|el| {
            el.value()
                .attr("type")
                .map(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
                .unwrap_or(false)
        })
        .enumerate()
        .filter_map(|(index, el)| {
            let raw = el.text().collect::<String>();
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!("Skipping malformed JSON-LD block #{}: {}", index, e);
                    None
                }
            }
        })
        .collect()
}

/// Collects `og:*` and `twitter:*` meta tags, keyed by lower-cased suffix
///
/// Either the `property` or the `name` attribute may carry the key. Later
/// declarations overwrite earlier ones.
fn extract_social_tags(document: &Html) -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    let mut open_graph = BTreeMap::new();
    let mut twitter_card = BTreeMap::new();

    let Some(meta_selector) = selector("meta[content]") else {
        return (open_graph, twitter_card);
    };

    for element in document.select(&meta_selector) {
        let Some(content) = element.value().attr("content") else {
            continue;
        };

        let key = ["property", "name"]
            .iter()
            .filter_map(|attr| element.value().attr(attr))
            .map(|k| k.trim().to_ascii_lowercase())
            .find(|k| k.starts_with("og:") || k.starts_with("twitter:"));

        let Some(key) = key else {
            continue;
        };

        if let Some(suffix) = key.strip_prefix("og:") {
            if !suffix.is_empty() {
                open_graph.insert(suffix.to_string(), content.trim().to_string());
            }
        } else if let Some(suffix) = key.strip_prefix("twitter:") {
            if !suffix.is_empty() {
                twitter_card.insert(suffix.to_string(), content.trim().to_string());
            }
        }
    }

    (open_graph, twitter_card)
}

/// First `<link>` whose `rel` is a recognised icon relation
fn extract_favicon(document: &Html, base_url: &Url) -> Option<String> {
    let link_selector = selector("link[rel][href]")?;

    document
        .select(&link_selector)
        .filter(|el| {
            rel_of(*el)
                .map(|rel| ICON_RELATIONS.contains(&rel.as_str()))
                .unwrap_or(false)
        })
        .find_map(|el| {
            el.value()
                .attr("href")
                .and_then(|href| resolve_resource(href, base_url))
        })
        .map(|url| url.to_string())
}

/// Distinct `<img>` sources (`src`, then `srcset` candidates), capped at [`MAX_IMAGES`]
fn extract_images(document: &Html, base_url: &Url) -> (Vec<String>, usize) {
    let mut images = Vec::new();
    let mut seen = HashSet::new();

    let Some(img_selector) = selector("img") else {
        return (images, 0);
    };

    for element in document.select(&img_selector) {
        let src = element.value().attr("src").into_iter();
        let srcset = element
            .value()
            .attr("srcset")
            .into_iter()
            .flat_map(srcset_candidates);

        for reference in src.chain(srcset) {
            if let Some(url) = resolve_resource(reference, base_url) {
                let url = url.to_string();
                if seen.insert(url.clone()) && images.len() < MAX_IMAGES {
                    images.push(url);
                }
            }
        }
    }

    (images, seen.len())
}

/// URLs listed in a `srcset` attribute, descriptors dropped
fn srcset_candidates(srcset: &str) -> impl Iterator<Item = &str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
}

/// Splits `<a href>` targets into internal and external sets
fn extract_links(document: &Html, page_url: &Url, base_url: &Url) -> (LinkSet, LinkSet) {
    let mut internal = LinkSet::new();
    let mut external = LinkSet::new();

    let Some(a_selector) = selector("a[href]") else {
        return (internal, external);
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_link(href, base_url) else {
            continue;
        };

        match classify_link(page_url, &url) {
            LinkClassification::Internal => internal.insert(url.to_string()),
            LinkClassification::External => external.insert(url.to_string()),
        };
    }

    (internal, external)
}
