//! HTML document parsing
//!
//! `scraper` (html5ever underneath) recovers from malformed markup the way
//! browsers do, so the only inputs rejected here are bodies that are not an
//! HTML document at all.

use crate::ParseError;
use scraper::Html;
use url::Url;

/// Parses a fetched body into a traversable document tree
///
/// # Arguments
///
/// * `body` - The decoded response body
/// * `source_url` - Where the body came from, for error context
///
/// # Returns
///
/// * `Ok(Html)` - The parsed document
/// * `Err(ParseError)` - The body is empty or binary
///
/// # Example
///
/// ```
/// use scrape_herald::scrape::parse_document;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/").unwrap();
/// let document = parse_document("<p>unclosed <b>markup", &url).unwrap();
/// assert!(document.root_element().html().contains("unclosed"));
/// ```
pub fn parse_document(body: &str, source_url: &Url) -> Result<Html, ParseError> {
    if body.trim().is_empty() {
        return Err(ParseError::Empty {
            url: source_url.to_string(),
        });
    }

    if body.contains('\0') {
        return Err(ParseError::Binary {
            url: source_url.to_string(),
        });
    }

    Ok(Html::parse_document(body))
}
