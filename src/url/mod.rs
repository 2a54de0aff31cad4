//! URL handling module for Scrape-Herald
//!
//! This module provides target URL validation, relative reference
//! resolution with the crate's link policy, and same-site classification.

mod domain;
mod resolve;
mod validate;

// Re-export main functions
pub use domain::{extract_domain, is_same_site, site_host};
pub use resolve::{resolve_link, resolve_resource};
pub use validate::validate_target_url;

use ::url::Url;

/// Where a link points relative to the page it was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClassification {
    /// Same host as the page, ignoring case and a leading `www.`
    Internal,
    /// Any other host
    External,
}

/// Classifies a resolved link against the page URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scrape_herald::url::{classify_link, LinkClassification};
///
/// let page = Url::parse("https://example.com/").unwrap();
/// let link = Url::parse("https://other.com/").unwrap();
/// assert_eq!(classify_link(&page, &link), LinkClassification::External);
/// ```
pub fn classify_link(page: &Url, link: &Url) -> LinkClassification {
    if is_same_site(page, link) {
        LinkClassification::Internal
    } else {
        LinkClassification::External
    }
}
