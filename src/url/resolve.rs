use url::Url;

/// Schemes that never produce a fetchable page or resource
const EXCLUDED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - empty hrefs
/// - fragment-only hrefs (same page anchors)
/// - javascript:, mailto:, tel: and data: references
/// - hrefs that do not parse against the base
/// - non-HTTP(S) URLs after resolution
///
/// The fragment of a kept link is removed so that `/a#x` and `/a#y` count
/// as one page.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.starts_with('#') {
        return None;
    }

    let mut url = resolve_reference(href, base_url)?;
    url.set_fragment(None);
    Some(url)
}

/// Resolves a resource reference (image, icon, canonical) to an absolute URL
///
/// Applies the same scheme policy as [`resolve_link`] but keeps fragments.
pub fn resolve_resource(src: &str, base_url: &Url) -> Option<Url> {
    resolve_reference(src.trim(), base_url)
}

fn resolve_reference(reference: &str, base_url: &Url) -> Option<Url> {
    if reference.is_empty() {
        return None;
    }

    let lowered = reference.to_ascii_lowercase();
    if EXCLUDED_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        return None;
    }

    match base_url.join(reference) {
        Ok(absolute_url) => {
            // Only accept HTTP and HTTPS URLs
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
