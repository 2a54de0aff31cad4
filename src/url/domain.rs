use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scrape_herald::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Lowercases a host and strips one leading `www.`
pub fn site_host(host: &str) -> String {
    let host = host.to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Returns true if `candidate` lives on the same site as `page`
///
/// Hosts are compared after [`site_host`] normalisation; scheme and port are
/// ignored.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scrape_herald::url::is_same_site;
///
/// let page = Url::parse("https://example.com/").unwrap();
/// let link = Url::parse("https://www.example.com/a").unwrap();
/// assert!(is_same_site(&page, &link));
/// ```
pub fn is_same_site(page: &Url, candidate: &Url) -> bool {
    match (page.host_str(), candidate.host_str()) {
        (Some(a), Some(b)) => site_host(a) == site_host(b),
        _ => false,
    }
}
