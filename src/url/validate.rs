use crate::UrlError;
use url::Url;

/// Validates a target URL before anything is fetched
///
/// # Validation Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Require the `http` or `https` scheme
/// 3. Require a non-empty host
///
/// # Arguments
///
/// * `url_str` - The URL string supplied by the caller
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL
/// * `Err(UrlError)` - The URL cannot be scraped
///
/// # Examples
///
/// ```
/// use scrape_herald::url::validate_target_url;
///
/// let url = validate_target_url("https://example.com/page").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
///
/// assert!(validate_target_url("ftp://example.com/").is_err());
/// ```
pub fn validate_target_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingDomain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_https() {
        let url = validate_target_url("https://example.com/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_accepts_http_with_port() {
        let url = validate_target_url("http://127.0.0.1:8080/page").unwrap();
        assert_eq!(url.port(), Some(8080));
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert!(validate_target_url("  https://example.com/  ").is_ok());
    }

    #[test]
    fn test_rejects_relative() {
        assert!(matches!(
            validate_target_url("/just/a/path"),
            Err(UrlError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(matches!(
            validate_target_url("ftp://example.com/file"),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(matches!(
            validate_target_url("mailto:someone@example.com"),
            Err(UrlError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(validate_target_url("not a url").is_err());
        assert!(validate_target_url("").is_err());
    }
}
