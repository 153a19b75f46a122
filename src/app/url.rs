//! URL and domain validation utilities.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::config::MAX_URL_LENGTH;

/// Dot-separated labels of 1-63 alphanumerics/hyphens, no leading or trailing hyphen.
static DOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)*[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$",
    )
    .expect("Domain pattern is a constant and must compile - this is a programming error")
});

/// Validates a URL taken from the archive index or an import file.
///
/// The URL must parse as an absolute URL with an `http` or `https` scheme and
/// must not exceed `MAX_URL_LENGTH`. Unlike user input, archived URLs are never
/// rewritten: a missing scheme makes the URL invalid.
///
/// # Arguments
///
/// * `url` - The URL string to validate
///
/// # Returns
///
/// `true` if the URL should be kept, `false` otherwise.
pub fn is_valid_archive_url(url: &str) -> bool {
    if url.len() > MAX_URL_LENGTH {
        debug!(
            "Dropping URL exceeding maximum length ({} > {}): {}...",
            url.len(),
            MAX_URL_LENGTH,
            url.chars().take(50).collect::<String>()
        );
        return false;
    }

    match url::Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Validates and normalizes a domain name supplied by the user.
///
/// Surrounding whitespace is trimmed and the name is lowercased so the store
/// holds one dataset per domain regardless of how it was typed.
///
/// # Returns
///
/// `Some(normalized_domain)` if the domain is well formed, `None` otherwise.
pub fn validate_domain(domain: &str) -> Option<String> {
    let trimmed = domain.trim();
    if trimmed.is_empty() || !DOMAIN_PATTERN.is_match(trimmed) {
        return None;
    }
    Some(trimmed.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_archive_url_accepts_http_and_https() {
        assert!(is_valid_archive_url("http://example.com/"));
        assert!(is_valid_archive_url("https://example.com/path?q=1#frag"));
        assert!(is_valid_archive_url("http://EXAMPLE.com:8080/A"));
    }

    #[test]
    fn test_is_valid_archive_url_rejects_other_schemes() {
        assert!(!is_valid_archive_url("ftp://example.com/file"));
        assert!(!is_valid_archive_url("mailto:someone@example.com"));
        assert!(!is_valid_archive_url("javascript:alert(1)"));
    }

    #[test]
    fn test_is_valid_archive_url_rejects_relative_and_garbage() {
        assert!(!is_valid_archive_url("/a.php"));
        assert!(!is_valid_archive_url("example.com/page"));
        assert!(!is_valid_archive_url("not a url at all!!!"));
        assert!(!is_valid_archive_url(""));
    }

    #[test]
    fn test_is_valid_archive_url_rejects_overlong() {
        let long = format!("http://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert!(!is_valid_archive_url(&long));
    }

    #[test]
    fn test_validate_domain_accepts_common_forms() {
        assert_eq!(validate_domain("example.com"), Some("example.com".to_string()));
        assert_eq!(
            validate_domain("  Sub.Example.CO.uk "),
            Some("sub.example.co.uk".to_string())
        );
        assert_eq!(validate_domain("localhost"), Some("localhost".to_string()));
        assert_eq!(validate_domain("my-site.org"), Some("my-site.org".to_string()));
    }

    #[test]
    fn test_validate_domain_rejects_malformed() {
        assert_eq!(validate_domain(""), None);
        assert_eq!(validate_domain("   "), None);
        assert_eq!(validate_domain("-bad.com"), None);
        assert_eq!(validate_domain("bad-.com"), None);
        assert_eq!(validate_domain("exa mple.com"), None);
        assert_eq!(validate_domain("http://example.com"), None);
        assert_eq!(validate_domain("example..com"), None);
        assert_eq!(validate_domain(&format!("{}.com", "a".repeat(64))), None);
    }
}
