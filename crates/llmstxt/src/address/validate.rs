use url::Url;

/// Check that `input` is an absolute http(s) URL with a dotted hostname
///
/// Never panics; anything that fails to parse is simply invalid.
pub fn is_valid_url(input: &str) -> bool {
    let Ok(parsed) = Url::parse(input) else {
        return false;
    };

    matches!(parsed.scheme(), "http" | "https")
        && parsed.host_str().is_some_and(|host| host.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("http://example.com/path?q=1"));
        assert!(is_valid_url("https://sub.example.co.uk"));
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("mailto:someone@example.com"));
        assert!(!is_valid_url("file:///etc/hosts"));
    }

    #[test]
    fn test_rejects_undotted_hosts() {
        assert!(!is_valid_url("https://localhost"));
        assert!(!is_valid_url("http://intranet/page"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("https://"));
        assert!(!is_valid_url("https://exa mple.com"));
    }
}
