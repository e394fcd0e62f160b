//! Rebuilding a target URL that arrived embedded in the app's own path

use super::{is_valid_url, normalize_url};
use std::borrow::Cow;

/// A URL captured from the request path
///
/// Routers split the path on `/`, so an embedded `https://a.com/b` usually
/// arrives as `["https:", "", "a.com", "b"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteParam {
    /// Whole embedded URL as one decoded segment
    Single(String),
    /// Path segments in order, one per `/`
    Segments(Vec<String>),
}

impl RouteParam {
    /// Build from a raw request path such as `/example.com/docs`
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        RouteParam::Segments(trimmed.split('/').map(str::to_string).collect())
    }

    fn joined(&self) -> Cow<'_, str> {
        match self {
            RouteParam::Single(segment) => Cow::Borrowed(segment.as_str()),
            RouteParam::Segments(segments) => Cow::Owned(segments.join("/")),
        }
    }
}

/// Rebuild a valid absolute URL from a route parameter
///
/// Returns `None` when neither the normalized form nor any fallback
/// candidate validates; callers treat that as a fatal input error.
pub fn reconstruct_url(param: &RouteParam) -> Option<String> {
    let joined = param.joined();
    let reconstructed = urlencoding::decode(&joined)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| joined.to_string());

    let normalized = normalize_url(&reconstructed);
    if is_valid_url(&normalized) {
        return Some(normalized);
    }

    let candidates = [
        reconstructed.clone(),
        format!("https://{}", reconstructed),
        format!("https://www.{}", reconstructed),
    ];
    let found = candidates.into_iter().find(|candidate| is_valid_url(candidate));
    if found.is_none() {
        tracing::debug!(path = %reconstructed, "Route parameter did not form a valid URL");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(parts: &[&str]) -> RouteParam {
        RouteParam::Segments(parts.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_single_host_segment() {
        assert_eq!(
            reconstruct_url(&segments(&["example.com"])),
            Some("https://example.com".to_string())
        );
        assert_eq!(
            reconstruct_url(&RouteParam::Single("www.example.com".into())),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn test_rejoins_split_scheme() {
        assert_eq!(
            reconstruct_url(&segments(&["https:", "", "example.com", "path"])),
            Some("https://example.com/path".to_string())
        );
    }

    #[test]
    fn test_collapsed_scheme_slashes_still_validate() {
        // Some routers merge `//`, leaving `https:/example.com`
        let rebuilt = reconstruct_url(&segments(&["https:", "example.com"]));
        assert!(rebuilt.as_deref().is_some_and(is_valid_url));
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(
            reconstruct_url(&RouteParam::Single("https%3A%2F%2Fexample.com%2Fa%20b".into())),
            Some("https://example.com/a b".to_string())
        );
    }

    #[test]
    fn test_bad_encoding_keeps_raw_string() {
        // %FF is not valid UTF-8 once decoded
        assert_eq!(
            reconstruct_url(&segments(&["example.com", "caf%FF"])),
            Some("https://example.com/caf%FF".to_string())
        );
    }

    #[test]
    fn test_www_fallback() {
        assert_eq!(
            reconstruct_url(&segments(&["localhost"])),
            Some("https://www.localhost".to_string())
        );
    }

    #[test]
    fn test_unreconstructable() {
        assert_eq!(reconstruct_url(&segments(&["bad host", "x"])), None);
        assert_eq!(reconstruct_url(&RouteParam::Single("not a url".into())), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            RouteParam::from_path("/example.com/docs"),
            segments(&["example.com", "docs"])
        );
        assert_eq!(
            RouteParam::from_path("https://a.com"),
            segments(&["https:", "", "a.com"])
        );
    }
}
