//! Best-effort rewriting of typed input into an `https://` URL

/// Marker of an absolute URL pasted behind another host
const EMBEDDED_MARKER: &str = "/http";

/// One rewrite of the normalization pipeline
type Step = fn(&str) -> &str;

/// Rewrites applied in order before the scheme is prepended
const STEPS: &[Step] = &[recover_embedded_url, strip_scheme, strip_www];

/// Normalize user input into a canonical `https://` URL
///
/// Returns an empty string when the input is blank. The result is not
/// guaranteed to be a valid URL; see [`is_valid_url`](super::is_valid_url).
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let cleaned = STEPS.iter().fold(trimmed, |acc, step| step(acc));
    format!("https://{}", cleaned)
}

/// Path under which a normalized URL is embedded in the app's own address
///
/// `https://example.com/docs` becomes `example.com/docs`.
pub fn safe_path(normalized: &str) -> &str {
    strip_scheme(normalized)
}

/// `host.com/https://target.com` -> `target.com`
///
/// Only the text between the first marker and the next one is kept.
fn recover_embedded_url(input: &str) -> &str {
    match input.find(EMBEDDED_MARKER) {
        Some(pos) => {
            let rest = &input[pos + EMBEDDED_MARKER.len()..];
            let rest = rest.find(EMBEDDED_MARKER).map_or(rest, |end| &rest[..end]);
            rest.strip_prefix("s://")
                .or_else(|| rest.strip_prefix("://"))
                .unwrap_or(rest)
        }
        None => input,
    }
}

fn strip_scheme(input: &str) -> &str {
    input
        .strip_prefix("http://")
        .or_else(|| input.strip_prefix("https://"))
        .unwrap_or(input)
}

fn strip_www(input: &str) -> &str {
    input.strip_prefix("www.").unwrap_or(input)
}
