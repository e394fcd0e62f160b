use super::ProxyState;
use crate::address::{reconstruct_url, RouteParam};
use crate::error::ProxyError;
use crate::USAGE;
use axum::extract::{OriginalUri, RawQuery, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use url::Url;

const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

/// Successful `/api/reader` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderResponse {
    pub text: String,
}

pub(super) async fn index() -> impl IntoResponse {
    ([(CONTENT_TYPE, MARKDOWN_CONTENT_TYPE)], USAGE)
}

/// Browsers ask for this on their own; it is not a target to read
pub(super) async fn no_favicon() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// `GET /api/reader?url=<url>`
pub(super) async fn read(
    State(state): State<ProxyState>,
    RawQuery(query): RawQuery,
) -> Result<Json<ReaderResponse>, ProxyError> {
    let target = target_from_query(query.as_deref())?;
    let text = state
        .upstream
        .markdown(&target)
        .await
        .inspect_err(log_failure)?;
    Ok(Json(ReaderResponse { text }))
}

/// `GET /<embedded url>`, e.g. `/example.com/docs` or `/https://example.com`
pub(super) async fn read_embedded(
    State(state): State<ProxyState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, ProxyError> {
    let param = route_param(uri.path(), uri.query());
    let target = reconstruct_url(&param).ok_or(ProxyError::InvalidRoute)?;
    let text = state
        .upstream
        .markdown(&target)
        .await
        .inspect_err(log_failure)?;
    Ok(([(CONTENT_TYPE, MARKDOWN_CONTENT_TYPE)], text).into_response())
}

/// Validate the `url` query parameter, defaulting to https
fn target_from_query(query: Option<&str>) -> Result<String, ProxyError> {
    let raw = query
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "url")
                .map(|(_, value)| value.into_owned())
        })
        .filter(|value| !value.is_empty())
        .ok_or(ProxyError::MissingUrl)?;

    let full = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw
    } else {
        format!("https://{}", raw)
    };

    Url::parse(&full).map_err(|_| ProxyError::InvalidUrl)?;
    Ok(full)
}

/// Path segments of the request, with any query string kept on the last one
fn route_param(path: &str, query: Option<&str>) -> RouteParam {
    let mut param = RouteParam::from_path(path);
    if let (RouteParam::Segments(segments), Some(query)) = (&mut param, query) {
        if let Some(last) = segments.last_mut() {
            last.push('?');
            last.push_str(query);
        }
    }
    param
}

fn log_failure(err: &ProxyError) {
    match err {
        ProxyError::Upstream { .. } => {}
        _ => error!(error = %err, "Reader request failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_query() {
        assert_eq!(
            target_from_query(Some("url=https%3A%2F%2Fexample.com")).unwrap(),
            "https://example.com"
        );
        assert_eq!(
            target_from_query(Some("url=example.com%2Fdocs")).unwrap(),
            "https://example.com/docs"
        );
        assert_eq!(
            target_from_query(Some("url=http://example.com")).unwrap(),
            "http://example.com"
        );
    }

    #[test]
    fn test_target_from_query_missing() {
        assert!(matches!(
            target_from_query(None),
            Err(ProxyError::MissingUrl)
        ));
        assert!(matches!(
            target_from_query(Some("other=1")),
            Err(ProxyError::MissingUrl)
        ));
        assert!(matches!(
            target_from_query(Some("url=")),
            Err(ProxyError::MissingUrl)
        ));
    }

    #[test]
    fn test_target_from_query_malformed() {
        assert!(matches!(
            target_from_query(Some("url=https%3A%2F%2F")),
            Err(ProxyError::InvalidUrl)
        ));
        assert!(matches!(
            target_from_query(Some("url=bad%20host")),
            Err(ProxyError::InvalidUrl)
        ));
    }

    #[test]
    fn test_route_param_keeps_query() {
        assert_eq!(
            route_param("/example.com/search", Some("q=rust")),
            RouteParam::Segments(vec!["example.com".into(), "search?q=rust".into()])
        );
        assert_eq!(
            route_param("/example.com", None),
            RouteParam::Segments(vec!["example.com".into()])
        );
    }
}
