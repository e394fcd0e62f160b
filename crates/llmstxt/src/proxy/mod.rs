//! Reader proxy
//!
//! A stateless axum router in front of the extraction service:
//!
//! - `GET /api/reader?url=<url>` answers `{"text": ...}` or `{"error": ...}`
//! - `GET /<embedded url>` answers the markdown itself
//!
//! Every failure, panics included, leaves as a JSON error body.

mod reader;
mod upstream;

pub use reader::ReaderResponse;
pub use upstream::ExtractionService;

use crate::config::ServerConfig;
use crate::error::ProxyError;
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

/// Shared state of the proxy handlers
#[derive(Debug, Clone)]
pub struct ProxyState {
    pub upstream: ExtractionService,
}

impl ProxyState {
    pub fn from_config(config: &ServerConfig) -> Result<Self, ProxyError> {
        Ok(Self {
            upstream: ExtractionService::from_config(config)?,
        })
    }
}

/// Build the proxy router
pub fn router(state: ProxyState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(AnyOrigin);

    Router::new()
        .route("/", get(reader::index))
        .route("/api/reader", get(reader::read))
        .route("/favicon.ico", get(reader::no_favicon))
        .route("/*target", get(reader::read_embedded))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unexpected failure".to_string()
    };
    error!(detail = %detail, "Handler panicked");
    ProxyError::Internal(detail).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_panic_becomes_json_error() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Server error: boom");
    }
}
