//! Error types for llmstxt

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors produced by the reader proxy
///
/// Every variant maps to a JSON body of the form `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// `url` query parameter is missing or empty
    #[error("URL parameter is required")]
    MissingUrl,

    /// Target does not parse as a URL
    #[error("Invalid URL format provided.")]
    InvalidUrl,

    /// Route-embedded path could not be turned into a URL
    #[error("Invalid URL format. Please provide a valid URL.")]
    InvalidRoute,

    /// Extraction service answered with a non-success status
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Extraction service answered 2xx with nothing in it
    #[error("Empty response from extraction service.")]
    EmptyBody,

    /// Extraction service did not finish in time
    #[error("Server error: extraction service timed out")]
    Timeout,

    /// Failed to reach the extraction service
    #[error("Server error: {0}")]
    Transport(String),

    /// Anything else that went wrong while handling the request
    #[error("Server error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProxyError::Timeout
        } else if err.is_connect() || err.is_request() {
            ProxyError::Transport(err.to_string())
        } else {
            ProxyError::Internal(err.to_string())
        }
    }

    /// HTTP status returned to the caller
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingUrl | ProxyError::InvalidUrl | ProxyError::InvalidRoute => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::EmptyBody
            | ProxyError::Timeout
            | ProxyError::Transport(_)
            | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Errors raised inside [`MarkdownClient`](crate::MarkdownClient)
///
/// These never escape to callers of `fetch_markdown`; they are logged and
/// folded into a [`FetchResult::Error`](crate::FetchResult::Error).
#[derive(Debug, Error)]
pub enum ClientError {
    /// Proxy base address is not a usable URL
    #[error("Invalid proxy address: {0}")]
    InvalidBase(String),

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// Request never produced a response
    #[error("Request to reader proxy failed")]
    Transport(#[source] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("Invalid response body")]
    Decode(#[source] serde_json::Error),
}

/// Submissions rejected before any network activity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter a URL.")]
    Empty,

    #[error("Please enter a valid URL format.")]
    InvalidFormat,

    #[error("Invalid URL format. Please provide a valid URL.")]
    InvalidRoute,
}
