//! Client for the reader proxy
//!
//! [`MarkdownClient`] makes exactly one request to `/api/reader` per call and
//! never fails: transport, status and decoding problems all come back as a
//! [`FetchResult::Error`] carrying a message fit to show the user.

use crate::error::ClientError;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::error;
use url::Url;

/// Path of the reader endpoint relative to the proxy base
const READER_PATH: &str = "api/reader";

/// Shown when the request never produced a response
const TRANSPORT_MESSAGE: &str = "An unexpected error occurred while fetching data.";

/// Shown when the proxy answered with something other than JSON
const INVALID_RESPONSE_MESSAGE: &str =
    "Received an invalid response from the server. Please try again.";

/// Outcome of a markdown fetch
///
/// Exactly one of markdown or an error message is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchResult {
    /// Markdown text of the page
    Data(String),
    /// User-facing error message
    Error(String),
}

impl FetchResult {
    /// Markdown, if the fetch succeeded
    pub fn data(&self) -> Option<&str> {
        match self {
            FetchResult::Data(text) => Some(text),
            FetchResult::Error(_) => None,
        }
    }

    /// Error message, if the fetch failed
    pub fn error(&self) -> Option<&str> {
        match self {
            FetchResult::Data(_) => None,
            FetchResult::Error(message) => Some(message),
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, FetchResult::Data(_))
    }
}

/// Anything that can turn a normalized URL into markdown
///
/// The lifecycle controller depends on this rather than on HTTP directly.
#[async_trait]
pub trait MarkdownSource: Send + Sync {
    /// Fetch markdown for an already normalized and validated URL
    async fn fetch_markdown(&self, url: &str) -> FetchResult;
}

/// JSON body answered by the reader proxy
#[derive(Debug, Deserialize)]
struct ReaderBody {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for a running reader proxy
#[derive(Debug, Clone)]
pub struct MarkdownClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl MarkdownClient {
    /// Create a client for the proxy at `base`, e.g. `http://127.0.0.1:3000`
    pub fn new(base: &str) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ClientError::ClientBuild)?;

        Self::with_client(http, base)
    }

    /// Create a client reusing an existing reqwest client
    pub fn with_client(http: reqwest::Client, base: &str) -> Result<Self, ClientError> {
        let mut base_url =
            Url::parse(base).map_err(|e| ClientError::InvalidBase(format!("{}: {}", base, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let endpoint = base_url
            .join(READER_PATH)
            .map_err(|e| ClientError::InvalidBase(format!("{}: {}", base, e)))?;

        Ok(Self { http, endpoint })
    }

    /// Full reader endpoint address
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Reader request URL for `target`, with the target percent-encoded
    fn request_url(&self, target: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().clear().append_pair("url", target);
        url
    }

    async fn request(&self, target: &str) -> Result<FetchResult, ClientError> {
        let response = self
            .http
            .get(self.request_url(target))
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(ClientError::Transport)?;
        let body: ReaderBody = serde_json::from_slice(&bytes).map_err(ClientError::Decode)?;

        if !status.is_success() {
            let message = body
                .error
                .unwrap_or_else(|| format!("HTTP error! Status: {}", status.as_u16()));
            return Ok(FetchResult::Error(message));
        }

        Ok(match body.text {
            Some(text) => FetchResult::Data(text),
            None => FetchResult::Error(INVALID_RESPONSE_MESSAGE.to_string()),
        })
    }
}

#[async_trait]
impl MarkdownSource for MarkdownClient {
    async fn fetch_markdown(&self, url: &str) -> FetchResult {
        match self.request(url).await {
            Ok(result) => result,
            Err(e) => {
                error!(url = %url, error = ?e, "Client fetch error");
                match e {
                    ClientError::Decode(_) => {
                        FetchResult::Error(INVALID_RESPONSE_MESSAGE.to_string())
                    }
                    _ => FetchResult::Error(TRANSPORT_MESSAGE.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_result_accessors() {
        let ok = FetchResult::Data("# hi".into());
        assert_eq!(ok.data(), Some("# hi"));
        assert_eq!(ok.error(), None);
        assert!(ok.is_data());

        let err = FetchResult::Error("not found".into());
        assert_eq!(err.data(), None);
        assert_eq!(err.error(), Some("not found"));
        assert!(!err.is_data());
    }

    #[test]
    fn test_endpoint_from_base() {
        let client = MarkdownClient::new("http://127.0.0.1:3000").unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "http://127.0.0.1:3000/api/reader"
        );

        let client = MarkdownClient::new("https://tools.example.com/reader").unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://tools.example.com/reader/api/reader"
        );
    }

    #[test]
    fn test_invalid_base() {
        assert!(matches!(
            MarkdownClient::new("not a base"),
            Err(ClientError::InvalidBase(_))
        ));
    }

    #[test]
    fn test_request_url_encodes_target() {
        let client = MarkdownClient::new("http://127.0.0.1:3000").unwrap();
        let url = client.request_url("https://example.com/a?b=c&d=e");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:3000/api/reader?url=https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc%26d%3De"
        );
    }
}
