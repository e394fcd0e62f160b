//! Calls to the external extraction service

use crate::config::ServerConfig;
use crate::error::ProxyError;
use crate::DEFAULT_USER_AGENT;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, warn};

/// Representation requested from the extraction service
const MARKDOWN_ACCEPT: &str = "text/markdown; charset=utf-8";

/// Client for the extraction service
///
/// The service takes the target appended to its base address
/// (`<base>/https://example.com`) and answers with markdown text.
#[derive(Debug, Clone)]
pub struct ExtractionService {
    http: reqwest::Client,
    base: String,
    timeout: Duration,
    error_excerpt: usize,
    log_excerpt: usize,
}

impl ExtractionService {
    pub fn from_config(config: &ServerConfig) -> Result<Self, ProxyError> {
        let mut headers = HeaderMap::new();
        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let agent_header = HeaderValue::from_str(user_agent).map_err(|e| {
            ProxyError::Internal(format!("invalid User-Agent {:?}: {}", user_agent, e))
        })?;
        headers.insert(USER_AGENT, agent_header);
        headers.insert(ACCEPT, HeaderValue::from_static(MARKDOWN_ACCEPT));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.upstream_timeout())
            .build()
            .map_err(|e| ProxyError::Internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base: config.crawler_api_url.trim_end_matches('/').to_string(),
            timeout: config.upstream_timeout(),
            error_excerpt: config.error_excerpt,
            log_excerpt: config.log_excerpt,
        })
    }

    /// Address the service is asked for `target`
    pub fn request_url(&self, target: &str) -> String {
        format!("{}/{}", self.base, target)
    }

    /// Fetch markdown for an absolute `target` URL
    pub async fn markdown(&self, target: &str) -> Result<String, ProxyError> {
        let request_url = self.request_url(target);
        debug!(url = %request_url, "Forwarding to extraction service");

        let deadline = Instant::now() + self.timeout;
        let response = tokio::time::timeout_at(deadline, self.http.get(&request_url).send())
            .await
            .map_err(|_| ProxyError::Timeout)?
            .map_err(ProxyError::from_reqwest)?;

        let status = response.status();
        let body = read_body_until(response, deadline).await?;
        let text = String::from_utf8_lossy(&body).into_owned();

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                body = %excerpt(&text, self.log_excerpt),
                "Extraction service error"
            );
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                message: format!(
                    "Failed to fetch from extraction service. Status: {}. {}",
                    status.as_u16(),
                    excerpt(&text, self.error_excerpt)
                ),
            });
        }

        if text.is_empty() {
            return Err(ProxyError::EmptyBody);
        }

        Ok(text)
    }
}

/// First `max_chars` characters of `text`
pub(crate) fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Read the whole response body, giving up at `deadline`
async fn read_body_until(
    response: reqwest::Response,
    deadline: Instant,
) -> Result<Bytes, ProxyError> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();

    loop {
        tokio::select! {
            chunk = stream.next() => {
                match chunk {
                    Some(Ok(bytes)) => body.extend_from_slice(&bytes),
                    Some(Err(e)) => {
                        error!("Error reading upstream body chunk: {}", e);
                        return Err(ProxyError::from_reqwest(e));
                    }
                    None => return Ok(Bytes::from(body)),
                }
            }
            _ = tokio::time::sleep_until(deadline) => {
                warn!(read = body.len(), "Upstream body timeout reached");
                return Err(ProxyError::Timeout);
            }
        }
    }
}
