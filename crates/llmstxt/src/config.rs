//! Reader proxy configuration

use clap::Args;
use std::time::Duration;

/// Upstream error excerpt returned to clients, in characters
pub const DEFAULT_ERROR_EXCERPT: usize = 200;

/// Upstream error excerpt written to the log, in characters
pub const DEFAULT_LOG_EXCERPT: usize = 500;

/// Settings for the reader proxy server
#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    /// Base address of the extraction service; targets are appended as `<base>/<url>`
    #[arg(long, env = "CRAWLER_API_URL")]
    pub crawler_api_url: String,

    #[arg(long, env = "LLMSTXT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "LLMSTXT_PORT", default_value = "3000")]
    pub port: u16,

    /// Deadline for one upstream call, body included
    #[arg(long, env = "LLMSTXT_UPSTREAM_TIMEOUT_SECS", default_value = "60")]
    pub upstream_timeout_secs: u64,

    /// Characters of an upstream error body relayed to the client
    #[arg(long, env = "LLMSTXT_ERROR_EXCERPT", default_value_t = DEFAULT_ERROR_EXCERPT)]
    pub error_excerpt: usize,

    /// Characters of an upstream error body written to the log
    #[arg(long, env = "LLMSTXT_LOG_EXCERPT", default_value_t = DEFAULT_LOG_EXCERPT)]
    pub log_excerpt: usize,

    /// Custom User-Agent for upstream requests
    #[arg(long, env = "LLMSTXT_USER_AGENT")]
    pub user_agent: Option<String>,
}

impl ServerConfig {
    /// Config with defaults for everything but the extraction service
    pub fn new(crawler_api_url: impl Into<String>) -> Self {
        Self {
            crawler_api_url: crawler_api_url.into(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            upstream_timeout_secs: 60,
            error_excerpt: DEFAULT_ERROR_EXCERPT,
            log_excerpt: DEFAULT_LOG_EXCERPT,
            user_agent: None,
        }
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// `host:port` to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ServerConfig,
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::new("https://r.example.com");
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.upstream_timeout(), Duration::from_secs(60));
        assert_eq!(config.error_excerpt, 200);
        assert_eq!(config.log_excerpt, 500);
    }

    #[test]
    fn test_parse_flags() {
        let cli = TestCli::try_parse_from([
            "test",
            "--crawler-api-url",
            "https://r.example.com",
            "--port",
            "8080",
            "--error-excerpt",
            "50",
        ])
        .unwrap();
        assert_eq!(cli.config.crawler_api_url, "https://r.example.com");
        assert_eq!(cli.config.port, 8080);
        assert_eq!(cli.config.error_excerpt, 50);
        assert!(cli.config.user_agent.is_none());
    }
}
