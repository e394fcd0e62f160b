//! llmstxt - turn any web page into markdown
//!
//! This crate provides everything behind the "paste a URL, get markdown"
//! flow: cleaning up what the user typed, calling a reader proxy, and
//! tracking the request lifecycle that a front end renders.
//!
//! ## Pieces
//!
//! - [`address`] - normalization, validation and reconstruction of target URLs
//! - [`MarkdownClient`] - calls the reader proxy and folds failures into a [`FetchResult`]
//! - [`FetchController`] - the `Idle -> Loading -> Success | Error` state machine
//! - [`proxy`] - the axum router that forwards to the extraction service

pub mod address;
pub mod client;
pub mod config;
pub mod controller;
mod error;
pub mod proxy;

pub use address::{is_valid_url, normalize_url, reconstruct_url, safe_path, RouteParam};
pub use client::{FetchResult, MarkdownClient, MarkdownSource};
pub use config::ServerConfig;
pub use controller::{ControllerTimings, FetchController, LifecycleState, Phase, Submission};
pub use error::{ClientError, InputError, ProxyError};
pub use proxy::{router, ProxyState};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "llmstxt/0.1";

/// File name offered when the markdown is saved to disk
pub const DOWNLOAD_FILENAME: &str = "llms.md";

/// Status lines shown while a page is being read, in display order
pub const LOADING_MESSAGES: &[&str] = &[
    "Fetching content from URL...",
    "Reading through the website...",
    "Extracting the good stuff...",
    "Processing the content...",
    "Almost there, hang tight...",
    "Just a few more seconds...",
    "Making sure everything's perfect...",
    "This is taking longer than usual...",
    "Still working on it, promise...",
    "Thanks for your patience...",
    "Almost done, really this time...",
];

/// Usage text served at the proxy root
pub const USAGE: &str = r#"# llmstxt

Turns a web page into markdown.

- `GET /api/reader?url=<url>` returns `{"text": "<markdown>"}`
- `GET /<url>` returns the markdown directly, e.g. `/example.com/docs`
"#;
