//! Target URL handling
//!
//! Design: user input is cleaned up by an ordered pipeline of small string
//! rewrites ([`normalize_url`]), then checked separately ([`is_valid_url`]).
//! Normalization never fails; validity is a distinct question.

mod normalize;
mod reconstruct;
mod validate;

pub use normalize::{normalize_url, safe_path};
pub use reconstruct::{reconstruct_url, RouteParam};
pub use validate::is_valid_url;
