//! Utility functions and helpers.

pub mod http;
pub mod retry;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
///
/// Returns `fallback` when `href` cannot be resolved.
pub fn resolve_url(base: &Url, href: &str, fallback: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| fallback.to_string())
}

/// Collapse whitespace runs and trim both ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
