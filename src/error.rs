// src/error.rs

//! Unified error handling for the notice bot.

use std::fmt;

use thiserror::Error;

/// Result type alias for notice bot operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A single HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Missing or unusable configuration (credentials included)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote API answered but refused the request
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// A request kept failing after every retry
    #[error("Request to {url} failed after {attempts} attempt(s): {message}")]
    Network {
        url: String,
        attempts: u32,
        message: String,
    },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a network error for a request that exhausted its retries.
    pub fn network(url: impl Into<String>, attempts: u32, message: impl fmt::Display) -> Self {
        Self::Network {
            url: url.into(),
            attempts,
            message: message.to_string(),
        }
    }

    /// Whether this error comes from missing or invalid configuration.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_classified() {
        assert!(AppError::config("BOT_TOKEN is not set").is_config());
        assert!(AppError::validation("state.max_saved must be > 0").is_config());
        assert!(!AppError::network("https://example.com", 3, "timed out").is_config());
    }

    #[test]
    fn test_network_error_message() {
        let err = AppError::network("https://example.com/notices", 4, "status 503");
        assert_eq!(
            err.to_string(),
            "Request to https://example.com/notices failed after 4 attempt(s): status 503"
        );
    }
}
