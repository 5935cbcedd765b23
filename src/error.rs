// src/error.rs

//! Unified error handling for the scraper application.

use thiserror::Error;

/// Result type alias for application operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
///
/// These are the failures that abort an operation outright. Per-site and
/// per-hub fetch failures are deliberately NOT represented here; they are
/// contained at their own boundary as [`FetchError`] and never propagate.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction failed
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

    /// Cache store error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP server error
    #[error("Server error: {0}")]
    Server(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server(message.into())
    }
}

/// Outcome of a single outbound fetch against a third-party site.
///
/// Every per-site and per-hub call site returns `Result<_, FetchError>`; the
/// aggregating pipeline treats any error variant as "contributes nothing".
/// This makes the fan-out's swallow-all behavior an explicit policy instead of
/// a broad catch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Anti-bot challenge (HTTP 403/503)
    #[error("blocked by upstream (HTTP {0})")]
    Blocked(u16),

    /// Any other non-success HTTP status
    #[error("upstream HTTP error {0}")]
    Status(u16),

    /// Timeout, DNS failure, connection reset
    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    /// Classify an HTTP status code, treating 403/503 as an anti-bot block.
    pub fn from_status(code: u16) -> Self {
        match code {
            403 | 503 => Self::Blocked(code),
            _ => Self::Status(code),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}
