//! Error types for provider calls.

use thiserror::Error;

/// Markers the generation service uses in error bodies when a quota is hit.
const RATE_LIMIT_MARKERS: &[&str] = &["resource_exhausted", "resource exhausted", "rate limit"];

#[derive(Error, Debug)]
pub enum Error {
    /// No API key configured for the provider
    #[error("Missing API key for provider '{0}'")]
    MissingApiKey(String),

    /// HTTP 429 or a quota-exhausted error body
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    /// Any other non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service answered 200 but without usable content
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for errors that signal throttling rather than a real failure.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Error::RateLimited { .. } => true,
            Error::Api { status, message } => *status == 429 || mentions_rate_limit(message),
            Error::Other(message) => mentions_rate_limit(message),
            _ => false,
        }
    }
}

/// Textual rate-limit detection for errors without a status code.
pub fn mentions_rate_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|m| lower.contains(m))
}

pub type Result<T> = std::result::Result<T, Error>;
