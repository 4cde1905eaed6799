//! Error types for the users client
//!
//! `ApiFailure` is the only error a caller of the query service ever sees.
//! Transport and JSON errors are translated into it inside the remote source.

use thiserror::Error;

/// Failures surfaced by the users API client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiFailure {
    /// The requested user does not exist upstream
    #[error("User with ID {0} not found.")]
    NotFound(u32),

    /// Upstream answered with a non-success status other than a single-user 404
    #[error("Failed to {context}: {reason}")]
    RemoteError {
        /// Operation that failed, e.g. "fetch users page 2"
        context: String,
        /// HTTP status code
        status: u16,
        /// Reason phrase for the status
        reason: String,
    },

    /// Successful status but a required part of the body was missing
    #[error("Invalid {0} returned from API.")]
    InvalidPayload(String),

    /// Failure below the HTTP layer (connect, DNS, reset, body read)
    #[error("Network error while calling API: {0}")]
    NetworkFailure(String),

    /// Body could not be parsed as the expected structure
    #[error("Failed to parse API response: {0}")]
    PayloadParseFailure(String),

    /// Request exceeded its time budget
    #[error("API request timed out.")]
    Timeout,
}

impl ApiFailure {
    /// Whether this failure is expected to clear up on retry.
    ///
    /// Network failures, timeouts and 5xx responses are transient; everything
    /// else is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiFailure::NetworkFailure(_) | ApiFailure::Timeout => true,
            ApiFailure::RemoteError { status, .. } => (500..=599).contains(status),
            ApiFailure::NotFound(_)
            | ApiFailure::InvalidPayload(_)
            | ApiFailure::PayloadParseFailure(_) => false,
        }
    }

    /// Short label for the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            ApiFailure::NotFound(_) => "not found",
            ApiFailure::RemoteError { .. } => "remote error",
            ApiFailure::InvalidPayload(_) => "invalid payload",
            ApiFailure::NetworkFailure(_) => "network failure",
            ApiFailure::PayloadParseFailure(_) => "parse failure",
            ApiFailure::Timeout => "timeout",
        }
    }
}

impl From<reqwest::Error> for ApiFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiFailure::Timeout
        } else {
            ApiFailure::NetworkFailure(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiFailure {
    fn from(err: serde_json::Error) -> Self {
        ApiFailure::PayloadParseFailure(err.to_string())
    }
}

/// Errors raised while loading settings or building the HTTP client
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file could not be read
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid JSON for the expected shape
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    /// Base URL is empty or not http(s)
    #[error("Invalid base URL: '{0}'")]
    InvalidBaseUrl(String),

    /// API key cannot be sent as a header value
    #[error("Invalid API key: {0}")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),

    /// HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Convenience result type for API calls
pub type Result<T> = std::result::Result<T, ApiFailure>;
