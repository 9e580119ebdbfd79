use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the regatta API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport level failure (connection refused, DNS, timeout, bad JSON).
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("Server responded with {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// The configured base URL cannot address the API.
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
