//! API error types for the JIRA REST client.

use std::fmt;

use thiserror::Error;

/// Broad category of an [`ApiError`].
///
/// Every failure of a dispatched request falls into exactly one of these,
/// which lets callers branch on the stage that failed without matching on
/// every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The client could not be constructed.
    Configuration,
    /// The request body could not be converted to JSON.
    Serialization,
    /// The HTTP round trip failed or returned a non-success status.
    Transport,
    /// The response body was not the expected JSON.
    Deserialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Serialization => "serialization",
            ErrorKind::Transport => "transport",
            ErrorKind::Deserialization => "deserialization",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when interacting with the JIRA API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid or missing base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The blocking runtime could not be started.
    #[error("Failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// The request body could not be serialized.
    #[error("Failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Authentication failed - invalid username or password.
    #[error("Authentication failed: check your username and password")]
    Unauthorized,

    /// Permission denied - user lacks access to the resource.
    #[error("Permission denied: you don't have access to this resource")]
    Forbidden,

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Conflict error - the resource was modified concurrently.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limited by the JIRA API.
    #[error("Rate limited: please wait before retrying")]
    RateLimited,

    /// JIRA server error or any other unexpected status.
    #[error("JIRA server error: {0}")]
    ServerError(String),

    /// Network or HTTP error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid response from the API.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an error from an HTTP status code.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound(context.to_string()),
            409 => ApiError::Conflict(context.to_string()),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(format!("HTTP {}: {}", status, context)),
            _ => ApiError::ServerError(format!("Unexpected HTTP {}: {}", status, context)),
        }
    }

    /// The stage of the request that produced this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidUrl(_) | ApiError::Runtime(_) => ErrorKind::Configuration,
            ApiError::Serialization(_) => ErrorKind::Serialization,
            ApiError::Unauthorized
            | ApiError::Forbidden
            | ApiError::NotFound(_)
            | ApiError::Conflict(_)
            | ApiError::RateLimited
            | ApiError::ServerError(_)
            | ApiError::Network(_) => ErrorKind::Transport,
            ApiError::InvalidResponse(_) => ErrorKind::Deserialization,
        }
    }
}
