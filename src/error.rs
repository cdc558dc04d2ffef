//! Error types for Jira resource operations.

use thiserror::Error;

/// Errors that can occur while loading or mutating Jira resources.
#[derive(Debug, Error)]
pub enum JiraError {
    /// Configuration is missing or incomplete.
    #[error("Jira configuration required: {0}")]
    ConfigMissing(String),

    /// The id supplied to `find` does not fill the resource's path template.
    #[error("Invalid id for path template '{template}': {reason}")]
    InvalidId { template: String, reason: String },

    /// HTTP transport error. Never retried.
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body was not empty but could not be parsed as JSON.
    #[error("Failed to decode response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// The server rejected the request with HTTP 400 and a list of messages.
    #[error("Validation failed: {}", messages.join("; "))]
    Validation { messages: Vec<String> },

    /// The server answered with any other non-success status.
    #[error("Jira API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Attribute absent from a loaded payload.
    #[error("{kind} has no attribute '{name}'")]
    AttributeMissing { kind: String, name: String },

    /// Attribute access before any payload was loaded.
    #[error("{kind} has not been loaded yet")]
    NotLoaded { kind: &'static str },

    /// Identity comparison where one side has no `id`.
    #[error("Cannot compare {kind} resources without an id")]
    IdentityUnavailable { kind: &'static str },

    /// A kind-specific operation was called with unusable arguments.
    #[error("{kind} does not support this operation: {reason}")]
    UnsupportedOperation { kind: &'static str, reason: String },

    /// JSON serialization error.
    #[error("Failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

impl JiraError {
    /// Returns the server's validation messages when this is a validation error.
    pub fn validation_messages(&self) -> Option<&[String]> {
        match self {
            Self::Validation { messages } => Some(messages),
            _ => None,
        }
    }
}

/// Result type alias for Jira operations.
pub type Result<T> = core::result::Result<T, JiraError>;
