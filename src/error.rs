//! Error handling module for the blueprint composer
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Library code returns these; the binary wraps them in `anyhow` at the edges.

use thiserror::Error;

/// Main error type for the blueprint composer
#[derive(Error, Debug)]
pub enum ComposerError {
    /// Validation errors (draft fields, user input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The organization id has not been resolved yet, so nothing may be submitted
    #[error("Organization id is not available; the blueprint cannot be submitted")]
    MissingOrganization,

    /// The organization id could not be used in a subscription request
    #[error("Invalid organization id: {0}")]
    InvalidOrganization(String),

    /// Manual repository edits attempted while a content template owns the list
    #[error("Repositories are managed by content template {0} and cannot be edited")]
    TemplateReadOnly(String),

    /// Transport-level HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General errors (catch-all for edge cases)
    #[error("{0}")]
    General(String),
}

/// Result type alias for composer operations
pub type Result<T> = std::result::Result<T, ComposerError>;

// Convenient error constructors
impl ComposerError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an API status error
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Create a general error
    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ComposerError::validation("blueprint name is empty");
        assert_eq!(err.to_string(), "Validation error: blueprint name is empty");

        let err = ComposerError::api(422, "bad distribution");
        assert_eq!(
            err.to_string(),
            "API request failed with status 422: bad distribution"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ComposerError = json_err.into();
        assert!(matches!(err, ComposerError::Json(_)));
    }
}
