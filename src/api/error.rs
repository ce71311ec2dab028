//! Error types for remote API operations.

/// Error raised by [`crate::api::ApiClient`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be sent or no response was received.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {body}")]
    Server {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The requested job no longer exists server-side.
    #[error("Job not found: {0}")]
    NotFound(String),

    /// A client-side precondition was violated before any request was made.
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl ApiError {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(id: S) -> Self {
        Self::NotFound(id.into())
    }

    /// Create a new Validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
