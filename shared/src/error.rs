//! Error types for the Sentiment Compass backend.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while classifying and aggregating signals.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network failure, timeout, or a transient status from the classifier
    #[error("Classifier unavailable: {0}")]
    Transport(String),

    /// Classifier rejected the request
    #[error("Classifier returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// Classifier reply was not JSON matching the response schema
    #[error("Malformed classifier response: {0}")]
    MalformedResponse(String),

    /// Classifier returned a different number of results than signals sent
    #[error("Classifier returned {actual} results for {expected} signals")]
    BatchMismatch { expected: usize, actual: usize },

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Transport(_) => 503,
            Error::Remote { .. } | Error::MalformedResponse(_) | Error::BatchMismatch { .. } => 502,
            _ => 500,
        }
    }

    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_is_retryable() {
        assert!(Error::Transport("timed out".to_string()).is_retryable());
        assert!(!Error::MalformedResponse("not json".to_string()).is_retryable());
        assert!(!Error::BatchMismatch { expected: 3, actual: 2 }.is_retryable());
        assert!(!Error::Remote { status: 400, message: "bad key".to_string() }.is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Validation("empty".to_string()).status_code(), 400);
        assert_eq!(Error::Transport("reset".to_string()).status_code(), 503);
        assert_eq!(Error::BatchMismatch { expected: 1, actual: 0 }.status_code(), 502);
        assert_eq!(Error::Config("missing".to_string()).status_code(), 500);
    }
}
