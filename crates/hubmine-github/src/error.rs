//! Error types for remote API calls.

use thiserror::Error;

/// Errors that can occur while talking to the GitHub REST API.
///
/// Callers in the collection pipeline never let these escape an entity:
/// they either trigger strategy escalation or degrade a section.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The requested resource does not exist (or is hidden from the token)
    #[error("not found: {resource}")]
    NotFound {
        /// Request path
        resource: String,
    },

    /// Non-success HTTP status
    #[error("API error: status {status}, {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Rate limit exhausted
    #[error("rate limit exceeded: {message}")]
    RateLimited {
        /// Response body or reason
        message: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response parsing error
    #[error("failed to parse response from {resource}: {message}")]
    Parse {
        /// Request path
        resource: String,
        /// Error message
        message: String,
    },

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Whether the error is a rate limit rejection.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Result type alias for remote API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound {
            resource: "/users/ghost".to_string(),
        };
        assert_eq!(err.to_string(), "not found: /users/ghost");

        let err = ApiError::Status {
            status: 409,
            message: "Git Repository is empty.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error: status 409, Git Repository is empty."
        );
    }

    #[test]
    fn test_rate_limited() {
        let err = ApiError::RateLimited {
            message: "API rate limit exceeded".to_string(),
        };
        assert!(err.is_rate_limited());
        assert!(!ApiError::Internal("x".to_string()).is_rate_limited());
    }
}
