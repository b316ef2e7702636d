//! Errors that reach the caller of a mining run.

use hubmine_core::ConfigError;
use hubmine_github::ApiError;
use thiserror::Error;

/// Run-level failures. Everything below the run degrades locally.
#[derive(Error, Debug)]
pub enum MinerError {
    /// Invalid run options or configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A run-level upstream lookup failed
    #[error("upstream error: {0}")]
    Upstream(#[from] ApiError),
}

/// Result type alias using `MinerError`.
pub type Result<T> = std::result::Result<T, MinerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MinerError::from(ConfigError::MissingSinkBasename);
        assert_eq!(
            err.to_string(),
            "configuration error: a destination basename is required when immediate saving is enabled"
        );

        let err = MinerError::from(ApiError::NotFound {
            resource: "/repos/a/b/contributors".to_string(),
        });
        assert!(err.to_string().starts_with("upstream error: "));
    }
}
