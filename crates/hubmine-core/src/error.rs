//! Core error types for hubmine.
//!
//! `ConfigError` is the only error class that is allowed to reach the caller
//! of a collection run; everything else degrades locally.

use thiserror::Error;

/// Errors raised by the shared hubmine types.
#[derive(Error, Debug)]
pub enum HubmineError {
    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Immediate saving was requested without a destination
    #[error("a destination basename is required when immediate saving is enabled")]
    MissingSinkBasename,

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `HubmineError`.
pub type Result<T> = std::result::Result<T, HubmineError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HubmineError::Validation("bad login".to_string());
        assert_eq!(err.to_string(), "validation error: bad login");

        let err = ConfigError::MissingSinkBasename;
        assert_eq!(
            err.to_string(),
            "a destination basename is required when immediate saving is enabled"
        );
    }

    #[test]
    fn test_config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: ConfigError = io_err.into();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
