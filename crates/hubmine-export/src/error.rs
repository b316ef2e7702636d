//! Export error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while persisting records.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Reading or writing an export file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A record could not be encoded as JSON
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    /// Writing a feature row failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The JSON file no longer ends in a recoverable array
    #[error("{} is not an appendable JSON array: {reason}", path.display())]
    Corrupt {
        /// Offending file
        path: PathBuf,
        /// What was found instead
        reason: String,
    },

    /// Nothing to convert
    #[error("no records found in {}", path.display())]
    EmptyDataset {
        /// Source file
        path: PathBuf,
    },

    /// The blocking write task did not complete
    #[error("sink task failed: {0}")]
    Task(String),
}

impl SinkError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn corrupt(path: &Path, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using `SinkError`.
pub type Result<T> = std::result::Result<T, SinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SinkError::corrupt(Path::new("t_raw.json"), "ends with 'x'");
        assert_eq!(
            err.to_string(),
            "t_raw.json is not an appendable JSON array: ends with 'x'"
        );

        let err = SinkError::EmptyDataset {
            path: PathBuf::from("empty.json"),
        };
        assert_eq!(err.to_string(), "no records found in empty.json");
    }

    #[test]
    fn test_io_error_keeps_path() {
        let err = SinkError::io(Path::new("out.csv"))(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(err.to_string().starts_with("I/O error on out.csv"));
    }
}
