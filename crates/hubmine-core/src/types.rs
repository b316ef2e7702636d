//! Shared types used across hubmine.

use crate::error::HubmineError;
use chrono::Duration;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Default trailing window for commit analysis, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 90;

/// Newtype for the login of a mined entity.
///
/// Logins are 1-39 characters, ASCII alphanumeric or hyphens, and may not
/// start or end with a hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    /// Create a new `EntityId` from a string.
    ///
    /// Surrounding whitespace is trimmed before validation.
    ///
    /// # Errors
    /// Returns error if the login doesn't match the required format.
    pub fn new(id: impl Into<String>) -> Result<Self, HubmineError> {
        let id = id.into();
        let id = id.trim().to_string();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), HubmineError> {
        static LOGIN_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = LOGIN_REGEX.get_or_init(|| {
            Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,37}[A-Za-z0-9])?$").expect("valid regex")
        });

        if id.is_empty() {
            return Err(HubmineError::Validation(
                "invalid entity ID: must not be empty".to_string(),
            ));
        }

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(HubmineError::Validation(format!(
                "invalid entity ID: expected a login of up to 39 alphanumerics or hyphens, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How much commit history the activity resolver walks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FetchMode {
    /// Only commits inside the trailing window.
    #[default]
    #[serde(rename = "recent")]
    Windowed,
    /// Every commit by the entity, with window stats kept for comparison.
    #[serde(rename = "all")]
    Unbounded,
}

impl FetchMode {
    /// Human readable label used in progress messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Windowed => "recent commits",
            Self::Unbounded => "all commits",
        }
    }

    /// Wire value stored in exported records.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windowed => "recent",
            Self::Unbounded => "all",
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable per-run collection settings handed to every collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMode {
    /// Count every commit instead of only the trailing window.
    pub fetch_all_commits: bool,
    /// Length of the trailing window, in days.
    pub window_days: u32,
}

impl CollectionMode {
    /// Windowed collection over the default 90 day window.
    #[must_use]
    pub fn recent() -> Self {
        Self {
            fetch_all_commits: false,
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    /// Unbounded collection; the window still drives distribution stats.
    #[must_use]
    pub fn all_commits() -> Self {
        Self {
            fetch_all_commits: true,
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    /// Override the window length.
    #[must_use]
    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    /// The fetch mode implied by the flags.
    #[must_use]
    pub fn fetch_mode(&self) -> FetchMode {
        if self.fetch_all_commits {
            FetchMode::Unbounded
        } else {
            FetchMode::Windowed
        }
    }

    /// The window as a chrono duration.
    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::days(i64::from(self.window_days))
    }
}

impl Default for CollectionMode {
    fn default() -> Self {
        Self::recent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_valid() {
        assert!(EntityId::new("octocat").is_ok());
        assert!(EntityId::new("a").is_ok());
        assert!(EntityId::new("some-user-42").is_ok());
        assert_eq!(EntityId::new("  alice \n").unwrap().as_str(), "alice");
    }

    #[test]
    fn test_entity_id_invalid() {
        assert!(EntityId::new("").is_err());
        assert!(EntityId::new("-leading").is_err());
        assert!(EntityId::new("trailing-").is_err());
        assert!(EntityId::new("has space").is_err());
        assert!(EntityId::new("owner/repo").is_err());
        assert!(EntityId::new("x".repeat(40)).is_err());
    }

    #[test]
    fn test_fetch_mode_serialization() {
        assert_eq!(
            serde_json::to_string(&FetchMode::Windowed).unwrap(),
            "\"recent\""
        );
        assert_eq!(
            serde_json::to_string(&FetchMode::Unbounded).unwrap(),
            "\"all\""
        );
        let parsed: FetchMode = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(parsed, FetchMode::Unbounded);
    }

    #[test]
    fn test_collection_mode() {
        let mode = CollectionMode::recent();
        assert_eq!(mode.fetch_mode(), FetchMode::Windowed);
        assert_eq!(mode.window(), Duration::days(90));

        let mode = CollectionMode::all_commits().with_window_days(7);
        assert_eq!(mode.fetch_mode(), FetchMode::Unbounded);
        assert_eq!(mode.window_days, 7);
        assert_eq!(mode.fetch_mode().label(), "all commits");
    }
}
