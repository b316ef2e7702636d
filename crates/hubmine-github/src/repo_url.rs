//! Repository URL parsing.

use hubmine_core::ConfigError;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// An `owner/name` repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    /// Owning account login
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoRef {
    /// The `owner/name` form used in API paths.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Extract owner and name from a repository URL.
///
/// Accepts `https://github.com/<owner>/<repo>`, with or without a `.git`
/// suffix, trailing path segments, or the `git@github.com:` SSH form.
///
/// # Errors
/// Returns `ConfigError::InvalidValue` if the URL is empty or not a
/// recognisable repository URL.
pub fn parse_repo_url(url: &str) -> Result<RepoRef, ConfigError> {
    static REPO_URL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = REPO_URL_REGEX.get_or_init(|| {
        Regex::new(r"github\.com[/:]([A-Za-z0-9._-]+)/([A-Za-z0-9._-]+)").expect("valid regex")
    });

    let url = url.trim();
    if url.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "repo_url".to_string(),
            reason: "repository URL cannot be empty".to_string(),
        });
    }

    let captures = regex.captures(url).ok_or_else(|| ConfigError::InvalidValue {
        field: "repo_url".to_string(),
        reason: format!("not a GitHub repository URL: '{url}'"),
    })?;

    let owner = captures[1].to_string();
    let name = captures[2].trim_end_matches(".git").to_string();
    if name.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "repo_url".to_string(),
            reason: format!("missing repository name in '{url}'"),
        });
    }

    Ok(RepoRef { owner, name })
}
