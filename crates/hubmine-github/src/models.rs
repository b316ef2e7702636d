//! Response payloads of the REST endpoints hubmine reads.
//!
//! Only the fields the collector uses are modelled; everything else in the
//! payload is ignored by serde.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full user profile (`GET /users/{login}`).
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub hireable: Option<bool>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub public_gists: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Abbreviated account as embedded in other payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Login
    pub login: String,
    /// Profile URL
    #[serde(default)]
    pub html_url: Option<String>,
    /// `User`, `Organization` or `Bot`
    #[serde(rename = "type", default)]
    pub account_type: String,
}

impl Account {
    /// Whether this is a human account rather than an org or bot.
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.account_type == "User"
    }
}

/// Repository as returned by the listing endpoints.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: Account,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Size in kilobytes
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub license: Option<License>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

impl Repository {
    /// Whether the repository is owned by `login` (case-insensitive).
    #[must_use]
    pub fn is_owned_by(&self, login: &str) -> bool {
        self.owner.login.eq_ignore_ascii_case(login)
    }
}

/// Repository license.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub spdx_id: Option<String>,
}

/// Commit as returned by the commit listing and detail endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit SHA
    pub sha: String,
    /// Git-level commit data
    pub commit: GitCommit,
    /// Linked account of the author, absent when the email is unlinked
    #[serde(default)]
    pub author: Option<Account>,
    /// Line counts; only present on the detail endpoint
    #[serde(default)]
    pub stats: Option<CommitStats>,
}

impl Commit {
    /// Login of the linked author account.
    #[must_use]
    pub fn author_login(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.login.as_str())
    }

    /// Whether the linked author account is `login` (case-insensitive).
    #[must_use]
    pub fn is_authored_by(&self, login: &str) -> bool {
        self.author_login()
            .is_some_and(|author| author.eq_ignore_ascii_case(login))
    }

    /// Author date, falling back to the committer date.
    #[must_use]
    pub fn authored_at(&self) -> Option<DateTime<Utc>> {
        self.commit
            .author
            .as_ref()
            .and_then(|sig| sig.date)
            .or_else(|| self.commit.committer.as_ref().and_then(|sig| sig.date))
    }
}

/// Git-level commit data.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitCommit {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: Option<Signature>,
    #[serde(default)]
    pub committer: Option<Signature>,
}

/// Git author or committer signature.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Line counts of a commit.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStats {
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub total: u64,
}

/// Gist summary.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gist {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Organization summary.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub login: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Public event.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type", default)]
    pub event_type: String,
    pub repo: EventRepo,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Repository reference inside an event.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRepo {
    pub name: String,
}

/// Pull request. The counters are only populated by the detail endpoint.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub user: Option<Account>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub merged: Option<bool>,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changed_files: u64,
}

impl PullRequest {
    /// Whether the pull request was merged.
    #[must_use]
    pub fn is_merged(&self) -> bool {
        self.merged.unwrap_or(false) || self.merged_at.is_some()
    }

    /// Whether the pull request was opened by `login` (case-insensitive).
    #[must_use]
    pub fn is_opened_by(&self, login: &str) -> bool {
        self.user
            .as_ref()
            .is_some_and(|u| u.login.eq_ignore_ascii_case(login))
    }
}

/// Issue. The issues endpoint also returns pull requests.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub user: Option<Account>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    /// Whether this entry is a pull request in disguise.
    #[must_use]
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// Whether the issue is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == "closed"
    }
}

/// Issue label.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Entry of a repository directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// File name
    pub name: String,
    /// Path from the repository root
    pub path: String,
    /// `file`, `dir`, `symlink` or `submodule`
    #[serde(rename = "type", default)]
    pub entry_type: String,
}

/// Repository contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    /// Login
    pub login: String,
    /// `User`, `Organization` or `Bot`
    #[serde(rename = "type", default)]
    pub account_type: String,
    /// Number of commits
    #[serde(default)]
    pub contributions: u64,
}

impl Contributor {
    /// Whether this is a human account.
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.account_type == "User"
    }
}
