//! The remote API trait the collection pipeline is written against.

use crate::error::Result;
use crate::models::{
    Account, Commit, ContentEntry, Contributor, Event, Gist, Issue, Organization, PullRequest,
    Repository, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Read-only access to the GitHub REST API.
///
/// Repositories are addressed by `full_name` (`owner/name`). Every listing
/// takes an optional item limit; `None` walks all pages.
///
/// Implementations must be thread-safe (Send + Sync); one instance is shared
/// by every worker of a collection run.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Fetch a user profile.
    async fn get_user(&self, login: &str) -> Result<User>;

    /// List repositories owned by a user, in the API's default order.
    async fn list_user_repos(&self, login: &str, limit: Option<usize>) -> Result<Vec<Repository>>;

    /// List commits of a repository, newest first.
    async fn list_commits(&self, full_name: &str, query: &CommitQuery) -> Result<Vec<Commit>>;

    /// Fetch a single commit including its line stats.
    async fn get_commit(&self, full_name: &str, sha: &str) -> Result<Commit>;

    /// Repositories starred by a user.
    async fn list_starred(&self, login: &str, limit: Option<usize>) -> Result<Vec<Repository>>;

    /// Repositories watched by a user.
    async fn list_subscriptions(&self, login: &str, limit: Option<usize>)
        -> Result<Vec<Repository>>;

    /// Public gists of a user.
    async fn list_gists(&self, login: &str, limit: Option<usize>) -> Result<Vec<Gist>>;

    /// Public organization memberships of a user.
    async fn list_orgs(&self, login: &str) -> Result<Vec<Organization>>;

    /// Public events performed by a user.
    async fn list_events(&self, login: &str, limit: Option<usize>) -> Result<Vec<Event>>;

    /// Followers of a user.
    async fn list_followers(&self, login: &str, limit: Option<usize>) -> Result<Vec<Account>>;

    /// Accounts a user follows.
    async fn list_following(&self, login: &str, limit: Option<usize>) -> Result<Vec<Account>>;

    /// Bytes of code per language.
    async fn repo_languages(&self, full_name: &str) -> Result<BTreeMap<String, u64>>;

    /// Raw README text.
    async fn get_readme(&self, full_name: &str) -> Result<String>;

    /// Pull requests in any state, newest first.
    async fn list_pulls(&self, full_name: &str, limit: Option<usize>) -> Result<Vec<PullRequest>>;

    /// A single pull request with its counters populated.
    async fn get_pull(&self, full_name: &str, number: u64) -> Result<PullRequest>;

    /// Issues (and pull requests) in any state created by `creator`.
    async fn list_issues(
        &self,
        full_name: &str,
        creator: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Issue>>;

    /// Entries of the repository root directory.
    async fn list_root_contents(&self, full_name: &str) -> Result<Vec<ContentEntry>>;

    /// Contributors of a repository, most active first.
    async fn list_contributors(
        &self,
        full_name: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Contributor>>;
}

/// Filters for [`GitHubApi::list_commits`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitQuery {
    /// Only commits whose author matches this login
    pub author: Option<String>,
    /// Only commits after this instant
    pub since: Option<DateTime<Utc>>,
    /// Stop after this many commits
    pub limit: Option<usize>,
}

impl CommitQuery {
    /// No filters, every page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to an author login.
    #[must_use]
    pub fn by_author(mut self, login: impl Into<String>) -> Self {
        self.author = Some(login.into());
        self
    }

    /// Restrict to commits after `since`.
    #[must_use]
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Cap the number of commits returned.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
