//! In-memory [`GitHubApi`] double for tests.
//!
//! Data is registered up front with builder methods; failures can be
//! injected per endpoint or per commit query shape. Every call is recorded
//! so tests can assert which queries were (and were not) attempted.

use crate::api::{CommitQuery, GitHubApi};
use crate::error::{ApiError, Result};
use crate::models::{
    Account, Commit, CommitStats, ContentEntry, Contributor, Event, Gist, GitCommit, Issue,
    Organization, PullRequest, Repository, Signature, User,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

type CallHook = Box<dyn Fn(&str) + Send + Sync>;

/// Which filters a commit query carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryShape {
    /// Author and since
    AuthorSince,
    /// Since only
    SinceOnly,
    /// Author only
    AuthorOnly,
    /// Neither
    Unfiltered,
}

impl QueryShape {
    /// Classify a query.
    #[must_use]
    pub fn of(query: &CommitQuery) -> Self {
        match (query.author.is_some(), query.since.is_some()) {
            (true, true) => Self::AuthorSince,
            (false, true) => Self::SinceOnly,
            (true, false) => Self::AuthorOnly,
            (false, false) => Self::Unfiltered,
        }
    }
}

/// In-memory GitHub.
#[derive(Default)]
pub struct FakeGitHub {
    users: HashMap<String, User>,
    repos: HashMap<String, Vec<Repository>>,
    commits: HashMap<String, Vec<Commit>>,
    commit_stats: HashMap<(String, String), CommitStats>,
    starred: HashMap<String, Vec<Repository>>,
    subscriptions: HashMap<String, Vec<Repository>>,
    gists: HashMap<String, Vec<Gist>>,
    orgs: HashMap<String, Vec<Organization>>,
    events: HashMap<String, Vec<Event>>,
    followers: HashMap<String, Vec<Account>>,
    following: HashMap<String, Vec<Account>>,
    languages: HashMap<String, BTreeMap<String, u64>>,
    readmes: HashMap<String, String>,
    pulls: HashMap<String, Vec<PullRequest>>,
    issues: HashMap<String, Vec<Issue>>,
    contents: HashMap<String, Vec<ContentEntry>>,
    contributors: HashMap<String, Vec<Contributor>>,
    failing_endpoints: HashSet<String>,
    failing_users: HashSet<String>,
    failing_commit_queries: HashSet<(String, QueryShape)>,
    on_call: Option<CallHook>,
    user_latency: Option<Duration>,
    users_in_flight: AtomicUsize,
    peak_users_in_flight: AtomicUsize,
    calls: Mutex<Vec<String>>,
    commit_queries: Mutex<Vec<(String, CommitQuery)>>,
}

impl FakeGitHub {
    /// An empty fake: every user is unknown, every listing empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user profile.
    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.users.insert(user.login.to_lowercase(), user);
        self
    }

    /// Register the repositories listed for `login`.
    #[must_use]
    pub fn with_repos(mut self, login: &str, repos: Vec<Repository>) -> Self {
        self.repos.insert(login.to_lowercase(), repos);
        self
    }

    /// Register the commit history of a repository (any order).
    #[must_use]
    pub fn with_commits(mut self, full_name: &str, commits: Vec<Commit>) -> Self {
        self.commits.insert(full_name.to_string(), commits);
        self
    }

    /// Line stats returned by the commit detail endpoint.
    #[must_use]
    pub fn with_commit_stats(mut self, full_name: &str, sha: &str, stats: CommitStats) -> Self {
        self.commit_stats
            .insert((full_name.to_string(), sha.to_string()), stats);
        self
    }

    /// Starred repositories of `login`.
    #[must_use]
    pub fn with_starred(mut self, login: &str, repos: Vec<Repository>) -> Self {
        self.starred.insert(login.to_lowercase(), repos);
        self
    }

    /// Watched repositories of `login`.
    #[must_use]
    pub fn with_subscriptions(mut self, login: &str, repos: Vec<Repository>) -> Self {
        self.subscriptions.insert(login.to_lowercase(), repos);
        self
    }

    /// Gists of `login`.
    #[must_use]
    pub fn with_gists(mut self, login: &str, gists: Vec<Gist>) -> Self {
        self.gists.insert(login.to_lowercase(), gists);
        self
    }

    /// Organizations of `login`.
    #[must_use]
    pub fn with_orgs(mut self, login: &str, orgs: Vec<Organization>) -> Self {
        self.orgs.insert(login.to_lowercase(), orgs);
        self
    }

    /// Public events of `login`.
    #[must_use]
    pub fn with_events(mut self, login: &str, events: Vec<Event>) -> Self {
        self.events.insert(login.to_lowercase(), events);
        self
    }

    /// Followers of `login`.
    #[must_use]
    pub fn with_followers(mut self, login: &str, followers: Vec<Account>) -> Self {
        self.followers.insert(login.to_lowercase(), followers);
        self
    }

    /// Accounts `login` follows.
    #[must_use]
    pub fn with_following(mut self, login: &str, following: Vec<Account>) -> Self {
        self.following.insert(login.to_lowercase(), following);
        self
    }

    /// Language bytes of a repository.
    #[must_use]
    pub fn with_languages(mut self, full_name: &str, languages: &[(&str, u64)]) -> Self {
        self.languages.insert(
            full_name.to_string(),
            languages
                .iter()
                .map(|(lang, bytes)| ((*lang).to_string(), *bytes))
                .collect(),
        );
        self
    }

    /// README text of a repository.
    #[must_use]
    pub fn with_readme(mut self, full_name: &str, readme: impl Into<String>) -> Self {
        self.readmes.insert(full_name.to_string(), readme.into());
        self
    }

    /// Pull requests of a repository, with counters populated.
    #[must_use]
    pub fn with_pulls(mut self, full_name: &str, pulls: Vec<PullRequest>) -> Self {
        self.pulls.insert(full_name.to_string(), pulls);
        self
    }

    /// Issues of a repository.
    #[must_use]
    pub fn with_issues(mut self, full_name: &str, issues: Vec<Issue>) -> Self {
        self.issues.insert(full_name.to_string(), issues);
        self
    }

    /// Root directory entries of a repository.
    #[must_use]
    pub fn with_root_contents(mut self, full_name: &str, names: &[&str]) -> Self {
        self.contents.insert(
            full_name.to_string(),
            names
                .iter()
                .map(|name| ContentEntry {
                    name: (*name).to_string(),
                    path: (*name).to_string(),
                    entry_type: if name.contains('.') { "file" } else { "dir" }.to_string(),
                })
                .collect(),
        );
        self
    }

    /// Contributors of a repository.
    #[must_use]
    pub fn with_contributors(mut self, full_name: &str, contributors: Vec<Contributor>) -> Self {
        self.contributors.insert(full_name.to_string(), contributors);
        self
    }

    /// Make every call to `endpoint` (a trait method name) fail.
    #[must_use]
    pub fn failing(mut self, endpoint: &str) -> Self {
        self.failing_endpoints.insert(endpoint.to_string());
        self
    }

    /// Make every call about `login` fail, the profile lookup included.
    #[must_use]
    pub fn failing_user(mut self, login: &str) -> Self {
        self.failing_users.insert(login.to_lowercase());
        self
    }

    /// Make commit queries of `shape` against `full_name` fail.
    #[must_use]
    pub fn failing_commit_query(mut self, full_name: &str, shape: QueryShape) -> Self {
        self.failing_commit_queries
            .insert((full_name.to_string(), shape));
        self
    }

    /// Run `hook` with the endpoint name at the start of every call.
    #[must_use]
    pub fn on_call(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_call = Some(Box::new(hook));
        self
    }

    /// Hold every profile fetch open for `delay`, tracking how many overlap.
    #[must_use]
    pub fn with_user_latency(mut self, delay: Duration) -> Self {
        self.user_latency = Some(delay);
        self
    }

    /// Most profile fetches that were in progress at the same time.
    #[must_use]
    pub fn peak_users_in_flight(&self) -> usize {
        self.peak_users_in_flight.load(Ordering::SeqCst)
    }

    /// Endpoint names of every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of calls made to `endpoint`.
    #[must_use]
    pub fn call_count(&self, endpoint: &str) -> usize {
        self.calls().iter().filter(|c| *c == endpoint).count()
    }

    /// Every commit query made so far, in order.
    #[must_use]
    pub fn commit_queries(&self) -> Vec<(String, CommitQuery)> {
        self.commit_queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    fn record(&self, endpoint: &str, subject: &str) -> Result<()> {
        if let Some(hook) = &self.on_call {
            hook(endpoint);
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(endpoint.to_string());
        }

        let owner = subject.split('/').next().unwrap_or(subject).to_lowercase();
        if self.failing_endpoints.contains(endpoint) || self.failing_users.contains(&owner) {
            return Err(ApiError::Status {
                status: 500,
                message: format!("injected failure for {endpoint}({subject})"),
            });
        }
        Ok(())
    }
}

fn limited<T: Clone>(items: Option<&Vec<T>>, limit: Option<usize>) -> Vec<T> {
    let items = items.map(Vec::as_slice).unwrap_or_default();
    let take = limit.unwrap_or(items.len()).min(items.len());
    items[..take].to_vec()
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn get_user(&self, login: &str) -> Result<User> {
        self.record("get_user", login)?;
        if let Some(delay) = self.user_latency {
            let now = self.users_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_users_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.users_in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        self.users
            .get(&login.to_lowercase())
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("/users/{login}"),
            })
    }

    async fn list_user_repos(&self, login: &str, limit: Option<usize>) -> Result<Vec<Repository>> {
        self.record("list_user_repos", login)?;
        Ok(limited(self.repos.get(&login.to_lowercase()), limit))
    }

    async fn list_commits(&self, full_name: &str, query: &CommitQuery) -> Result<Vec<Commit>> {
        if let Ok(mut queries) = self.commit_queries.lock() {
            queries.push((full_name.to_string(), query.clone()));
        }
        self.record("list_commits", full_name)?;

        let shape = QueryShape::of(query);
        if self
            .failing_commit_queries
            .contains(&(full_name.to_string(), shape))
        {
            return Err(ApiError::Status {
                status: 502,
                message: format!("injected {shape:?} failure for {full_name}"),
            });
        }

        let mut matching: Vec<Commit> = self
            .commits
            .get(full_name)
            .map(|commits| {
                commits
                    .iter()
                    .filter(|c| {
                        query
                            .author
                            .as_deref()
                            .map_or(true, |author| c.is_authored_by(author))
                    })
                    .filter(|c| {
                        query
                            .since
                            .map_or(true, |since| c.authored_at().is_some_and(|d| d >= since))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        matching.sort_by(|a, b| b.authored_at().cmp(&a.authored_at()));
        if let Some(limit) = query.limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }

    async fn get_commit(&self, full_name: &str, sha: &str) -> Result<Commit> {
        self.record("get_commit", full_name)?;
        let mut commit = self
            .commits
            .get(full_name)
            .and_then(|commits| commits.iter().find(|c| c.sha == sha))
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("/repos/{full_name}/commits/{sha}"),
            })?;
        if commit.stats.is_none() {
            commit.stats = Some(
                self.commit_stats
                    .get(&(full_name.to_string(), sha.to_string()))
                    .copied()
                    .unwrap_or_default(),
            );
        }
        Ok(commit)
    }

    async fn list_starred(&self, login: &str, limit: Option<usize>) -> Result<Vec<Repository>> {
        self.record("list_starred", login)?;
        Ok(limited(self.starred.get(&login.to_lowercase()), limit))
    }

    async fn list_subscriptions(
        &self,
        login: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Repository>> {
        self.record("list_subscriptions", login)?;
        Ok(limited(self.subscriptions.get(&login.to_lowercase()), limit))
    }

    async fn list_gists(&self, login: &str, limit: Option<usize>) -> Result<Vec<Gist>> {
        self.record("list_gists", login)?;
        Ok(limited(self.gists.get(&login.to_lowercase()), limit))
    }

    async fn list_orgs(&self, login: &str) -> Result<Vec<Organization>> {
        self.record("list_orgs", login)?;
        Ok(limited(self.orgs.get(&login.to_lowercase()), None))
    }

    async fn list_events(&self, login: &str, limit: Option<usize>) -> Result<Vec<Event>> {
        self.record("list_events", login)?;
        Ok(limited(self.events.get(&login.to_lowercase()), limit))
    }

    async fn list_followers(&self, login: &str, limit: Option<usize>) -> Result<Vec<Account>> {
        self.record("list_followers", login)?;
        Ok(limited(self.followers.get(&login.to_lowercase()), limit))
    }

    async fn list_following(&self, login: &str, limit: Option<usize>) -> Result<Vec<Account>> {
        self.record("list_following", login)?;
        Ok(limited(self.following.get(&login.to_lowercase()), limit))
    }

    async fn repo_languages(&self, full_name: &str) -> Result<BTreeMap<String, u64>> {
        self.record("repo_languages", full_name)?;
        Ok(self.languages.get(full_name).cloned().unwrap_or_default())
    }

    async fn get_readme(&self, full_name: &str) -> Result<String> {
        self.record("get_readme", full_name)?;
        self.readmes
            .get(full_name)
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("/repos/{full_name}/readme"),
            })
    }

    async fn list_pulls(&self, full_name: &str, limit: Option<usize>) -> Result<Vec<PullRequest>> {
        self.record("list_pulls", full_name)?;
        Ok(limited(self.pulls.get(full_name), limit))
    }

    async fn get_pull(&self, full_name: &str, number: u64) -> Result<PullRequest> {
        self.record("get_pull", full_name)?;
        self.pulls
            .get(full_name)
            .and_then(|pulls| pulls.iter().find(|p| p.number == number))
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("/repos/{full_name}/pulls/{number}"),
            })
    }

    async fn list_issues(
        &self,
        full_name: &str,
        creator: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Issue>> {
        self.record("list_issues", full_name)?;
        let created: Vec<Issue> = self
            .issues
            .get(full_name)
            .map(|issues| {
                issues
                    .iter()
                    .filter(|i| {
                        i.user
                            .as_ref()
                            .is_some_and(|u| u.login.eq_ignore_ascii_case(creator))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(limited(Some(&created), limit))
    }

    async fn list_root_contents(&self, full_name: &str) -> Result<Vec<ContentEntry>> {
        self.record("list_root_contents", full_name)?;
        Ok(limited(self.contents.get(full_name), None))
    }

    async fn list_contributors(
        &self,
        full_name: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Contributor>> {
        self.record("list_contributors", full_name)?;
        Ok(limited(self.contributors.get(full_name), limit))
    }
}

/// A user profile created on 2020-01-01 with the given counters.
#[must_use]
pub fn user(login: &str, followers: u64, following: u64, public_repos: u64) -> User {
    let created = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single().unwrap_or_default();
    User {
        login: login.to_string(),
        name: None,
        email: None,
        location: None,
        bio: None,
        company: None,
        blog: None,
        twitter_username: None,
        hireable: None,
        avatar_url: None,
        public_repos,
        public_gists: 0,
        followers,
        following,
        created_at: created,
        updated_at: created,
    }
}

/// An abbreviated `User` account.
#[must_use]
pub fn account(login: &str) -> Account {
    Account {
        login: login.to_string(),
        html_url: Some(format!("https://github.com/{login}")),
        account_type: "User".to_string(),
    }
}

/// A non-fork repository owned by `owner`, created on 2021-01-01.
#[must_use]
pub fn repo(owner: &str, name: &str) -> Repository {
    let created = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).single().unwrap_or_default();
    Repository {
        name: name.to_string(),
        full_name: format!("{owner}/{name}"),
        owner: account(owner),
        fork: false,
        description: None,
        language: None,
        size: 0,
        stargazers_count: 0,
        forks_count: 0,
        watchers_count: 0,
        license: None,
        topics: Vec::new(),
        created_at: created,
        updated_at: Some(created),
        pushed_at: Some(created),
    }
}

/// A forked repository owned by `owner`.
#[must_use]
pub fn forked_repo(owner: &str, name: &str) -> Repository {
    Repository {
        fork: true,
        ..repo(owner, name)
    }
}

/// A commit as the listing endpoint returns it (no stats).
#[must_use]
pub fn commit(sha: &str, author: Option<&str>, date: DateTime<Utc>, message: &str) -> Commit {
    Commit {
        sha: sha.to_string(),
        commit: GitCommit {
            message: message.to_string(),
            author: Some(Signature {
                name: author.map(str::to_string),
                email: None,
                date: Some(date),
            }),
            committer: None,
        },
        author: author.map(account),
        stats: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()
    }

    fn fake() -> FakeGitHub {
        FakeGitHub::new()
            .with_user(user("Alice", 1, 2, 3))
            .with_commits(
                "alice/a",
                vec![
                    commit("c1", Some("alice"), at(1), "one"),
                    commit("c2", Some("bob"), at(2), "two"),
                    commit("c3", Some("ALICE"), at(3), "three"),
                ],
            )
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let api = fake();
        assert!(api.get_user("alice").await.is_ok());
        assert!(matches!(
            api.get_user("ghost").await,
            Err(ApiError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_commit_filters() {
        let api = fake();
        let commits = api
            .list_commits("alice/a", &CommitQuery::new().by_author("alice"))
            .await
            .expect("list");
        let shas: Vec<_> = commits.iter().map(|c| c.sha.as_str()).collect();
        assert_eq!(shas, ["c3", "c1"]);

        let commits = api
            .list_commits("alice/a", &CommitQuery::new().since(at(2)).with_limit(1))
            .await
            .expect("list");
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].sha, "c3");
    }

    #[tokio::test]
    async fn test_injected_commit_failure() {
        let api = fake().failing_commit_query("alice/a", QueryShape::AuthorOnly);
        assert!(api
            .list_commits("alice/a", &CommitQuery::new().by_author("alice"))
            .await
            .is_err());
        assert!(api.list_commits("alice/a", &CommitQuery::new()).await.is_ok());
        assert_eq!(api.commit_queries().len(), 2);
        assert_eq!(api.call_count("list_commits"), 2);
    }

    #[tokio::test]
    async fn test_commit_detail_stats() {
        let stats = CommitStats {
            additions: 4,
            deletions: 1,
            total: 5,
        };
        let api = fake().with_commit_stats("alice/a", "c1", stats);
        let detail = api.get_commit("alice/a", "c1").await.expect("detail");
        assert_eq!(detail.stats, Some(stats));
        assert!(api.get_commit("alice/a", "missing").await.is_err());
    }

    #[tokio::test]
    async fn test_failing_endpoint_and_user() {
        let api = fake().failing("list_followers").failing_user("bob");
        assert!(api.list_followers("alice", None).await.is_err());
        assert!(api.list_following("alice", None).await.is_ok());
        assert!(api.get_user("bob").await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_latency_tracks_overlap() {
        let api = fake().with_user_latency(Duration::from_millis(10));

        let (a, b) = tokio::join!(api.get_user("alice"), api.get_user("alice"));

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(api.peak_users_in_flight(), 2);
    }
}
