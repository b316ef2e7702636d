//! Commit retrieval strategies and their escalation chains.
//!
//! Each strategy is one way of asking the API for an entity's commits in a
//! repository, optionally followed by local filtering. Chains are tried in
//! order and advance only when a query fails; an empty but successful result
//! is final.

use chrono::{DateTime, Utc};
use hubmine_core::FetchMode;
use hubmine_github::{ApiError, Commit, CommitQuery, GitHubApi};

/// Page size of the last-resort unfiltered windowed query.
pub const RECENT_PAGE_SIZE: usize = 50;

/// One way of fetching an entity's commits in a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitStrategy {
    /// Server-side author and since filters.
    AuthorSince,
    /// Server-side since filter, author matched locally.
    SinceThenAuthor,
    /// Most recent page unfiltered, author and window matched locally.
    RecentPageThenFilter,
    /// Server-side author filter, no date bound.
    Author,
    /// Full history unfiltered, author matched locally.
    UnfilteredThenAuthor,
}

/// Escalation chain for windowed mode.
pub const WINDOWED_CHAIN: [CommitStrategy; 3] = [
    CommitStrategy::AuthorSince,
    CommitStrategy::SinceThenAuthor,
    CommitStrategy::RecentPageThenFilter,
];

/// Escalation chain for unbounded mode.
pub const UNBOUNDED_CHAIN: [CommitStrategy; 2] =
    [CommitStrategy::Author, CommitStrategy::UnfilteredThenAuthor];

/// The escalation chain for a fetch mode.
#[must_use]
pub fn chain(mode: FetchMode) -> &'static [CommitStrategy] {
    match mode {
        FetchMode::Windowed => &WINDOWED_CHAIN,
        FetchMode::Unbounded => &UNBOUNDED_CHAIN,
    }
}

/// Inputs shared by every strategy of a resolution.
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    /// Login the commits must belong to
    pub login: &'a str,
    /// Start of the trailing window
    pub cutoff: DateTime<Utc>,
}

impl CommitStrategy {
    /// Short name used in logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AuthorSince => "author+since",
            Self::SinceThenAuthor => "since, local author filter",
            Self::RecentPageThenFilter => "recent page, local author+date filter",
            Self::Author => "author",
            Self::UnfilteredThenAuthor => "unfiltered, local author filter",
        }
    }

    /// The remote query this strategy issues.
    #[must_use]
    pub fn query(self, ctx: &StrategyContext<'_>) -> CommitQuery {
        match self {
            Self::AuthorSince => CommitQuery::new().by_author(ctx.login).since(ctx.cutoff),
            Self::SinceThenAuthor => CommitQuery::new().since(ctx.cutoff),
            Self::RecentPageThenFilter => CommitQuery::new().with_limit(RECENT_PAGE_SIZE),
            Self::Author => CommitQuery::new().by_author(ctx.login),
            Self::UnfilteredThenAuthor => CommitQuery::new(),
        }
    }

    /// Local filtering applied to the query's result.
    #[must_use]
    pub fn filter(self, commits: Vec<Commit>, ctx: &StrategyContext<'_>) -> Vec<Commit> {
        match self {
            Self::AuthorSince | Self::Author => commits,
            Self::SinceThenAuthor | Self::UnfilteredThenAuthor => commits
                .into_iter()
                .filter(|c| c.is_authored_by(ctx.login))
                .collect(),
            Self::RecentPageThenFilter => commits
                .into_iter()
                .filter(|c| c.is_authored_by(ctx.login))
                .filter(|c| c.authored_at().is_some_and(|d| d >= ctx.cutoff))
                .collect(),
        }
    }

    /// Run the query and the local filter.
    pub async fn execute(
        self,
        api: &dyn GitHubApi,
        full_name: &str,
        ctx: &StrategyContext<'_>,
    ) -> Result<Vec<Commit>, ApiError> {
        let commits = api.list_commits(full_name, &self.query(ctx)).await?;
        Ok(self.filter(commits, ctx))
    }
}

/// Try `strategies` in order until one succeeds.
///
/// Returns the winning strategy with its commits, or the last error when
/// every strategy failed.
pub async fn escalate(
    strategies: &[CommitStrategy],
    api: &dyn GitHubApi,
    full_name: &str,
    ctx: &StrategyContext<'_>,
) -> Result<(CommitStrategy, Vec<Commit>), ApiError> {
    let mut last_error = None;

    for &strategy in strategies {
        match strategy.execute(api, full_name, ctx).await {
            Ok(commits) => return Ok((strategy, commits)),
            Err(e) => {
                tracing::warn!(
                    "Commit strategy '{}' failed for {}: {}",
                    strategy.name(),
                    full_name,
                    e
                );
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| ApiError::Internal("no commit strategies configured".to_string())))
}
