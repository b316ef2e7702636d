//! Aggregation of an entity's commit activity across its repositories.

use super::strategy::{self, StrategyContext};
use chrono::{DateTime, Timelike, Utc};
use hubmine_core::{ActivitySummary, ChangeStats, CollectionMode, CommitRecord, FetchMode};
use hubmine_github::{Commit, GitHubApi, Repository};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Repositories scanned in windowed mode.
pub const WINDOWED_REPO_CAP: usize = 15;

/// Repositories scanned in unbounded mode.
pub const UNBOUNDED_REPO_CAP: usize = 25;

/// Maximum length of the commit detail list.
pub const DETAIL_CAP: usize = 50;

/// Commit messages are cut to this many characters.
pub const MESSAGE_MAX_CHARS: usize = 200;

/// Resolves commit activity for one entity.
///
/// Never fails: repositories whose strategies are all exhausted are skipped,
/// and an entity without owned non-fork repositories gets the empty summary.
pub struct ActivityResolver {
    api: Arc<dyn GitHubApi>,
    cancel: CancellationToken,
    now: Option<DateTime<Utc>>,
}

impl ActivityResolver {
    /// Create a resolver over `api`.
    #[must_use]
    pub fn new(api: Arc<dyn GitHubApi>) -> Self {
        Self {
            api,
            cancel: CancellationToken::new(),
            now: None,
        }
    }

    /// Stop scanning further repositories once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Pin the clock the trailing window is measured from.
    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// List the entity's repositories and resolve over them.
    ///
    /// A failed listing yields the empty summary for the mode.
    pub async fn resolve_entity(&self, login: &str, mode: CollectionMode) -> ActivitySummary {
        match self.api.list_user_repos(login, None).await {
            Ok(repos) => self.resolve(login, &repos, mode).await,
            Err(e) => {
                tracing::error!("Error analyzing commit activity for {}: {}", login, e);
                ActivitySummary::empty(mode.fetch_mode())
            }
        }
    }

    /// Resolve activity over an already-fetched repository listing.
    pub async fn resolve(
        &self,
        login: &str,
        repos: &[Repository],
        mode: CollectionMode,
    ) -> ActivitySummary {
        let fetch_mode = mode.fetch_mode();
        let mut summary = ActivitySummary::empty(fetch_mode);

        let owned: Vec<&Repository> = repos
            .iter()
            .filter(|r| !r.fork && r.is_owned_by(login))
            .collect();
        summary.total_repositories = owned.len() as u64;

        if owned.is_empty() {
            tracing::info!(
                "User {} has no original repositories, returning empty activity data",
                login
            );
            return summary;
        }

        let cap = match fetch_mode {
            FetchMode::Windowed => WINDOWED_REPO_CAP,
            FetchMode::Unbounded => UNBOUNDED_REPO_CAP,
        };
        let ctx = StrategyContext {
            login,
            cutoff: self.now.unwrap_or_else(Utc::now) - mode.window(),
        };
        let chain = strategy::chain(fetch_mode);

        let mut all_commits: u64 = 0;
        let mut per_repo: Vec<(&str, u64)> = Vec::new();

        for repo in owned.into_iter().take(cap) {
            if self.cancel.is_cancelled() {
                tracing::info!("Commit analysis for {} cancelled", login);
                break;
            }

            summary.repositories_analyzed += 1;
            tracing::debug!(
                "Analyzing commits for repo: {} ({})",
                repo.name,
                fetch_mode.label()
            );

            let commits = match strategy::escalate(chain, self.api.as_ref(), &repo.full_name, &ctx).await
            {
                Ok((_, commits)) => commits,
                Err(e) => {
                    tracing::warn!("Skipping {}: all commit strategies failed: {}", repo.full_name, e);
                    continue;
                }
            };

            let mut repo_commits: u64 = 0;
            for commit in &commits {
                let Some(date) = commit.authored_at() else {
                    tracing::warn!("Commit {} in {} has no date, skipping", commit.sha, repo.name);
                    continue;
                };
                repo_commits += 1;
                all_commits += 1;

                if date < ctx.cutoff {
                    continue;
                }
                summary.total_recent_commits += 1;
                let day = date.date_naive();
                summary.active_days.insert(day);
                *summary.commit_frequency_by_day.entry(day).or_insert(0) += 1;
                *summary.commit_frequency_by_hour.entry(date.hour()).or_insert(0) += 1;

                if summary.recent_commits.len() < DETAIL_CAP {
                    let stats = self.change_stats(&repo.full_name, commit).await;
                    summary.recent_commits.push(CommitRecord {
                        repo: repo.name.clone(),
                        sha: commit.sha.clone(),
                        message: truncate_message(&commit.commit.message),
                        date,
                        stats,
                    });
                }
            }

            if fetch_mode == FetchMode::Unbounded {
                tracing::debug!("Counted {} total commits from {}", repo_commits, repo.name);
            }
            per_repo.push((repo.name.as_str(), repo_commits));
        }

        if fetch_mode == FetchMode::Unbounded {
            summary.total_commits = Some(all_commits);
        }
        summary.most_active_repo = most_active(&per_repo);
        summary.avg_commits_per_day = average_per_day(
            summary.total_recent_commits,
            summary.active_days.len(),
        );

        tracing::info!(
            "Completed analysis for {}: {} recent commits (stored {} commit details)",
            login,
            summary.total_recent_commits,
            summary.recent_commits.len()
        );
        summary
    }

    /// Stats from the listing when present, otherwise one detail lookup.
    async fn change_stats(&self, full_name: &str, commit: &Commit) -> ChangeStats {
        if let Some(stats) = commit.stats {
            return to_change_stats(stats);
        }

        match self.api.get_commit(full_name, &commit.sha).await {
            Ok(detail) => detail.stats.map(to_change_stats).unwrap_or_default(),
            Err(e) => {
                tracing::debug!("No stats for {} in {}: {}", commit.sha, full_name, e);
                ChangeStats::default()
            }
        }
    }
}

fn to_change_stats(stats: hubmine_github::CommitStats) -> ChangeStats {
    ChangeStats {
        additions: stats.additions,
        deletions: stats.deletions,
        total: stats.total,
    }
}

fn truncate_message(message: &str) -> String {
    message.chars().take(MESSAGE_MAX_CHARS).collect()
}

/// First repository with the highest non-zero count.
fn most_active(per_repo: &[(&str, u64)]) -> Option<String> {
    let mut best: Option<(&str, u64)> = None;
    for &(name, count) in per_repo {
        if count > best.map_or(0, |(_, c)| c) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name.to_string())
}

#[allow(clippy::cast_precision_loss)]
fn average_per_day(commits: u64, days: usize) -> f64 {
    if days == 0 {
        0.0
    } else {
        commits as f64 / days as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_message() {
        assert_eq!(truncate_message("short"), "short");
        let long = "é".repeat(250);
        assert_eq!(truncate_message(&long).chars().count(), MESSAGE_MAX_CHARS);
    }

    #[test]
    fn test_most_active_prefers_earliest_on_tie() {
        assert_eq!(most_active(&[]), None);
        assert_eq!(most_active(&[("a", 0), ("b", 0)]), None);
        assert_eq!(
            most_active(&[("a", 2), ("b", 5), ("c", 5)]),
            Some("b".to_string())
        );
    }

    #[test]
    fn test_average_per_day() {
        assert!(average_per_day(0, 0).abs() < f64::EPSILON);
        assert!((average_per_day(6, 4) - 1.5).abs() < f64::EPSILON);
    }
}
