//! Development patterns: commit timing, repository lifecycles, language
//! history and productivity streaks.

use chrono::{Datelike, NaiveDate, Timelike};
use hubmine_core::record::{
    DevelopmentPatterns, LanguageSample, ProductivityStreaks, RepositoryLifecycle,
};
use hubmine_github::{CommitQuery, GitHubApi, Repository};
use std::collections::BTreeSet;

/// Repositories sampled, forks included in the count but skipped.
const REPO_LIMIT: usize = 10;

/// Author commits read per repository.
const COMMIT_LIMIT: usize = 100;

/// Compute development patterns over the first repositories of a listing.
///
/// A repository whose commits cannot be listed is logged and skipped.
pub async fn collect(api: &dyn GitHubApi, login: &str, repos: &[Repository]) -> DevelopmentPatterns {
    let mut patterns = DevelopmentPatterns::default();

    for repo in repos.iter().take(REPO_LIMIT) {
        if repo.fork {
            tracing::debug!("Skipping fork: {} for user {}", repo.name, login);
            continue;
        }

        let query = CommitQuery::new()
            .by_author(login)
            .with_limit(COMMIT_LIMIT);
        let commits = match api.list_commits(&repo.full_name, &query).await {
            Ok(commits) => commits,
            Err(e) => {
                tracing::warn!("Error processing repository {} for user {}: {}", repo.name, login, e);
                continue;
            }
        };

        let dates: Vec<_> = commits.iter().filter_map(hubmine_github::Commit::authored_at).collect();
        for date in &dates {
            patterns.commit_timing.hours.push(date.hour());
            patterns.commit_timing.days.push(date.weekday().num_days_from_monday());
        }

        if let (Some(first), Some(last)) = (dates.iter().min(), dates.iter().max()) {
            let lifecycle_days = (*last - *first).num_days();
            let total_commits = commits.len() as u64;
            patterns.repository_lifecycle.push(RepositoryLifecycle {
                repo_name: repo.name.clone(),
                lifecycle_days,
                total_commits,
                commits_per_day: super::ratio(total_commits, lifecycle_days.max(1).unsigned_abs()),
            });
        }
        patterns.commit_frequency.extend(dates);

        match api.repo_languages(&repo.full_name).await {
            Ok(languages) => {
                for (language, bytes) in languages {
                    patterns
                        .language_evolution
                        .entry(language)
                        .or_default()
                        .push(LanguageSample {
                            date: Some(repo.created_at),
                            bytes,
                            repo: repo.name.clone(),
                        });
                }
            }
            Err(e) => tracing::warn!("Error fetching languages for {}: {}", repo.name, e),
        }
    }

    let days: BTreeSet<NaiveDate> = patterns
        .commit_frequency
        .iter()
        .map(chrono::DateTime::date_naive)
        .collect();
    patterns.productivity_streaks = streaks(&days);

    patterns
}

/// Longest run of consecutive dates and the number of distinct dates.
fn streaks(days: &BTreeSet<NaiveDate>) -> ProductivityStreaks {
    if days.is_empty() {
        return ProductivityStreaks::default();
    }

    let mut max_streak: u64 = 1;
    let mut current: u64 = 1;
    let mut previous: Option<NaiveDate> = None;
    for &day in days {
        if let Some(prev) = previous {
            if prev.succ_opt() == Some(day) {
                current += 1;
                max_streak = max_streak.max(current);
            } else {
                current = 1;
            }
        }
        previous = Some(day);
    }

    ProductivityStreaks {
        max_streak,
        total_active_days: days.len() as u64,
    }
}
