//! Flattening of an [`EntityRecord`] into one fixed-column feature row.

use chrono::SecondsFormat;
use hubmine_core::EntityRecord;
use serde::{Deserialize, Serialize};

/// One CSV row. Field order is the column order.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    // Identity
    pub username: String,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
    pub created_at: String,

    // Extended profile
    pub public_gists: u64,
    pub starred_repos_count: usize,
    pub watched_repos_count: usize,
    pub organizations_count: usize,
    pub events_count: usize,
    pub has_email: bool,
    pub has_location: bool,
    pub has_bio: bool,
    pub has_company: bool,
    pub has_blog: bool,
    pub is_hireable: bool,

    // Development patterns
    pub pattern_commits: usize,
    pub productivity_max_streak: u64,
    pub productivity_active_days: u64,

    // Commit activity
    pub total_commits: Option<u64>,
    pub recent_commits_total: u64,
    pub recent_active_days: usize,
    pub avg_commits_per_day: f64,
    pub repositories_analyzed: u64,
    pub recent_commits_stored: usize,
    pub most_active_repo: String,
    pub fetch_mode: String,

    // Social network
    pub followers_sample_count: usize,
    pub following_sample_count: usize,
    pub mutual_connections_count: usize,
    pub follower_to_following_ratio: f64,
    pub social_influence_score: f64,

    // Repository portfolio
    pub total_repositories: u64,
    pub original_repos: u64,
    pub forked_repos: u64,
    pub primary_language: String,
    pub language_diversity: usize,
    pub avg_repo_size: f64,
    pub total_stars_received: u64,
    pub total_forks_received: u64,
    pub license_diversity: usize,
    pub topics_used_count: usize,
    pub collaboration_repos_count: usize,
    pub maintained_repos_ratio: f64,
    pub avg_repo_age_days: f64,
    pub documentation_score: f64,
    pub avg_readme_length: f64,

    // Contribution quality
    pub avg_commit_message_length: f64,
    pub conventional_commits_ratio: f64,
    pub multiline_commits_ratio: f64,
    pub pr_merge_rate: f64,
    pub avg_comments_per_pr: f64,
    pub avg_changes_per_pr: f64,
    pub issue_closure_rate: f64,
    pub avg_issue_description_length: f64,
    pub documentation_ratio: f64,
    pub testing_ratio: f64,
    pub ci_adoption_ratio: f64,
}

/// Column names in output order.
pub const COLUMNS: [&str; 58] = [
    "username",
    "followers",
    "following",
    "public_repos",
    "created_at",
    "public_gists",
    "starred_repos_count",
    "watched_repos_count",
    "organizations_count",
    "events_count",
    "has_email",
    "has_location",
    "has_bio",
    "has_company",
    "has_blog",
    "is_hireable",
    "pattern_commits",
    "productivity_max_streak",
    "productivity_active_days",
    "total_commits",
    "recent_commits_total",
    "recent_active_days",
    "avg_commits_per_day",
    "repositories_analyzed",
    "recent_commits_stored",
    "most_active_repo",
    "fetch_mode",
    "followers_sample_count",
    "following_sample_count",
    "mutual_connections_count",
    "follower_to_following_ratio",
    "social_influence_score",
    "total_repositories",
    "original_repos",
    "forked_repos",
    "primary_language",
    "language_diversity",
    "avg_repo_size",
    "total_stars_received",
    "total_forks_received",
    "license_diversity",
    "topics_used_count",
    "collaboration_repos_count",
    "maintained_repos_ratio",
    "avg_repo_age_days",
    "documentation_score",
    "avg_readme_length",
    "avg_commit_message_length",
    "conventional_commits_ratio",
    "multiline_commits_ratio",
    "pr_merge_rate",
    "avg_comments_per_pr",
    "avg_changes_per_pr",
    "issue_closure_rate",
    "avg_issue_description_length",
    "documentation_ratio",
    "testing_ratio",
    "ci_adoption_ratio",
];

impl FeatureRow {
    /// Flatten `record`.
    #[must_use]
    pub fn from_record(record: &EntityRecord) -> Self {
        let identity = &record.identity;
        let extended = &record.extended_user_data;
        let patterns = &record.development_patterns;
        let activity = &record.commit_activity;
        let social = &record.social_network;
        let portfolio = &record.repository_portfolio;
        let quality = &record.contribution_quality;

        let sizes = &portfolio.repository_sizes;

        Self {
            username: identity.username.clone(),
            followers: identity.followers,
            following: identity.following,
            public_repos: identity.public_repos,
            created_at: identity
                .created_at
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),

            public_gists: extended.public_gists,
            starred_repos_count: extended.starred_repos.len(),
            watched_repos_count: extended.watched_repos.len(),
            organizations_count: extended.organizations.len(),
            events_count: extended.events.len(),
            has_email: is_filled(extended.email.as_deref()),
            has_location: is_filled(extended.location.as_deref()),
            has_bio: is_filled(extended.bio.as_deref()),
            has_company: is_filled(extended.company.as_deref()),
            has_blog: is_filled(extended.blog.as_deref()),
            is_hireable: extended.hireable.unwrap_or(false),

            pattern_commits: patterns.commit_frequency.len(),
            productivity_max_streak: patterns.productivity_streaks.max_streak,
            productivity_active_days: patterns.productivity_streaks.total_active_days,

            total_commits: activity.total_commits,
            recent_commits_total: activity.total_recent_commits,
            recent_active_days: activity.active_days.len(),
            avg_commits_per_day: activity.avg_commits_per_day,
            repositories_analyzed: activity.repositories_analyzed,
            recent_commits_stored: activity.recent_commits.len(),
            most_active_repo: activity.most_active_repo.clone().unwrap_or_default(),
            fetch_mode: activity.fetch_mode.as_str().to_string(),

            followers_sample_count: social.followers_list.len(),
            following_sample_count: social.following_list.len(),
            mutual_connections_count: social.mutual_connections.len(),
            follower_to_following_ratio: social.follower_to_following_ratio,
            social_influence_score: social.social_influence_score,

            total_repositories: portfolio.total_repositories,
            original_repos: portfolio.original_repos,
            forked_repos: portfolio.forked_repos,
            primary_language: primary_language(portfolio.language_distribution.iter())
                .unwrap_or_default(),
            language_diversity: portfolio.language_distribution.len(),
            avg_repo_size: mean(sizes.iter().map(|s| s.size_kb), sizes.len()),
            total_stars_received: sizes.iter().map(|s| s.stars).sum(),
            total_forks_received: sizes.iter().map(|s| s.forks).sum(),
            license_diversity: portfolio.license_preferences.len(),
            topics_used_count: portfolio.topics_used.len(),
            collaboration_repos_count: portfolio.collaboration_repos.len(),
            maintained_repos_ratio: portfolio.maintenance_patterns.maintenance_ratio,
            avg_repo_age_days: portfolio.maintenance_patterns.avg_repo_age_days,
            documentation_score: portfolio.readme_analysis.documentation_score,
            avg_readme_length: portfolio.readme_analysis.avg_readme_length,

            avg_commit_message_length: quality.commit_message_analysis.avg_message_length,
            conventional_commits_ratio: quality.commit_message_analysis.conventional_commits_ratio,
            multiline_commits_ratio: quality.commit_message_analysis.multiline_commits_ratio,
            pr_merge_rate: quality.pull_request_patterns.merge_rate,
            avg_comments_per_pr: quality.pull_request_patterns.avg_comments_per_pr,
            avg_changes_per_pr: quality.pull_request_patterns.avg_changes_per_pr,
            issue_closure_rate: quality.issue_management.closure_rate,
            avg_issue_description_length: quality.issue_management.avg_issue_description_length,
            documentation_ratio: quality.documentation_contributions.documentation_ratio,
            testing_ratio: quality.testing_patterns.testing_ratio,
            ci_adoption_ratio: quality.ci_cd_adoption.ci_adoption_ratio,
        }
    }
}

fn is_filled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Language with the largest share; the first one wins a tie.
fn primary_language<'a>(shares: impl Iterator<Item = (&'a String, &'a f64)>) -> Option<String> {
    shares
        .fold(None, |best: Option<(&String, f64)>, (lang, share)| match best {
            Some((_, top)) if *share <= top => best,
            _ => Some((lang, *share)),
        })
        .map(|(lang, _)| lang.clone())
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = u64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    values.sum::<u64>() as f64 / count as f64
}
