//! The aggregate record produced for every successfully mined entity.
//!
//! Every section is always present. When a section could not be collected
//! it holds its `Default` value, so consumers (the CSV flattener, feature
//! extraction) can rely on one fixed shape regardless of upstream failures.

use crate::types::FetchMode;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One mined entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Identity snapshot, flattened into the top level of the record.
    #[serde(flatten)]
    pub identity: Identity,
    /// Profile fields and public lists beyond the identity snapshot.
    #[serde(default)]
    pub extended_user_data: ExtendedProfile,
    /// Commit timing, lifecycle and language history across repositories.
    #[serde(default)]
    pub development_patterns: DevelopmentPatterns,
    /// Output of the commit activity resolver.
    #[serde(default)]
    pub commit_activity: ActivitySummary,
    /// Followers, following and derived influence figures.
    #[serde(default)]
    pub social_network: SocialNetwork,
    /// Repository portfolio analysis.
    #[serde(default)]
    pub repository_portfolio: RepositoryPortfolio,
    /// Commit message, pull request and issue quality signals.
    #[serde(default)]
    pub contribution_quality: ContributionQuality,
}

impl EntityRecord {
    /// A record holding only the identity, every section at its default.
    #[must_use]
    pub fn from_identity(identity: Identity, fetch_mode: FetchMode) -> Self {
        Self {
            identity,
            extended_user_data: ExtendedProfile::default(),
            development_patterns: DevelopmentPatterns::default(),
            commit_activity: ActivitySummary::empty(fetch_mode),
            social_network: SocialNetwork::default(),
            repository_portfolio: RepositoryPortfolio::default(),
            contribution_quality: ContributionQuality::default(),
        }
    }

    /// Login of the mined entity.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.identity.username
    }
}

/// Identity snapshot; fetching it is the one step that must succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Login
    pub username: String,
    /// Follower count
    pub followers: u64,
    /// Following count
    pub following: u64,
    /// Public repository count
    pub public_repos: u64,
    /// Account creation time
    pub created_at: DateTime<Utc>,
    /// Last profile update
    pub updated_at: DateTime<Utc>,
}

/// Extended profile section.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendedProfile {
    pub email: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub twitter_username: Option<String>,
    pub hireable: Option<bool>,
    pub public_gists: u64,
    pub avatar_url: Option<String>,
    pub starred_repos: Vec<StarredRepo>,
    pub watched_repos: Vec<WatchedRepo>,
    pub gists: Vec<GistSummary>,
    pub organizations: Vec<OrganizationSummary>,
    pub events: Vec<EventSummary>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarredRepo {
    pub full_name: String,
    pub stars: u64,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedRepo {
    pub full_name: String,
    pub watchers: u64,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistSummary {
    pub id: String,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub login: String,
    pub description: Option<String>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    #[serde(rename = "type")]
    pub event_type: String,
    pub repo: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Development patterns section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevelopmentPatterns {
    /// Author dates of every sampled commit.
    pub commit_frequency: Vec<DateTime<Utc>>,
    /// Hour and weekday of every sampled commit.
    pub commit_timing: CommitTiming,
    /// First-to-last commit span per repository.
    pub repository_lifecycle: Vec<RepositoryLifecycle>,
    /// Language bytes per repository, keyed by language.
    pub language_evolution: BTreeMap<String, Vec<LanguageSample>>,
    /// Consecutive-day streaks over distinct commit dates.
    pub productivity_streaks: ProductivityStreaks,
}

/// Hours (0-23) and weekdays (Monday = 0) of sampled commits.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitTiming {
    pub hours: Vec<u32>,
    pub days: Vec<u32>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryLifecycle {
    pub repo_name: String,
    pub lifecycle_days: i64,
    pub total_commits: u64,
    pub commits_per_day: f64,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSample {
    pub date: Option<DateTime<Utc>>,
    pub bytes: u64,
    pub repo: String,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductivityStreaks {
    pub max_streak: u64,
    pub total_active_days: u64,
}

/// Commit activity section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivitySummary {
    /// Every matching commit; only counted in unbounded mode.
    pub total_commits: Option<u64>,
    /// Matching commits inside the trailing window.
    pub total_recent_commits: u64,
    /// Distinct dates with at least one in-window commit.
    pub active_days: BTreeSet<NaiveDate>,
    /// In-window commits per date.
    pub commit_frequency_by_day: BTreeMap<NaiveDate, u64>,
    /// In-window commits per hour of day.
    pub commit_frequency_by_hour: BTreeMap<u32, u64>,
    /// Detail list, capped regardless of mode.
    pub recent_commits: Vec<CommitRecord>,
    /// Repository with the most counted commits.
    pub most_active_repo: Option<String>,
    /// `total_recent_commits / |active_days|`, 0 when there are none.
    pub avg_commits_per_day: f64,
    /// Repositories actually scanned.
    pub repositories_analyzed: u64,
    /// Owned non-fork repositories, independent of the scan cap.
    pub total_repositories: u64,
    /// Which strategy family produced the numbers.
    pub fetch_mode: FetchMode,
}

impl ActivitySummary {
    /// The all-zero summary for a mode.
    #[must_use]
    pub fn empty(fetch_mode: FetchMode) -> Self {
        Self {
            total_commits: match fetch_mode {
                FetchMode::Windowed => None,
                FetchMode::Unbounded => Some(0),
            },
            total_recent_commits: 0,
            active_days: BTreeSet::new(),
            commit_frequency_by_day: BTreeMap::new(),
            commit_frequency_by_hour: BTreeMap::new(),
            recent_commits: Vec::new(),
            most_active_repo: None,
            avg_commits_per_day: 0.0,
            repositories_analyzed: 0,
            total_repositories: 0,
            fetch_mode,
        }
    }
}

impl Default for ActivitySummary {
    fn default() -> Self {
        Self::empty(FetchMode::default())
    }
}

/// One entry of the capped commit detail list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Repository name
    pub repo: String,
    /// Commit SHA
    pub sha: String,
    /// Commit message, truncated
    pub message: String,
    /// Author date
    pub date: DateTime<Utc>,
    /// Line change counts
    pub stats: ChangeStats,
}

/// Line change counts of a commit.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeStats {
    pub additions: u64,
    pub deletions: u64,
    pub total: u64,
}

/// Social network section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialNetwork {
    /// Sample of followers
    pub followers_list: Vec<Connection>,
    /// Sample of followed accounts
    pub following_list: Vec<Connection>,
    /// Logins present in both samples
    pub mutual_connections: Vec<String>,
    /// Followers divided by following, 0 when following nobody
    pub follower_to_following_ratio: f64,
    /// `followers*0.6 + public_repos*0.3 + mutual*0.1`
    pub social_influence_score: f64,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub login: String,
    pub html_url: Option<String>,
}

/// Repository portfolio section.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryPortfolio {
    pub total_repositories: u64,
    pub original_repos: u64,
    pub forked_repos: u64,
    /// Percentage of bytes per language.
    pub language_distribution: BTreeMap<String, f64>,
    pub repository_sizes: Vec<RepositorySize>,
    pub license_preferences: BTreeMap<String, u64>,
    pub topics_used: BTreeMap<String, u64>,
    /// Repositories created per year.
    pub repo_creation_pattern: BTreeMap<i32, u64>,
    pub readme_analysis: ReadmeAnalysis,
    pub collaboration_repos: Vec<CollaborationRepo>,
    pub maintenance_patterns: MaintenancePatterns,
    pub repository_maturity: Vec<RepositoryMaturity>,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySize {
    pub name: String,
    pub size_kb: u64,
    pub stars: u64,
    pub forks: u64,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadmeAnalysis {
    pub avg_readme_length: f64,
    pub repos_with_badges: u64,
    pub repos_with_sections: u64,
    /// Share of READMEs longer than 500 characters.
    pub documentation_score: f64,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborationRepo {
    pub name: String,
    pub forks: u64,
    pub stars: u64,
    pub watchers: u64,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenancePatterns {
    pub maintained_repos_count: u64,
    pub maintenance_ratio: f64,
    pub avg_repo_age_days: f64,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryMaturity {
    pub name: String,
    pub age_days: i64,
    pub days_since_last_push: Option<i64>,
    pub is_maintained: bool,
}

/// Contribution quality section.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContributionQuality {
    pub commit_message_analysis: CommitMessageAnalysis,
    pub pull_request_patterns: PullRequestPatterns,
    pub issue_management: IssueManagement,
    pub documentation_contributions: DocumentationContributions,
    pub testing_patterns: TestingPatterns,
    pub ci_cd_adoption: CiCdAdoption,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitMessageAnalysis {
    pub total_commits: u64,
    pub avg_message_length: f64,
    pub conventional_commits_ratio: f64,
    pub multiline_commits_ratio: f64,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullRequestPatterns {
    pub total_prs: u64,
    pub merge_rate: f64,
    pub avg_comments_per_pr: f64,
    pub avg_changes_per_pr: f64,
    pub avg_files_per_pr: f64,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueManagement {
    pub total_issues: u64,
    pub closure_rate: f64,
    pub avg_labels_per_issue: f64,
    pub avg_issue_description_length: f64,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentationContributions {
    pub doc_files_count: u64,
    pub documentation_ratio: f64,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestingPatterns {
    pub test_files_count: u64,
    pub testing_ratio: f64,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CiCdAdoption {
    pub ci_files_count: u64,
    pub ci_adoption_ratio: f64,
}
