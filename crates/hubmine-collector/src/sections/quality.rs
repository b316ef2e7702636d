//! Contribution quality: commit messages, pull requests, issues and the
//! documentation, test and CI footprint of repository roots.

use hubmine_core::record::{
    CiCdAdoption, CommitMessageAnalysis, ContributionQuality, DocumentationContributions,
    IssueManagement, PullRequestPatterns, TestingPatterns,
};
use hubmine_github::{CommitQuery, ContentEntry, GitHubApi, Issue, PullRequest, Repository};

/// Repositories analyzed, forks included in the count but skipped.
const REPO_LIMIT: usize = 10;
/// Author commits read per repository.
const COMMIT_LIMIT: usize = 20;
/// Pull requests by the entity kept per repository.
const PULL_LIMIT: usize = 10;
/// Pull requests scanned per repository to find the entity's own.
const PULL_SCAN_LIMIT: usize = 100;
/// Issues created by the entity read per repository.
const ISSUE_LIMIT: usize = 10;

const CONVENTIONAL_PREFIXES: [&str; 7] = [
    "feat:",
    "fix:",
    "docs:",
    "style:",
    "refactor:",
    "test:",
    "chore:",
];
const DOC_MARKERS: [&str; 5] = ["readme", "doc", "wiki", "guide", "tutorial"];
const TEST_MARKERS: [&str; 2] = ["test", "spec"];
const CI_MARKERS: [&str; 6] = [
    ".github",
    ".travis.yml",
    ".circleci",
    "jenkinsfile",
    ".gitlab-ci.yml",
    "azure-pipelines.yml",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootFileKind {
    Docs,
    Tests,
    Ci,
}

/// Analyze contribution quality over the first repositories of a listing.
///
/// Every upstream call degrades on its own; ratios over repositories use
/// the full listing as denominator.
pub async fn collect(api: &dyn GitHubApi, login: &str, repos: &[Repository]) -> ContributionQuality {
    let mut messages: Vec<String> = Vec::new();
    let mut pulls: Vec<PullRequest> = Vec::new();
    let mut issues: Vec<Issue> = Vec::new();
    let (mut docs, mut tests, mut ci) = (0_u64, 0_u64, 0_u64);

    for repo in repos.iter().take(REPO_LIMIT) {
        if repo.fork {
            continue;
        }
        let full_name = repo.full_name.as_str();

        let query = CommitQuery::new().by_author(login).with_limit(COMMIT_LIMIT);
        match api.list_commits(full_name, &query).await {
            Ok(commits) => messages.extend(commits.into_iter().map(|c| c.commit.message)),
            Err(e) => tracing::warn!("Error analyzing contributions in {}: {}", repo.name, e),
        }

        pulls.extend(own_pulls(api, full_name, login).await);

        match api.list_issues(full_name, login, Some(ISSUE_LIMIT)).await {
            Ok(found) => issues.extend(found.into_iter().filter(|i| !i.is_pull_request())),
            Err(e) => tracing::debug!("No issues for {}: {}", full_name, e),
        }

        match api.list_root_contents(full_name).await {
            Ok(entries) => {
                for kind in entries.iter().filter_map(classify) {
                    match kind {
                        RootFileKind::Docs => docs += 1,
                        RootFileKind::Tests => tests += 1,
                        RootFileKind::Ci => ci += 1,
                    }
                }
            }
            Err(e) => tracing::debug!("No root listing for {}: {}", full_name, e),
        }
    }

    let total_repos = repos.len() as u64;
    ContributionQuality {
        commit_message_analysis: message_analysis(&messages),
        pull_request_patterns: pull_patterns(&pulls),
        issue_management: issue_management(&issues),
        documentation_contributions: DocumentationContributions {
            doc_files_count: docs,
            documentation_ratio: super::ratio(docs, total_repos),
        },
        testing_patterns: TestingPatterns {
            test_files_count: tests,
            testing_ratio: super::ratio(tests, total_repos),
        },
        ci_cd_adoption: CiCdAdoption {
            ci_files_count: ci,
            ci_adoption_ratio: super::ratio(ci, total_repos),
        },
    }
}

/// The entity's own pull requests, with counters from the detail endpoint.
async fn own_pulls(api: &dyn GitHubApi, full_name: &str, login: &str) -> Vec<PullRequest> {
    let listed = match api.list_pulls(full_name, Some(PULL_SCAN_LIMIT)).await {
        Ok(listed) => listed,
        Err(e) => {
            tracing::debug!("No pull requests for {}: {}", full_name, e);
            return Vec::new();
        }
    };

    let mut own = Vec::new();
    for pull in listed.into_iter().filter(|p| p.is_opened_by(login)).take(PULL_LIMIT) {
        match api.get_pull(full_name, pull.number).await {
            Ok(detail) => own.push(detail),
            Err(e) => {
                tracing::debug!("Pull #{} of {} without details: {}", pull.number, full_name, e);
                own.push(pull);
            }
        }
    }
    own
}

fn classify(entry: &ContentEntry) -> Option<RootFileKind> {
    let name = entry.name.to_lowercase();
    if CI_MARKERS.contains(&name.as_str()) {
        return Some(RootFileKind::Ci);
    }
    if entry.entry_type != "file" {
        return None;
    }
    if DOC_MARKERS.iter().any(|m| name.contains(m)) {
        Some(RootFileKind::Docs)
    } else if TEST_MARKERS.iter().any(|m| name.contains(m)) {
        Some(RootFileKind::Tests)
    } else {
        None
    }
}

#[allow(clippy::cast_precision_loss)]
fn message_analysis(messages: &[String]) -> CommitMessageAnalysis {
    if messages.is_empty() {
        return CommitMessageAnalysis::default();
    }
    let count = messages.len() as u64;
    let total_length: usize = messages.iter().map(|m| m.chars().count()).sum();
    let conventional = messages
        .iter()
        .filter(|m| {
            let lower = m.to_lowercase();
            CONVENTIONAL_PREFIXES.iter().any(|p| lower.contains(p))
        })
        .count() as u64;
    let multiline = messages.iter().filter(|m| m.contains('\n')).count() as u64;

    CommitMessageAnalysis {
        total_commits: count,
        avg_message_length: total_length as f64 / count as f64,
        conventional_commits_ratio: super::ratio(conventional, count),
        multiline_commits_ratio: super::ratio(multiline, count),
    }
}

#[allow(clippy::cast_precision_loss)]
fn pull_patterns(pulls: &[PullRequest]) -> PullRequestPatterns {
    if pulls.is_empty() {
        return PullRequestPatterns::default();
    }
    let count = pulls.len() as u64;
    let merged = pulls.iter().filter(|p| p.is_merged()).count() as u64;
    let comments: u64 = pulls.iter().map(|p| p.comments).sum();
    let changes: u64 = pulls.iter().map(|p| p.additions + p.deletions).sum();
    let files: u64 = pulls.iter().map(|p| p.changed_files).sum();

    PullRequestPatterns {
        total_prs: count,
        merge_rate: super::ratio(merged, count),
        avg_comments_per_pr: super::ratio(comments, count),
        avg_changes_per_pr: super::ratio(changes, count),
        avg_files_per_pr: super::ratio(files, count),
    }
}

fn issue_management(issues: &[Issue]) -> IssueManagement {
    if issues.is_empty() {
        return IssueManagement::default();
    }
    let count = issues.len() as u64;
    let closed = issues.iter().filter(|i| i.is_closed()).count() as u64;
    let labels: u64 = issues.iter().map(|i| i.labels.len() as u64).sum();
    let body_length: u64 = issues
        .iter()
        .map(|i| i.body.as_deref().map_or(0, |b| b.chars().count() as u64))
        .sum();

    IssueManagement {
        total_issues: count,
        closure_rate: super::ratio(closed, count),
        avg_labels_per_issue: super::ratio(labels, count),
        avg_issue_description_length: super::ratio(body_length, count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hubmine_github::fake::{self, FakeGitHub};
    use hubmine_github::models::Label;

    fn pull(number: u64, author: &str, merged: bool) -> PullRequest {
        PullRequest {
            number,
            state: "closed".to_string(),
            user: Some(fake::account(author)),
            merged_at: None,
            merged: Some(merged),
            comments: 2,
            additions: 10,
            deletions: 4,
            changed_files: 3,
        }
    }

    fn issue(number: u64, author: &str, state: &str, labels: usize, body: &str) -> Issue {
        Issue {
            number,
            state: state.to_string(),
            user: Some(fake::account(author)),
            labels: (0..labels)
                .map(|i| Label {
                    name: format!("l{i}"),
                })
                .collect(),
            body: Some(body.to_string()),
            pull_request: None,
        }
    }

    #[test]
    fn test_classify_root_entries() {
        let entry = |name: &str, entry_type: &str| ContentEntry {
            name: name.to_string(),
            path: name.to_string(),
            entry_type: entry_type.to_string(),
        };
        assert_eq!(classify(&entry("README.md", "file")), Some(RootFileKind::Docs));
        assert_eq!(classify(&entry("test_main.py", "file")), Some(RootFileKind::Tests));
        assert_eq!(classify(&entry(".github", "dir")), Some(RootFileKind::Ci));
        assert_eq!(classify(&entry(".travis.yml", "file")), Some(RootFileKind::Ci));
        assert_eq!(classify(&entry("tests", "dir")), None);
        assert_eq!(classify(&entry("main.rs", "file")), None);
    }

    #[tokio::test]
    async fn test_quality() {
        let when = Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap();
        let api = FakeGitHub::new()
            .with_commits(
                "hana/app",
                vec![
                    fake::commit("1", Some("hana"), when, "feat: add parser"),
                    fake::commit("2", Some("hana"), when, "tidy\n\nlong body"),
                ],
            )
            .with_pulls(
                "hana/app",
                vec![pull(1, "hana", true), pull(2, "hana", false), pull(3, "zed", true)],
            )
            .with_issues(
                "hana/app",
                vec![
                    issue(4, "hana", "closed", 2, "abcd"),
                    issue(5, "hana", "open", 0, ""),
                    issue(6, "zed", "closed", 1, "x"),
                ],
            )
            .with_root_contents("hana/app", &["README.md", ".github", "spec_helper.rb", "src"]);
        let repos = vec![
            fake::repo("hana", "app"),
            fake::forked_repo("hana", "fork"),
        ];

        let quality = collect(&api, "hana", &repos).await;

        let messages = quality.commit_message_analysis;
        assert_eq!(messages.total_commits, 2);
        assert!((messages.conventional_commits_ratio - 0.5).abs() < 1e-9);
        assert!((messages.multiline_commits_ratio - 0.5).abs() < 1e-9);

        let pulls = quality.pull_request_patterns;
        assert_eq!(pulls.total_prs, 2);
        assert!((pulls.merge_rate - 0.5).abs() < 1e-9);
        assert!((pulls.avg_changes_per_pr - 14.0).abs() < 1e-9);
        assert!((pulls.avg_files_per_pr - 3.0).abs() < 1e-9);

        let issues = quality.issue_management;
        assert_eq!(issues.total_issues, 2);
        assert!((issues.closure_rate - 0.5).abs() < 1e-9);
        assert!((issues.avg_labels_per_issue - 1.0).abs() < 1e-9);
        assert!((issues.avg_issue_description_length - 2.0).abs() < 1e-9);

        assert_eq!(quality.documentation_contributions.doc_files_count, 1);
        assert_eq!(quality.testing_patterns.test_files_count, 1);
        assert_eq!(quality.ci_cd_adoption.ci_files_count, 1);
        assert!((quality.ci_cd_adoption.ci_adoption_ratio - 0.5).abs() < 1e-9);
        assert_eq!(api.call_count("list_root_contents"), 1);
    }
}
