//! Repository portfolio analysis.

use chrono::{DateTime, Datelike, Utc};
use hubmine_core::record::{
    CollaborationRepo, MaintenancePatterns, ReadmeAnalysis, RepositoryMaturity,
    RepositoryPortfolio, RepositorySize,
};
use hubmine_github::{GitHubApi, Repository};
use std::collections::BTreeMap;

/// Repositories analyzed.
const REPO_LIMIT: usize = 20;

/// A repository pushed to within this many days counts as maintained.
const MAINTAINED_WITHIN_DAYS: i64 = 30;

/// READMEs longer than this count as documented.
const DOCUMENTED_README_CHARS: usize = 500;

/// Stars above which a repository counts as collaborative.
const COLLABORATION_STARS: u64 = 5;

struct ReadmeStats {
    length: usize,
    has_badges: bool,
    has_sections: bool,
}

/// Analyze the first repositories of a listing as of `now`.
#[allow(clippy::cast_precision_loss)]
pub async fn collect(
    api: &dyn GitHubApi,
    repos: &[Repository],
    now: DateTime<Utc>,
) -> RepositoryPortfolio {
    let mut portfolio = RepositoryPortfolio {
        total_repositories: repos.len() as u64,
        ..RepositoryPortfolio::default()
    };

    let mut language_bytes: BTreeMap<String, u64> = BTreeMap::new();
    let mut readmes: Vec<ReadmeStats> = Vec::new();

    for repo in repos.iter().take(REPO_LIMIT) {
        if repo.fork {
            portfolio.forked_repos += 1;
        } else {
            portfolio.original_repos += 1;
        }

        if repo.size > 0 {
            portfolio.repository_sizes.push(RepositorySize {
                name: repo.name.clone(),
                size_kb: repo.size,
                stars: repo.stargazers_count,
                forks: repo.forks_count,
            });
        }

        match api.repo_languages(&repo.full_name).await {
            Ok(languages) => {
                for (language, bytes) in languages {
                    *language_bytes.entry(language).or_insert(0) += bytes;
                }
            }
            Err(e) => tracing::debug!("No languages for {}: {}", repo.full_name, e),
        }

        if let Some(license) = &repo.license {
            *portfolio
                .license_preferences
                .entry(license.name.clone())
                .or_insert(0) += 1;
        }
        for topic in &repo.topics {
            *portfolio.topics_used.entry(topic.clone()).or_insert(0) += 1;
        }
        *portfolio
            .repo_creation_pattern
            .entry(repo.created_at.year())
            .or_insert(0) += 1;

        readmes.push(match api.get_readme(&repo.full_name).await {
            Ok(text) => ReadmeStats {
                length: text.chars().count(),
                has_badges: text.contains("!["),
                has_sections: text.contains('#'),
            },
            Err(_) => ReadmeStats {
                length: 0,
                has_badges: false,
                has_sections: false,
            },
        });

        if repo.forks_count > 0 || repo.stargazers_count > COLLABORATION_STARS {
            portfolio.collaboration_repos.push(CollaborationRepo {
                name: repo.name.clone(),
                forks: repo.forks_count,
                stars: repo.stargazers_count,
                watchers: repo.watchers_count,
            });
        }

        let days_since_last_push = repo.pushed_at.map(|pushed| (now - pushed).num_days());
        portfolio.repository_maturity.push(RepositoryMaturity {
            name: repo.name.clone(),
            age_days: (now - repo.created_at).num_days(),
            days_since_last_push,
            is_maintained: days_since_last_push.is_some_and(|d| d < MAINTAINED_WITHIN_DAYS),
        });
    }

    let total_bytes: u64 = language_bytes.values().sum();
    if total_bytes > 0 {
        portfolio.language_distribution = language_bytes
            .into_iter()
            .map(|(language, bytes)| (language, bytes as f64 / total_bytes as f64 * 100.0))
            .collect();
    }

    portfolio.readme_analysis = readme_analysis(&readmes);
    portfolio.maintenance_patterns = maintenance(&portfolio.repository_maturity);
    portfolio
}

#[allow(clippy::cast_precision_loss)]
fn readme_analysis(readmes: &[ReadmeStats]) -> ReadmeAnalysis {
    if readmes.is_empty() {
        return ReadmeAnalysis::default();
    }
    let count = readmes.len() as u64;
    let total_length: usize = readmes.iter().map(|r| r.length).sum();
    let documented = readmes
        .iter()
        .filter(|r| r.length > DOCUMENTED_README_CHARS)
        .count() as u64;

    ReadmeAnalysis {
        avg_readme_length: total_length as f64 / count as f64,
        repos_with_badges: readmes.iter().filter(|r| r.has_badges).count() as u64,
        repos_with_sections: readmes.iter().filter(|r| r.has_sections).count() as u64,
        documentation_score: super::ratio(documented, count),
    }
}

#[allow(clippy::cast_precision_loss)]
fn maintenance(maturity: &[RepositoryMaturity]) -> MaintenancePatterns {
    if maturity.is_empty() {
        return MaintenancePatterns::default();
    }
    let count = maturity.len() as u64;
    let maintained = maturity.iter().filter(|m| m.is_maintained).count() as u64;
    let total_age: i64 = maturity.iter().map(|m| m.age_days).sum();

    MaintenancePatterns {
        maintained_repos_count: maintained,
        maintenance_ratio: super::ratio(maintained, count),
        avg_repo_age_days: total_age as f64 / count as f64,
    }
}
