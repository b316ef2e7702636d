//! Per-entity record collection.
//!
//! The identity fetch is the only step that must succeed. Every later
//! section is attempted independently and falls back to its default shape on
//! failure, so a returned record always carries every section key.

use crate::activity::ActivityResolver;
use crate::error::{Section, SectionError};
use crate::progress::Progress;
use crate::sections::{extended, patterns, portfolio, quality, social};
use chrono::{DateTime, Utc};
use hubmine_core::{CollectionMode, EntityId, EntityRecord, Identity};
use hubmine_github::{GitHubApi, Repository, User};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Collects one [`EntityRecord`] per entity.
pub struct EntityCollector {
    api: Arc<dyn GitHubApi>,
    progress: Progress,
    cancel: CancellationToken,
    now: Option<DateTime<Utc>>,
}

impl EntityCollector {
    /// Create a collector over `api`.
    #[must_use]
    pub fn new(api: Arc<dyn GitHubApi>) -> Self {
        Self {
            api,
            progress: Progress::silent(),
            cancel: CancellationToken::new(),
            now: None,
        }
    }

    /// Report section progress through `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Abandon collection once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Pin the clock used for windows and repository ages.
    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Collect the record for `id`.
    ///
    /// Returns `None` when the identity cannot be fetched or the collection
    /// is cancelled before the record is complete.
    pub async fn collect(&self, id: &EntityId, mode: CollectionMode) -> Option<EntityRecord> {
        if self.cancel.is_cancelled() {
            tracing::debug!("Skipping {}: collection cancelled", id);
            return None;
        }

        tracing::info!("Starting data collection for user: {}", id);
        let user = match self.api.get_user(id.as_str()).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!("Error collecting single user data for {}: {}", id, e);
                return None;
            }
        };
        tracing::info!(
            "User {}: {} public repos, {} followers",
            id,
            user.public_repos,
            user.followers
        );

        let now = self.now.unwrap_or_else(Utc::now);
        let mut record = EntityRecord::from_identity(identity(id, &user), mode.fetch_mode());

        let repos = match self.api.list_user_repos(&user.login, None).await {
            Ok(repos) => Some(repos),
            Err(e) => {
                tracing::warn!("Failed to list repositories for {}: {}", id, e);
                None
            }
        };

        for section in Section::ORDER {
            if self.cancel.is_cancelled() {
                tracing::info!("Collection for {} cancelled, discarding partial record", id);
                return None;
            }

            self.progress.emit(&progress_message(section, id, mode));
            let result = self
                .collect_section(section, &user, repos.as_deref(), mode, now, &mut record)
                .await;
            if let Err(e) = result {
                tracing::warn!("Failed to collect {} for {}: {}", section, id, e);
            }
        }

        if self.cancel.is_cancelled() {
            tracing::info!("Collection for {} cancelled, discarding partial record", id);
            return None;
        }

        tracing::info!("Successfully collected data for user: {}", id);
        Some(record)
    }

    async fn collect_section(
        &self,
        section: Section,
        user: &User,
        repos: Option<&[Repository]>,
        mode: CollectionMode,
        now: DateTime<Utc>,
        record: &mut EntityRecord,
    ) -> Result<(), SectionError> {
        let api = self.api.as_ref();
        let login = user.login.as_str();

        let repos = match (section.needs_repositories(), repos) {
            (true, None) => return Err(SectionError::RepositoriesUnavailable { section }),
            (_, repos) => repos.unwrap_or_default(),
        };

        match section {
            Section::ExtendedProfile => {
                record.extended_user_data = extended::collect(api, user).await;
            }
            Section::DevelopmentPatterns => {
                record.development_patterns = patterns::collect(api, login, repos).await;
            }
            Section::CommitActivity => {
                record.commit_activity = ActivityResolver::new(Arc::clone(&self.api))
                    .with_cancellation(self.cancel.clone())
                    .with_now(now)
                    .resolve(login, repos, mode)
                    .await;
            }
            Section::SocialNetwork => {
                record.social_network = social::collect(api, user).await?;
            }
            Section::RepositoryPortfolio => {
                record.repository_portfolio = portfolio::collect(api, repos, now).await;
            }
            Section::ContributionQuality => {
                record.contribution_quality = quality::collect(api, login, repos).await;
            }
        }
        Ok(())
    }
}

fn identity(id: &EntityId, user: &User) -> Identity {
    Identity {
        username: id.as_str().to_string(),
        followers: user.followers,
        following: user.following,
        public_repos: user.public_repos,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

fn progress_message(section: Section, id: &EntityId, mode: CollectionMode) -> String {
    match section {
        Section::ExtendedProfile => format!("Collecting extended data for {id}"),
        Section::DevelopmentPatterns => format!("Analyzing development patterns for {id}"),
        Section::CommitActivity => format!(
            "Analyzing commit activity ({}) for {id}",
            mode.fetch_mode().label()
        ),
        Section::SocialNetwork => format!("Analyzing social network for {id}"),
        Section::RepositoryPortfolio => format!("Analyzing repository portfolio for {id}"),
        Section::ContributionQuality => format!("Analyzing contribution quality for {id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_messages() {
        let id = EntityId::new("alice").expect("valid id");
        assert_eq!(
            progress_message(Section::CommitActivity, &id, CollectionMode::all_commits()),
            "Analyzing commit activity (all commits) for alice"
        );
        assert_eq!(
            progress_message(Section::ExtendedProfile, &id, CollectionMode::recent()),
            "Collecting extended data for alice"
        );
    }
}
