//! Extended profile: profile fields plus a handful of public lists.

use hubmine_core::record::{
    EventSummary, ExtendedProfile, GistSummary, OrganizationSummary, StarredRepo, WatchedRepo,
};
use hubmine_github::{GitHubApi, User};

const STARRED_LIMIT: usize = 10;
const WATCHED_LIMIT: usize = 10;
const GIST_LIMIT: usize = 10;
const EVENT_LIMIT: usize = 50;

/// Build the extended profile from an already-fetched user.
///
/// Each list is fetched independently; a failed list is logged and left
/// empty.
pub async fn collect(api: &dyn GitHubApi, user: &User) -> ExtendedProfile {
    let login = user.login.as_str();
    let mut profile = ExtendedProfile {
        email: user.email.clone(),
        location: user.location.clone(),
        bio: user.bio.clone(),
        company: user.company.clone(),
        blog: user.blog.clone(),
        twitter_username: user.twitter_username.clone(),
        hireable: user.hireable,
        public_gists: user.public_gists,
        avatar_url: user.avatar_url.clone(),
        ..ExtendedProfile::default()
    };

    match api.list_starred(login, Some(STARRED_LIMIT)).await {
        Ok(repos) => {
            profile.starred_repos = repos
                .into_iter()
                .map(|r| StarredRepo {
                    full_name: r.full_name,
                    stars: r.stargazers_count,
                })
                .collect();
        }
        Err(e) => tracing::warn!("Error fetching starred repos for {}: {}", login, e),
    }

    match api.list_subscriptions(login, Some(WATCHED_LIMIT)).await {
        Ok(repos) => {
            profile.watched_repos = repos
                .into_iter()
                .map(|r| WatchedRepo {
                    full_name: r.full_name,
                    watchers: r.watchers_count,
                })
                .collect();
        }
        Err(e) => tracing::warn!("Error fetching watched repos for {}: {}", login, e),
    }

    match api.list_gists(login, Some(GIST_LIMIT)).await {
        Ok(gists) => {
            profile.gists = gists
                .into_iter()
                .map(|g| GistSummary {
                    id: g.id,
                    description: g.description,
                    created_at: g.created_at,
                })
                .collect();
        }
        Err(e) => tracing::warn!("Error fetching gists for {}: {}", login, e),
    }

    match api.list_orgs(login).await {
        Ok(orgs) => {
            profile.organizations = orgs
                .into_iter()
                .map(|o| OrganizationSummary {
                    login: o.login,
                    description: o.description,
                })
                .collect();
        }
        Err(e) => tracing::warn!("Error fetching organizations for {}: {}", login, e),
    }

    match api.list_events(login, Some(EVENT_LIMIT)).await {
        Ok(events) => {
            profile.events = events
                .into_iter()
                .map(|e| EventSummary {
                    event_type: e.event_type,
                    repo: e.repo.name,
                    created_at: e.created_at,
                })
                .collect();
        }
        Err(e) => tracing::warn!("Error fetching events for {}: {}", login, e),
    }

    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubmine_github::fake::{self, FakeGitHub};
    use hubmine_github::Organization;

    #[tokio::test]
    async fn test_failed_list_is_left_empty() {
        let mut user = fake::user("carol", 0, 0, 0);
        user.location = Some("Lisbon".to_string());
        user.public_gists = 2;

        let api = FakeGitHub::new()
            .with_starred("carol", (0..15).map(|i| fake::repo("x", &format!("r{i}"))).collect())
            .with_orgs(
                "carol",
                vec![Organization {
                    login: "acme".to_string(),
                    description: None,
                }],
            )
            .failing("list_gists");

        let profile = collect(&api, &user).await;

        assert_eq!(profile.location.as_deref(), Some("Lisbon"));
        assert_eq!(profile.public_gists, 2);
        assert_eq!(profile.starred_repos.len(), STARRED_LIMIT);
        assert_eq!(profile.starred_repos[0].full_name, "x/r0");
        assert!(profile.gists.is_empty());
        assert_eq!(profile.organizations[0].login, "acme");
        assert!(profile.events.is_empty());
    }
}
