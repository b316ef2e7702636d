//! Social network: follower samples and derived influence figures.

use crate::error::{Result, Section, SectionError};
use hubmine_core::record::{Connection, SocialNetwork};
use hubmine_github::{Account, GitHubApi, User};
use std::collections::BTreeSet;

/// Followers and following sampled.
const SAMPLE_LIMIT: usize = 50;

/// Collect follower samples for `user`.
///
/// Fails when either sample cannot be listed.
#[allow(clippy::cast_precision_loss)]
pub async fn collect(api: &dyn GitHubApi, user: &User) -> Result<SocialNetwork> {
    let login = user.login.as_str();
    let followers = api
        .list_followers(login, Some(SAMPLE_LIMIT))
        .await
        .map_err(|e| SectionError::upstream(Section::SocialNetwork, e))?;
    let following = api
        .list_following(login, Some(SAMPLE_LIMIT))
        .await
        .map_err(|e| SectionError::upstream(Section::SocialNetwork, e))?;

    let follower_logins: BTreeSet<&str> = followers.iter().map(|a| a.login.as_str()).collect();
    let mutual_connections: Vec<String> = following
        .iter()
        .map(|a| a.login.as_str())
        .filter(|l| follower_logins.contains(l))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let social_influence_score = user.followers as f64 * 0.6
        + user.public_repos as f64 * 0.3
        + mutual_connections.len() as f64 * 0.1;

    Ok(SocialNetwork {
        followers_list: followers.into_iter().map(to_connection).collect(),
        following_list: following.into_iter().map(to_connection).collect(),
        follower_to_following_ratio: super::ratio(user.followers, user.following),
        social_influence_score,
        mutual_connections,
    })
}

fn to_connection(account: Account) -> Connection {
    Connection {
        login: account.login,
        html_url: account.html_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubmine_github::fake::{self, FakeGitHub};

    #[tokio::test]
    async fn test_social_network() {
        let user = fake::user("frank", 10, 4, 5);
        let api = FakeGitHub::new()
            .with_followers(
                "frank",
                vec![fake::account("gia"), fake::account("hal"), fake::account("ivy")],
            )
            .with_following("frank", vec![fake::account("ivy"), fake::account("gia")]);

        let social = collect(&api, &user).await.expect("collect social");

        assert_eq!(social.followers_list.len(), 3);
        assert_eq!(social.following_list.len(), 2);
        assert_eq!(social.mutual_connections, ["gia", "ivy"]);
        assert!((social.follower_to_following_ratio - 2.5).abs() < 1e-9);
        assert!((social.social_influence_score - 7.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_following_nobody() {
        let user = fake::user("solo", 3, 0, 0);
        let social = collect(&FakeGitHub::new(), &user).await.expect("collect");
        assert!(social.follower_to_following_ratio.abs() < f64::EPSILON);
        assert!(social.mutual_connections.is_empty());
    }

    #[tokio::test]
    async fn test_failed_sample_is_an_error() {
        let user = fake::user("frank", 1, 1, 1);
        let api = FakeGitHub::new().failing("list_following");
        let err = collect(&api, &user).await.expect_err("following fails");
        assert_eq!(err.section(), Section::SocialNetwork);
    }
}
