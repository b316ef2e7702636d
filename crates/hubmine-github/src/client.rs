//! reqwest-backed implementation of [`GitHubApi`].

use crate::api::{CommitQuery, GitHubApi};
use crate::error::{ApiError, Result};
use crate::models::{
    Account, Commit, ContentEntry, Contributor, Event, Gist, Issue, Organization, PullRequest,
    Repository, User,
};
use async_trait::async_trait;
use chrono::SecondsFormat;
use hubmine_core::GitHubConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;

const API_VERSION: &str = "2022-11-28";

/// GitHub REST client.
///
/// Sends `Accept: application/vnd.github+json`, the configured user agent and,
/// when a token is configured, `Authorization: Bearer <token>`.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    per_page: u32,
}

impl GitHubClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            per_page: config.per_page.clamp(1, 100),
        })
    }

    /// Point the client at another API root (GitHub Enterprise, a local stub).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(request: RequestBuilder, resource: &str) -> Result<Response> {
        let response = request.send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let rate_exhausted = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            == Some("0");
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(classify_status(
            status.as_u16(),
            rate_exhausted,
            resource,
            message,
        ))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let request = self.client.get(self.url(path)).query(query);
        let response = Self::send(request, path).await?;

        response.json().await.map_err(|e| ApiError::Parse {
            resource: path.to_string(),
            message: format!("Failed to parse response: {e}"),
        })
    }

    /// Walk `?page=N` until a short page or the item limit.
    async fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        limit: Option<usize>,
    ) -> Result<Vec<T>> {
        if limit == Some(0) {
            return Ok(Vec::new());
        }

        let per_page = page_size(self.per_page, limit);
        let mut items: Vec<T> = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut query = params.to_vec();
            query.push(("per_page", per_page.to_string()));
            query.push(("page", page.to_string()));

            tracing::debug!("GET {} page {}", path, page);
            let batch: Vec<T> = self.get_json(path, &query).await?;
            let received = batch.len();
            items.extend(batch);

            if let Some(limit) = limit {
                if items.len() >= limit {
                    items.truncate(limit);
                    break;
                }
            }
            if received < per_page as usize {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn get_user(&self, login: &str) -> Result<User> {
        self.get_json(&format!("/users/{login}"), &[]).await
    }

    async fn list_user_repos(&self, login: &str, limit: Option<usize>) -> Result<Vec<Repository>> {
        self.get_paginated(
            &format!("/users/{login}/repos"),
            &[("type", "owner".to_string())],
            limit,
        )
        .await
    }

    async fn list_commits(&self, full_name: &str, query: &CommitQuery) -> Result<Vec<Commit>> {
        let mut params = Vec::new();
        if let Some(author) = &query.author {
            params.push(("author", author.clone()));
        }
        if let Some(since) = query.since {
            params.push(("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        self.get_paginated(&format!("/repos/{full_name}/commits"), &params, query.limit)
            .await
    }

    async fn get_commit(&self, full_name: &str, sha: &str) -> Result<Commit> {
        self.get_json(&format!("/repos/{full_name}/commits/{sha}"), &[])
            .await
    }

    async fn list_starred(&self, login: &str, limit: Option<usize>) -> Result<Vec<Repository>> {
        self.get_paginated(&format!("/users/{login}/starred"), &[], limit)
            .await
    }

    async fn list_subscriptions(
        &self,
        login: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Repository>> {
        self.get_paginated(&format!("/users/{login}/subscriptions"), &[], limit)
            .await
    }

    async fn list_gists(&self, login: &str, limit: Option<usize>) -> Result<Vec<Gist>> {
        self.get_paginated(&format!("/users/{login}/gists"), &[], limit)
            .await
    }

    async fn list_orgs(&self, login: &str) -> Result<Vec<Organization>> {
        self.get_paginated(&format!("/users/{login}/orgs"), &[], None)
            .await
    }

    async fn list_events(&self, login: &str, limit: Option<usize>) -> Result<Vec<Event>> {
        self.get_paginated(&format!("/users/{login}/events/public"), &[], limit)
            .await
    }

    async fn list_followers(&self, login: &str, limit: Option<usize>) -> Result<Vec<Account>> {
        self.get_paginated(&format!("/users/{login}/followers"), &[], limit)
            .await
    }

    async fn list_following(&self, login: &str, limit: Option<usize>) -> Result<Vec<Account>> {
        self.get_paginated(&format!("/users/{login}/following"), &[], limit)
            .await
    }

    async fn repo_languages(&self, full_name: &str) -> Result<BTreeMap<String, u64>> {
        self.get_json(&format!("/repos/{full_name}/languages"), &[])
            .await
    }

    async fn get_readme(&self, full_name: &str) -> Result<String> {
        let path = format!("/repos/{full_name}/readme");
        let request = self
            .client
            .get(self.url(&path))
            .header(ACCEPT, "application/vnd.github.raw+json");
        let response = Self::send(request, &path).await?;

        response.text().await.map_err(|e| ApiError::Parse {
            resource: path,
            message: format!("Failed to read README: {e}"),
        })
    }

    async fn list_pulls(&self, full_name: &str, limit: Option<usize>) -> Result<Vec<PullRequest>> {
        self.get_paginated(
            &format!("/repos/{full_name}/pulls"),
            &[("state", "all".to_string())],
            limit,
        )
        .await
    }

    async fn get_pull(&self, full_name: &str, number: u64) -> Result<PullRequest> {
        self.get_json(&format!("/repos/{full_name}/pulls/{number}"), &[])
            .await
    }

    async fn list_issues(
        &self,
        full_name: &str,
        creator: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Issue>> {
        self.get_paginated(
            &format!("/repos/{full_name}/issues"),
            &[("state", "all".to_string()), ("creator", creator.to_string())],
            limit,
        )
        .await
    }

    async fn list_root_contents(&self, full_name: &str) -> Result<Vec<ContentEntry>> {
        self.get_json(&format!("/repos/{full_name}/contents/"), &[])
            .await
    }

    async fn list_contributors(
        &self,
        full_name: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Contributor>> {
        self.get_paginated(&format!("/repos/{full_name}/contributors"), &[], limit)
            .await
    }
}

/// Build the HTTP client with the API's default headers.
///
/// # Errors
/// Returns error if the token is not a valid header value or the client
/// cannot be created.
fn build_http_client(config: &GitHubConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

    if let Some(token) = &config.token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ApiError::Internal(format!("invalid token header: {e}")))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| ApiError::Internal(format!("failed to create HTTP client: {e}")))
}

fn page_size(per_page: u32, limit: Option<usize>) -> u32 {
    let per_page = per_page.clamp(1, 100);
    match limit {
        Some(limit) => u32::try_from(limit).unwrap_or(u32::MAX).clamp(1, per_page),
        None => per_page,
    }
}

fn classify_status(status: u16, rate_exhausted: bool, resource: &str, message: String) -> ApiError {
    match status {
        404 => ApiError::NotFound {
            resource: resource.to_string(),
        },
        429 => ApiError::RateLimited { message },
        403 if rate_exhausted => ApiError::RateLimited { message },
        _ => ApiError::Status { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let mut config = GitHubConfig::default();
        config.token = Some("ghp_test".to_string());
        let client = GitHubClient::new(&config).expect("create client");
        assert_eq!(client.url("/users/octocat"), "https://api.github.com/users/octocat");
        assert_eq!(client.per_page, 100);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let mut config = GitHubConfig::default();
        config.token = Some("bad\ntoken".to_string());
        assert!(matches!(
            GitHubClient::new(&config),
            Err(ApiError::Internal(_))
        ));
    }

    #[test]
    fn test_base_url_override() {
        let client = GitHubClient::new(&GitHubConfig::default())
            .expect("create client")
            .with_base_url("http://localhost:8080/api/");
        assert_eq!(client.url("/users/a"), "http://localhost:8080/api/users/a");
    }

    #[test]
    fn test_page_size() {
        assert_eq!(page_size(100, None), 100);
        assert_eq!(page_size(100, Some(10)), 10);
        assert_eq!(page_size(30, Some(50)), 30);
        assert_eq!(page_size(0, None), 1);
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(404, false, "/users/x", String::new()),
            ApiError::NotFound { .. }
        ));
        assert!(classify_status(429, false, "/x", String::new()).is_rate_limited());
        assert!(classify_status(403, true, "/x", String::new()).is_rate_limited());
        assert!(matches!(
            classify_status(403, false, "/x", "forbidden".to_string()),
            ApiError::Status { status: 403, .. }
        ));
        assert!(matches!(
            classify_status(409, false, "/x", String::new()),
            ApiError::Status { status: 409, .. }
        ));
    }
}
