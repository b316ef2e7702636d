//! Hubmine GitHub - the remote API collaborator of the collection pipeline.
//!
//! The pipeline is written against the [`GitHubApi`] trait. [`GitHubClient`]
//! implements it over the REST API with reqwest; `FakeGitHub` (behind the
//! `fake` feature) implements it in memory for tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use hubmine_core::MinerConfig;
//! use hubmine_github::{CommitQuery, GitHubApi, GitHubClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MinerConfig::load_with_env()?;
//! let client = GitHubClient::new(&config.github)?;
//!
//! let user = client.get_user("octocat").await?;
//! let repos = client.list_user_repos(&user.login, Some(10)).await?;
//! for repo in &repos {
//!     let commits = client
//!         .list_commits(&repo.full_name, &CommitQuery::new().by_author(&user.login).with_limit(5))
//!         .await?;
//!     println!("{}: {} commits", repo.full_name, commits.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod api;
pub mod client;
pub mod error;
#[cfg(any(test, feature = "fake"))]
pub mod fake;
pub mod models;
pub mod repo_url;

// Re-export commonly used types
pub use api::{CommitQuery, GitHubApi};
pub use client::GitHubClient;
pub use error::{ApiError, Result};
#[cfg(any(test, feature = "fake"))]
pub use fake::{FakeGitHub, QueryShape};
pub use models::{
    Account, Commit, CommitStats, ContentEntry, Contributor, Event, Gist, Issue, Organization,
    PullRequest, Repository, User,
};
pub use repo_url::{parse_repo_url, RepoRef};
