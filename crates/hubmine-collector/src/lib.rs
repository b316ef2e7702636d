//! Hubmine Collector - builds one fixed-shape record per mined entity.
//!
//! # Features
//!
//! - **Failure isolation**: only the identity fetch is mandatory; every other
//!   section degrades to its default shape on error
//! - **Strategy escalation**: commit history is fetched through an ordered
//!   chain of fallback queries, advancing only on query failure
//! - **Bounded cost**: repository scan caps and a capped commit detail list
//! - **Cooperative cancellation**: checked between sections and repositories
//!
//! # Example
//!
//! ```rust,no_run
//! use hubmine_collector::{EntityCollector, Progress};
//! use hubmine_core::{CollectionMode, EntityId, MinerConfig};
//! use hubmine_github::GitHubClient;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MinerConfig::load_with_env()?;
//! let api = Arc::new(GitHubClient::new(&config.github)?);
//!
//! let collector = EntityCollector::new(api)
//!     .with_progress(Progress::new(Arc::new(|msg: &str| println!("{msg}"))));
//! let id = EntityId::new("octocat")?;
//!
//! if let Some(record) = collector.collect(&id, config.collection_mode()).await {
//!     println!("{} recent commits", record.commit_activity.total_recent_commits);
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

pub mod activity;
pub mod collector;
pub mod error;
pub mod progress;
pub mod sections;

// Re-export commonly used types
pub use activity::{ActivityResolver, CommitStrategy};
pub use collector::EntityCollector;
pub use error::{Section, SectionError};
pub use progress::{Progress, ProgressCallback};
