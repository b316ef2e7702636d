//! Hubmine Core - Foundation crate for the hubmine collection pipeline.
//!
//! This crate provides shared types, error handling, configuration management,
//! and the record model that all other hubmine crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Shared newtypes and enums (`EntityId`, `FetchMode`, `CollectionMode`)
//! - [`record`] - The fixed-shape `EntityRecord` produced for every mined entity
//!
//! # Example
//!
//! ```rust
//! use hubmine_core::{CollectionMode, EntityId, MinerConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MinerConfig::default();
//! config.validate()?;
//!
//! let mode: CollectionMode = config.collection_mode();
//! let entity = EntityId::new("octocat")?;
//! println!("mining {entity} in {} mode", mode.fetch_mode());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod record;
pub mod types;

// Re-export commonly used types
pub use config::{CollectionConfig, ExportConfig, GitHubConfig, MinerConfig};
pub use error::{ConfigError, ConfigResult, HubmineError, Result};
pub use record::{ActivitySummary, ChangeStats, CommitRecord, EntityRecord, Identity};
pub use types::{CollectionMode, EntityId, FetchMode};
