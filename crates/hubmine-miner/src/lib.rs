//! Hubmine Miner - bounded-concurrency mining runs.
//!
//! Ties the pipeline together: every entity is collected on its own task,
//! at most `max_workers` at a time, and each record is optionally appended
//! to the export sink as soon as it is complete.
//!
//! # Example
//!
//! ```rust,no_run
//! use hubmine_core::MinerConfig;
//! use hubmine_miner::{MiningOrchestrator, RunOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MinerConfig::load_with_env()?;
//! let miner = MiningOrchestrator::from_config(&config)?;
//!
//! let options = RunOptions::from_config(&config).save_to("contributors");
//! let records = miner
//!     .mine_repository_contributors("https://github.com/rust-lang/cargo", &options)
//!     .await?;
//! println!("mined {} contributors", records.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod options;
pub mod orchestrator;

// Re-export commonly used types
pub use error::{MinerError, Result};
pub use options::{RunOptions, DEFAULT_MAX_WORKERS};
pub use orchestrator::MiningOrchestrator;
