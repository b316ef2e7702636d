//! Commit activity resolution.
//!
//! - [`strategy`] - ordered commit query strategies and escalation
//! - [`resolver`] - per-entity aggregation with scan and detail caps

pub mod resolver;
pub mod strategy;

pub use resolver::{
    ActivityResolver, DETAIL_CAP, MESSAGE_MAX_CHARS, UNBOUNDED_REPO_CAP, WINDOWED_REPO_CAP,
};
pub use strategy::{chain, escalate, CommitStrategy, StrategyContext};
