//! Per-run options.

use hubmine_core::{CollectionMode, ConfigError, ConfigResult, MinerConfig};
use hubmine_export::ExportSink;
use std::path::{Path, PathBuf};

/// Default number of entities mined concurrently.
pub const DEFAULT_MAX_WORKERS: usize = 2;

/// Options for one [`run`](crate::MiningOrchestrator::run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Commit window and fetch mode
    pub mode: CollectionMode,
    /// Entities mined at the same time
    pub max_workers: usize,
    /// Append every record to the sink as soon as it is collected
    pub save_immediately: bool,
    /// Sink basename; required when `save_immediately` is set
    pub basename: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mode: CollectionMode::recent(),
            max_workers: DEFAULT_MAX_WORKERS,
            save_immediately: false,
            basename: None,
        }
    }
}

impl RunOptions {
    /// Options taken from the `[collection]` and `[export]` sections.
    #[must_use]
    pub fn from_config(config: &MinerConfig) -> Self {
        Self {
            mode: config.collection_mode(),
            max_workers: config.collection.max_workers,
            save_immediately: config.export.save_immediately,
            basename: config.export.basename().map(Path::to_path_buf),
        }
    }

    /// Use `mode` for commit activity.
    #[must_use]
    pub fn with_mode(mut self, mode: CollectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Mine up to `max_workers` entities at once.
    #[must_use]
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Save every record immediately to `<base>_raw.json` and
    /// `<base>_ml_features.csv`.
    #[must_use]
    pub fn save_to(mut self, base: impl Into<PathBuf>) -> Self {
        self.save_immediately = true;
        self.basename = Some(base.into());
        self
    }

    /// Check the options before any work is dispatched.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_workers".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.save_immediately && self.basename().is_none() {
            return Err(ConfigError::MissingSinkBasename);
        }
        Ok(())
    }

    /// The sink for immediate saving, if enabled.
    pub(crate) fn sink(&self) -> Option<ExportSink> {
        if !self.save_immediately {
            return None;
        }
        self.basename().map(ExportSink::for_basename)
    }

    fn basename(&self) -> Option<&Path> {
        self.basename
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}
