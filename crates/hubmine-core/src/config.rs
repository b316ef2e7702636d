//! Configuration management for hubmine.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. The token is never written to disk.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{CollectionMode, DEFAULT_WINDOW_DAYS};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main miner configuration.
///
/// This is loaded from `~/.config/hubmine/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Remote API settings
    pub github: GitHubConfig,
    /// Worker pool and commit analysis settings
    pub collection: CollectionConfig,
    /// Incremental export settings
    pub export: ExportConfig,
}

impl MinerConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if
    /// the file does not exist.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `HUBMINE_GITHUB_TOKEN` (or `GITHUB_TOKEN`): API token
    /// - `HUBMINE_MAX_WORKERS`: worker pool size
    /// - `HUBMINE_FETCH_ALL_COMMITS`: unbounded commit mode (true/false)
    /// - `HUBMINE_WINDOW_DAYS`: trailing window length
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in
    /// [`MinerConfig::load_with_env`]). Unparseable values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("HUBMINE_GITHUB_TOKEN").or_else(|| lookup("GITHUB_TOKEN")) {
            if !token.trim().is_empty() {
                self.github.token = Some(token.trim().to_string());
                tracing::debug!("Override github.token from env");
            }
        }

        if let Some(val) = lookup("HUBMINE_MAX_WORKERS") {
            if let Ok(workers) = val.parse() {
                self.collection.max_workers = workers;
                tracing::debug!("Override collection.max_workers from env: {}", workers);
            }
        }

        if let Some(val) = lookup("HUBMINE_FETCH_ALL_COMMITS") {
            if let Ok(all) = val.parse() {
                self.collection.fetch_all_commits = all;
                tracing::debug!("Override collection.fetch_all_commits from env: {}", all);
            }
        }

        if let Some(val) = lookup("HUBMINE_WINDOW_DAYS") {
            if let Ok(days) = val.parse() {
                self.collection.window_days = days;
                tracing::debug!("Override collection.window_days from env: {}", days);
            }
        }
    }

    /// Check cross-field constraints before any work is dispatched.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.collection.max_workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "collection.max_workers".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.github.per_page == 0 || self.github.per_page > 100 {
            return Err(ConfigError::InvalidValue {
                field: "github.per_page".to_string(),
                reason: format!("must be between 1 and 100, got {}", self.github.per_page),
            });
        }

        if self.export.save_immediately && self.export.basename().is_none() {
            return Err(ConfigError::MissingSinkBasename);
        }

        Ok(())
    }

    /// The collection mode described by this configuration.
    #[must_use]
    pub fn collection_mode(&self) -> CollectionMode {
        CollectionMode {
            fetch_all_commits: self.collection.fetch_all_commits,
            window_days: self.collection.window_days,
        }
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> ConfigResult<()> {
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/hubmine/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("dev", "hubmine", "hubmine").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path, the default home for exports.
    ///
    /// Uses XDG base directories: `~/.local/share/hubmine`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("dev", "hubmine", "hubmine").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// Remote API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API base URL
    pub api_url: String,
    /// User agent string (the API rejects requests without one)
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Page size for list endpoints (max 100)
    pub per_page: u32,
    /// API token, supplied through the environment only
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            user_agent: "hubmine/0.1.0 (+https://github.com/hubmine/hubmine)".to_string(),
            timeout_secs: 30,
            per_page: 100,
            token: None,
        }
    }
}

/// Worker pool and commit analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Number of entities collected concurrently
    pub max_workers: usize,
    /// Trailing window for commit analysis, in days
    pub window_days: u32,
    /// Count every commit instead of only the trailing window
    pub fetch_all_commits: bool,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            max_workers: 2,
            window_days: DEFAULT_WINDOW_DAYS,
            fetch_all_commits: false,
        }
    }
}

/// Incremental export settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Append every record to the sink as soon as it is collected
    pub save_immediately: bool,
    /// Destination basename; files are `<basename>_raw.json` and
    /// `<basename>_ml_features.csv`
    pub basename: Option<PathBuf>,
}

impl ExportConfig {
    /// The basename, treating an empty path as absent.
    #[must_use]
    pub fn basename(&self) -> Option<&Path> {
        self.basename
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = MinerConfig::default();
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.collection.max_workers, 2);
        assert_eq!(config.collection.window_days, 90);
        assert!(!config.collection.fetch_all_commits);
        assert!(!config.export.save_immediately);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization_skips_token() {
        let mut config = MinerConfig::default();
        config.github.token = Some("secret".to_string());

        let toml_str = toml::to_string_pretty(&config).expect("serialize config");
        assert!(toml_str.contains("[github]"));
        assert!(toml_str.contains("[collection]"));
        assert!(!toml_str.contains("secret"));

        let parsed: MinerConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert!(parsed.github.token.is_none());
        assert_eq!(parsed.collection.max_workers, 2);
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("nested").join("config.toml");

        let mut config = MinerConfig::default();
        config.collection.max_workers = 6;
        config.export.save_immediately = true;
        config.export.basename = Some(PathBuf::from("out/run"));
        config.save_to(&config_path).expect("save config");

        let loaded = MinerConfig::load_from(&config_path).expect("load config");
        assert_eq!(loaded.collection.max_workers, 6);
        assert_eq!(loaded.export.basename(), Some(Path::new("out/run")));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = TempDir::new().expect("create temp dir");
        let loaded = MinerConfig::load_from(&tmp.path().join("absent.toml")).expect("load");
        assert_eq!(loaded.collection.window_days, 90);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("GITHUB_TOKEN", "ghp_fallback"),
            ("HUBMINE_MAX_WORKERS", "8"),
            ("HUBMINE_FETCH_ALL_COMMITS", "true"),
            ("HUBMINE_WINDOW_DAYS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = MinerConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.github.token.as_deref(), Some("ghp_fallback"));
        assert_eq!(config.collection.max_workers, 8);
        assert!(config.collection.fetch_all_commits);
        assert_eq!(config.collection.window_days, 90);
        assert!(config.collection_mode().fetch_all_commits);
    }

    #[test]
    fn test_prefixed_token_wins() {
        let mut config = MinerConfig::default();
        config.apply_overrides(|key| match key {
            "HUBMINE_GITHUB_TOKEN" => Some("ghp_primary".to_string()),
            "GITHUB_TOKEN" => Some("ghp_fallback".to_string()),
            _ => None,
        });
        assert_eq!(config.github.token.as_deref(), Some("ghp_primary"));
    }

    #[test]
    fn test_validate_missing_basename() {
        let mut config = MinerConfig::default();
        config.export.save_immediately = true;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingSinkBasename)
        ));

        config.export.basename = Some(PathBuf::new());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingSinkBasename)
        ));
    }

    #[test]
    fn test_validate_worker_count() {
        let mut config = MinerConfig::default();
        config.collection.max_workers = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[collection]
max_workers = 4
fetch_all_commits = true
"#;

        let config: MinerConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.collection.max_workers, 4);
        assert!(config.collection.fetch_all_commits);
        assert_eq!(config.collection.window_days, 90);
        assert_eq!(config.github.per_page, 100);
    }
}
