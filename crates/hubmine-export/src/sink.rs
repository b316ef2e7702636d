//! The paired JSON + CSV sink used for immediate saving.
//!
//! Appends to one file pair are serialized through a mutex that is shared by
//! every [`ExportSink`] bound to the same paths, so independent workers can
//! each hold their own sink.

use crate::csv_log::CsvFeatureLog;
use crate::error::{Result, SinkError};
use crate::features::FeatureRow;
use crate::json_log::JsonArrayLog;
use hubmine_core::EntityRecord;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Suffix of the raw record array.
pub const JSON_SUFFIX: &str = "_raw.json";
/// Suffix of the feature table.
pub const CSV_SUFFIX: &str = "_ml_features.csv";

type PairLock = Arc<Mutex<()>>;

/// The two files written for a basename.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SinkPaths {
    /// `<base>_raw.json`
    pub json: PathBuf,
    /// `<base>_ml_features.csv`
    pub csv: PathBuf,
}

impl SinkPaths {
    /// Derive both paths from `base`.
    #[must_use]
    pub fn for_basename(base: &Path) -> Self {
        Self {
            json: with_suffix(base, JSON_SUFFIX),
            csv: with_suffix(base, CSV_SUFFIX),
        }
    }

    fn lock(&self) -> PairLock {
        static REGISTRY: OnceLock<Mutex<HashMap<SinkPaths, PairLock>>> = OnceLock::new();
        let registry = REGISTRY.get_or_init(|| Mutex::new(HashMap::new()));
        let mut locks = registry.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(self.clone()).or_default())
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Incremental persistence of records to a file pair.
#[derive(Debug, Clone)]
pub struct ExportSink {
    paths: SinkPaths,
    json: JsonArrayLog,
    csv: CsvFeatureLog,
    lock: PairLock,
}

impl ExportSink {
    /// Bind a sink to `<base>_raw.json` and `<base>_ml_features.csv`.
    #[must_use]
    pub fn for_basename(base: impl AsRef<Path>) -> Self {
        let paths = SinkPaths::for_basename(base.as_ref());
        Self {
            json: JsonArrayLog::new(&paths.json),
            csv: CsvFeatureLog::new(&paths.csv),
            lock: paths.lock(),
            paths,
        }
    }

    /// The files this sink writes.
    #[must_use]
    pub fn paths(&self) -> &SinkPaths {
        &self.paths
    }

    /// Append `record` to both files on the blocking pool.
    pub async fn append_record(&self, record: EntityRecord) -> Result<()> {
        let sink = self.clone();
        tokio::task::spawn_blocking(move || sink.append_blocking(&record))
            .await
            .map_err(|e| SinkError::Task(e.to_string()))?
    }

    /// Append `record` to both files on the current thread.
    ///
    /// The JSON file is written first; when that fails the CSV row is not
    /// written either, keeping both files in step.
    pub fn append_blocking(&self, record: &EntityRecord) -> Result<()> {
        let row = FeatureRow::from_record(record);
        let _guard = self.guard();

        self.json.append(record)?;
        self.csv.append(&row)?;
        tracing::debug!(
            "Saved {} to {} and {}",
            record.username(),
            self.paths.json.display(),
            self.paths.csv.display()
        );
        Ok(())
    }

    pub(crate) fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
