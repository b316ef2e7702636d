//! Append-only feature CSV.

use crate::error::{Result, SinkError};
use crate::features::FeatureRow;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// A CSV file of [`FeatureRow`]s; the header is written with the first row.
#[derive(Debug, Clone)]
pub struct CsvFeatureLog {
    path: PathBuf,
}

impl CsvFeatureLog {
    /// Bind to `path`; the file is created on first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, preceded by the header when the file is new or empty.
    pub fn append(&self, row: &FeatureRow) -> Result<()> {
        let needs_header = std::fs::metadata(&self.path).map_or(true, |m| m.len() == 0);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(SinkError::io(&self.path))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(row)?;
        writer.flush().map_err(SinkError::io(&self.path))
    }
}

/// Overwrite `path` with a header and one row per entry of `rows`.
pub(crate) fn write_all<'a>(
    path: &Path,
    rows: impl IntoIterator<Item = &'a FeatureRow>,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(SinkError::io(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hubmine_core::{EntityRecord, FetchMode, Identity};
    use tempfile::TempDir;

    fn row(username: &str) -> FeatureRow {
        let record = EntityRecord::from_identity(
            Identity {
                username: username.to_string(),
                followers: 1,
                following: 1,
                public_repos: 1,
                created_at: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
                updated_at: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            },
            FetchMode::Windowed,
        );
        FeatureRow::from_record(&record)
    }

    #[test]
    fn test_header_written_once() {
        let dir = TempDir::new().expect("temp dir");
        let log = CsvFeatureLog::new(dir.path().join("t_ml_features.csv"));

        log.append(&row("alice")).expect("first row");
        log.append(&row("bob")).expect("second row");

        let text = std::fs::read_to_string(log.path()).expect("read");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("username,followers,"));
        assert!(lines[1].starts_with("alice,"));
        assert!(lines[2].starts_with("bob,"));
    }

    #[test]
    fn test_rows_read_back() {
        let dir = TempDir::new().expect("temp dir");
        let log = CsvFeatureLog::new(dir.path().join("t_ml_features.csv"));
        log.append(&row("alice")).expect("append");

        let mut reader = csv::Reader::from_path(log.path()).expect("open");
        let rows: Vec<FeatureRow> = reader
            .deserialize()
            .collect::<std::result::Result<_, _>>()
            .expect("parse rows");

        assert_eq!(rows, [row("alice")]);
        assert_eq!(rows[0].total_commits, None);
    }
}
