//! Whole-dataset export and JSON to CSV conversion.

use crate::csv_log;
use crate::error::{Result, SinkError};
use crate::features::FeatureRow;
use crate::sink::{ExportSink, SinkPaths};
use hubmine_core::EntityRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Overwrite `<base>_raw.json` and `<base>_ml_features.csv` with `records`.
///
/// Returns the written paths, or `None` when there was nothing to export.
pub fn export_dataset(
    records: &[EntityRecord],
    base: impl AsRef<Path>,
) -> Result<Option<SinkPaths>> {
    if records.is_empty() {
        tracing::warn!("No data to export");
        return Ok(None);
    }

    let sink = ExportSink::for_basename(base);
    let paths = sink.paths().clone();
    let _guard = sink.guard();

    let rows: Vec<FeatureRow> = records.iter().map(FeatureRow::from_record).collect();
    write_json(&paths.json, records)?;
    csv_log::write_all(&paths.csv, &rows)?;

    tracing::info!(
        "Exported {} records to {} and {}",
        records.len(),
        paths.json.display(),
        paths.csv.display()
    );
    Ok(Some(paths))
}

/// Write the feature CSV of a raw JSON export.
///
/// Defaults to `<json stem>_converted.csv` next to the input.
pub fn convert_json_to_csv(
    json_path: impl AsRef<Path>,
    csv_path: Option<&Path>,
) -> Result<PathBuf> {
    let json_path = json_path.as_ref();
    let text = std::fs::read_to_string(json_path).map_err(SinkError::io(json_path))?;
    let records: Vec<EntityRecord> =
        serde_json::from_str(&text).map_err(|e| SinkError::corrupt(json_path, e.to_string()))?;

    if records.is_empty() {
        return Err(SinkError::EmptyDataset {
            path: json_path.to_path_buf(),
        });
    }

    let csv_path = csv_path.map_or_else(|| converted_path(json_path), Path::to_path_buf);
    let rows: Vec<FeatureRow> = records.iter().map(FeatureRow::from_record).collect();
    csv_log::write_all(&csv_path, &rows)?;

    tracing::info!(
        "Converted {} records from {} to {}",
        rows.len(),
        json_path.display(),
        csv_path.display()
    );
    Ok(csv_path)
}

fn converted_path(json_path: &Path) -> PathBuf {
    let stem = json_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    json_path.with_file_name(format!("{stem}_converted.csv"))
}

fn write_json(path: &Path, records: &[EntityRecord]) -> Result<()> {
    let file = File::create(path).map_err(SinkError::io(path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush().map_err(SinkError::io(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converted_path() {
        assert_eq!(
            converted_path(Path::new("data/t_raw.json")),
            PathBuf::from("data/t_raw_converted.csv")
        );
    }
}
