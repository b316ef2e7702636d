use chrono::{TimeZone, Utc};
use hubmine_core::{EntityRecord, FetchMode, Identity};
use hubmine_export::{convert_json_to_csv, export_dataset, ExportSink, SinkError, COLUMNS};
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

fn record(username: &str) -> EntityRecord {
    let mut record = EntityRecord::from_identity(
        Identity {
            username: username.to_string(),
            followers: 5,
            following: 2,
            public_repos: 4,
            created_at: Utc.with_ymd_and_hms(2018, 3, 4, 5, 6, 7).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap(),
        },
        FetchMode::Windowed,
    );
    record.extended_user_data.bio = Some(format!("{username} writes Rüst"));
    record
}

fn read_array(path: &Path) -> Vec<Value> {
    let text = std::fs::read_to_string(path).expect("read json");
    serde_json::from_str(&text).expect("valid JSON array")
}

fn line_count(path: &Path) -> usize {
    std::fs::read_to_string(path).expect("read csv").lines().count()
}

#[tokio::test]
async fn test_sequential_appends() {
    let dir = TempDir::new().expect("temp dir");
    let sink = ExportSink::for_basename(dir.path().join("t"));

    sink.append_record(record("alice")).await.expect("append alice");
    sink.append_record(record("bob")).await.expect("append bob");

    let paths = sink.paths();
    assert_eq!(paths.json, dir.path().join("t_raw.json"));
    assert_eq!(paths.csv, dir.path().join("t_ml_features.csv"));

    let values = read_array(&paths.json);
    let names: Vec<_> = values.iter().map(|v| v["username"].as_str()).collect();
    assert_eq!(names, [Some("alice"), Some("bob")]);
    assert_eq!(values[0]["created_at"], "2018-03-04T05:06:07Z");
    assert!(values[0]["commit_activity"]["total_commits"].is_null());
    assert_eq!(values[0]["commit_activity"]["fetch_mode"], "recent");
    assert_eq!(line_count(&paths.csv), 3);

    let text = std::fs::read_to_string(&paths.json).expect("read json");
    assert!(text.contains("alice writes Rüst"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_keep_files_valid() {
    let dir = TempDir::new().expect("temp dir");
    let base = dir.path().join("many");

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let sink = ExportSink::for_basename(&base);
            tokio::spawn(async move { sink.append_record(record(&format!("user{i}"))).await })
        })
        .collect();
    for handle in handles {
        handle.await.expect("task").expect("append");
    }

    let sink = ExportSink::for_basename(&base);
    let mut names: Vec<String> = read_array(&sink.paths().json)
        .iter()
        .filter_map(|v| v["username"].as_str().map(str::to_string))
        .collect();
    names.sort();
    let mut expected: Vec<String> = (0..16).map(|i| format!("user{i}")).collect();
    expected.sort();
    assert_eq!(names, expected);
    assert_eq!(line_count(&sink.paths().csv), 17);
}

#[tokio::test]
async fn test_append_extends_existing_array() {
    let dir = TempDir::new().expect("temp dir");
    let base = dir.path().join("resume");
    export_dataset(&[record("first")], &base).expect("seed export");

    ExportSink::for_basename(&base)
        .append_record(record("second"))
        .await
        .expect("append");

    let sink = ExportSink::for_basename(&base);
    let values = read_array(&sink.paths().json);
    assert_eq!(values.len(), 2);
    assert_eq!(values[1]["username"], "second");
    assert_eq!(line_count(&sink.paths().csv), 3);
}

#[tokio::test]
async fn test_corrupt_json_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let sink = ExportSink::for_basename(dir.path().join("broken"));
    std::fs::write(&sink.paths().json, "[\n{\n  \"username\": \"al").expect("seed");

    let err = sink
        .append_record(record("bob"))
        .await
        .expect_err("corrupt");

    assert!(matches!(err, SinkError::Corrupt { .. }));
    assert!(!sink.paths().csv.exists());
}

#[test]
fn test_export_dataset_and_convert() {
    let dir = TempDir::new().expect("temp dir");
    let base = dir.path().join("batch");

    let paths = export_dataset(&[record("a"), record("b"), record("c")], &base)
        .expect("export")
        .expect("non-empty");
    assert_eq!(read_array(&paths.json).len(), 3);
    assert_eq!(line_count(&paths.csv), 4);

    let converted = convert_json_to_csv(&paths.json, None).expect("convert");
    assert_eq!(converted, dir.path().join("batch_raw_converted.csv"));
    let text = std::fs::read_to_string(&converted).expect("read converted");
    assert_eq!(text.lines().next(), Some(COLUMNS.join(",").as_str()));
    assert_eq!(
        text,
        std::fs::read_to_string(&paths.csv).expect("read exported")
    );
}

#[test]
fn test_export_empty_dataset_is_noop() {
    let dir = TempDir::new().expect("temp dir");
    let base = dir.path().join("nothing");

    assert!(export_dataset(&[], &base).expect("export").is_none());
    assert!(!dir.path().join("nothing_raw.json").exists());
}

#[test]
fn test_convert_empty_array_fails() {
    let dir = TempDir::new().expect("temp dir");
    let json = dir.path().join("empty_raw.json");
    std::fs::write(&json, "[]").expect("seed");

    let err = convert_json_to_csv(&json, Some(&dir.path().join("out.csv"))).expect_err("empty");

    assert!(matches!(err, SinkError::EmptyDataset { .. }));
    assert!(!dir.path().join("out.csv").exists());
}
