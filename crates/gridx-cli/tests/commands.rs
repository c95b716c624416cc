//! Integration tests for the command layer.

use std::fs;
use std::path::{Path, PathBuf};

use gridx_cli::commands::{read_records, run_export, run_import, run_summary};
use gridx_model::{ColumnType, Value};
use gridx_transfer::{AdapterError, ErrorKind, MessageType};

const RECORDS: &str = r#"{
  "columns": [
    {"name": "Name", "type": "Text"},
    {"name": "Val", "type": "Number"},
    {"name": "Secret", "type": "Text"}
  ],
  "records": [
    [{"kind": "Text", "value": "Ann"}, {"kind": "Number", "value": 3.5}, {"kind": "Text", "value": "x"}],
    [{"kind": "Text", "value": "B, C"}, {"kind": "Number", "value": -1.0}, {"kind": "Null"}]
  ]
}"#;

fn workspace(dir: &Path) -> (PathBuf, PathBuf) {
    let config = dir.join("gridx.toml");
    fs::write(
        &config,
        format!(
            r#"[store]
endpoint = "file://{}"
access_key_id = "id"
secret_access_key = "secret"

[tables.Orders]
bucket = "exports"
key = "orders.csv"
columns = [{{ name = "Secret", export = false }}]

[tables.Feed]
bucket = "exports"
key = "feed.json"
message_type = "JSON"

[tables.Broken]
bucket = "exports"
key = "broken.bin"
message_type = "YAML"
"#,
            dir.join("store").display()
        ),
    )
    .unwrap();
    let input = dir.join("records.json");
    fs::write(&input, RECORDS).unwrap();
    (config, input)
}

#[test]
fn test_read_records_dump() {
    let dir = tempfile::tempdir().unwrap();
    let (_, input) = workspace(dir.path());
    let records = read_records(&input).unwrap();
    assert_eq!(records.column_names(), vec!["Name", "Val", "Secret"]);
    assert_eq!(records.records()[1].get(2), Some(&Value::Null));
}

#[test]
fn test_csv_export_and_import() {
    let dir = tempfile::tempdir().unwrap();
    let (config, input) = workspace(dir.path());

    let exported = run_export(&config, "Orders", &input).unwrap();
    assert_eq!(exported.report.rows, 2);
    assert_eq!(
        fs::read_to_string(dir.path().join("store/exports/orders.csv")).unwrap(),
        "Name,Val\nAnn,3.5\n\"B, C\",-1\n"
    );

    let imported = run_import(&config, "Orders").unwrap();
    let columns = imported.records.columns();
    assert_eq!(columns[1].column_type, ColumnType::Number);
    assert_eq!(imported.records.len(), 2);
    assert_eq!(
        imported.summary.as_deref(),
        Some(format!(
            "Bound to Amazon S3 CSV: Region = file://{}, Bucket = exports, Key = orders.csv, Use headers = true, Separator = ','",
            dir.path().join("store").display()
        ))
        .as_deref()
    );
}

#[test]
fn test_json_export_and_import() {
    let dir = tempfile::tempdir().unwrap();
    let (config, input) = workspace(dir.path());

    run_export(&config, "Feed", &input).unwrap();
    let imported = run_import(&config, "Feed").unwrap();
    assert_eq!(imported.records.column_names(), vec!["Name", "Val", "Secret"]);
    assert_eq!(imported.records.records()[0].get(0), Some(&Value::text("Ann")));
}

#[test]
fn test_summary_lists_every_table() {
    let dir = tempfile::tempdir().unwrap();
    let (config, _) = workspace(dir.path());

    let summaries = run_summary(&config).unwrap();
    let names: Vec<&str> = summaries.iter().map(|s| s.table.as_str()).collect();
    assert_eq!(names, vec!["Broken", "Feed", "Orders"]);

    assert!(summaries[0].message_type.is_err());
    assert!(summaries[0].export.is_none());
    assert_eq!(summaries[2].message_type, Ok(MessageType::Csv));
    assert!(summaries[1]
        .export
        .as_deref()
        .is_some_and(|line| line.ends_with("Key = feed.json, Message Type = JSON")));
}

#[test]
fn test_errors_keep_adapter_error() {
    let dir = tempfile::tempdir().unwrap();
    let (config, _) = workspace(dir.path());

    let err = run_import(&config, "Orders").unwrap_err();
    let adapter = err.downcast_ref::<AdapterError>().unwrap();
    assert_eq!(adapter.kind(), ErrorKind::TransferFailure);

    let err = run_import(&config, "Missing").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AdapterError>(),
        Some(AdapterError::UnknownTable { .. })
    ));
}
