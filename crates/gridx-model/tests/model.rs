//! Serialization tests for the record set model.

use gridx_model::{Column, ColumnType, GridData, RecordSet, Value};

#[test]
fn record_set_deserializes_from_host_dump() {
    let json = r#"{
        "columns": [
            {"name": "Name", "type": "Text"},
            {"name": "Val", "type": "Number", "nullable": true}
        ],
        "records": [
            [{"kind": "Text", "value": "Ann"}, {"kind": "Number", "value": 3.5}],
            [{"kind": "Text", "value": "Bob"}, {"kind": "Null"}]
        ]
    }"#;

    let set: RecordSet = serde_json::from_str(json).unwrap();

    assert_eq!(set.column_names(), vec!["Name", "Val"]);
    assert!(set.columns()[1].nullable);
    assert_eq!(set.records()[0].get(1), Some(&Value::Number(3.5)));
    assert_eq!(set.records()[1].get(1), Some(&Value::Null));
}

#[test]
fn record_set_rejects_ragged_dump() {
    let json = r#"{
        "columns": [{"name": "A"}, {"name": "B"}],
        "records": [[{"kind": "Text", "value": "only one"}]]
    }"#;

    let result: Result<RecordSet, _> = serde_json::from_str(json);

    let message = result.unwrap_err().to_string();
    assert!(message.contains("record has 1 values but the set has 2 columns"));
}

#[test]
fn record_set_serialization_round_trips() {
    let set = RecordSet::from_rows(
        vec![
            Column::text("Name"),
            Column::new("Val", ColumnType::Number).with_export(false),
        ],
        vec![vec![Value::text("Ann"), Value::Number(-1.0)]],
    )
    .unwrap();

    let json = serde_json::to_string(&set).unwrap();
    let back: RecordSet = serde_json::from_str(&json).unwrap();

    assert_eq!(back, set);
    assert!(!back.columns()[1].export_enabled);
}

#[test]
fn grid_data_view_of_record_set() {
    let set = RecordSet::from_rows(
        vec![Column::text("A")],
        vec![vec![Value::text("x")], vec![Value::Null]],
    )
    .unwrap();
    let view: &dyn GridData = &set;

    assert_eq!(view.columns().map(<[Column]>::len), Some(1));
    let rows: Vec<_> = view.rows().collect();
    assert_eq!(rows, vec![vec!["x".to_string()], vec![String::new()]]);
}
