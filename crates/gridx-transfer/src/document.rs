//! XML, JSON, and opaque-text exporter and importer.

use std::borrow::Cow;

use gridx_document::{DocumentEncoding, TransformPipeline};
use gridx_model::RecordSet;

use crate::adapter::{ExportReport, Exporter, ImportedRecords, Importer, single_key};
use crate::error::{AdapterError, Result};
use crate::settings::{MessageType, TableContext};
use crate::store::ObjectStore;

fn document_encoding(context: &TableContext<'_>) -> Result<DocumentEncoding> {
    match context.table.message_type()? {
        MessageType::Document(encoding) => Ok(encoding),
        MessageType::Csv => Err(AdapterError::InvalidMessageType {
            value: context.table.message_type.trim().to_string(),
        }),
    }
}

fn pipeline(context: &TableContext<'_>) -> Result<TransformPipeline> {
    let encoding = document_encoding(context)?;
    let rules = context.table.rule_text()?;
    Ok(TransformPipeline::with_rule_text(encoding, &rules)?)
}

/// Decodes downloaded bytes, honoring a byte-order mark.
fn decode_text<'b>(bytes: &'b [u8], bucket: &str, key: &str) -> Cow<'b, str> {
    let (text, encoding, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if had_errors {
        tracing::warn!(
            encoding = encoding.name(),
            "replaced malformed byte sequences in {bucket}|{key}"
        );
    }
    text
}

fn document_summary(prefix: &str, context: &TableContext<'_>) -> Option<String> {
    let message_type = context.table.message_type.trim();
    if !context.is_bound() || message_type.is_empty() {
        return None;
    }
    Some(format!(
        "{prefix} Amazon S3: Region = {}, Bucket = {}, Key = {}, Message Type = {}",
        context.store.endpoint.trim(),
        context.table.bucket.trim(),
        context.keys_label(),
        message_type
    ))
}

/// Writes record sets as transformed documents.
pub struct DocumentExporter<'s> {
    store: &'s dyn ObjectStore,
}

impl<'s> DocumentExporter<'s> {
    pub fn new(store: &'s dyn ObjectStore) -> Self {
        Self { store }
    }
}

impl Exporter for DocumentExporter<'_> {
    fn export(&self, context: &TableContext<'_>, records: &RecordSet) -> Result<ExportReport> {
        let keys = context.validate()?;
        let pipeline = pipeline(context)?;

        let records = records
            .clone()
            .with_export_flags(context.table.export_flags());
        let mut text = pipeline.export(&records, context.name)?;
        text.push('\n');

        let bucket = context.table.bucket.trim();
        let key = single_key(context, &keys);
        self.store.put(bucket, key, text.as_bytes())?;
        tracing::info!(
            table = context.name,
            encoding = %pipeline.encoding(),
            rows = records.len(),
            "success exporting data to {bucket}|{key}"
        );

        Ok(ExportReport {
            bucket: bucket.to_string(),
            key: key.to_string(),
            rows: records.len(),
            bytes: text.len(),
        })
    }

    fn summary(&self, context: &TableContext<'_>) -> Option<String> {
        document_summary("Exporting to", context)
    }
}

/// Reads every configured key, transforms each document, and merges the
/// rows into one record set.
pub struct DocumentImporter<'s> {
    store: &'s dyn ObjectStore,
}

impl<'s> DocumentImporter<'s> {
    pub fn new(store: &'s dyn ObjectStore) -> Self {
        Self { store }
    }
}

impl Importer for DocumentImporter<'_> {
    fn import(&self, context: &TableContext<'_>) -> Result<ImportedRecords> {
        let keys = context.validate()?;
        let pipeline = pipeline(context)?;
        let bucket = context.table.bucket.trim();

        let mut fragments = Vec::with_capacity(keys.len());
        for key in &keys {
            let bytes = self.store.get(bucket, key)?;
            tracing::info!(
                table = context.name,
                bytes = bytes.len(),
                "success downloading data from {bucket}|{key}"
            );
            fragments.push(decode_text(&bytes, bucket, key).into_owned());
        }

        let records = pipeline.import_all(
            fragments.iter().map(String::as_str),
            &context.table.fallback_columns(),
        )?;
        tracing::debug!(
            table = context.name,
            fragments = fragments.len(),
            rows = records.len(),
            columns = records.columns().len(),
            "imported documents"
        );
        Ok(ImportedRecords::Document(records))
    }

    fn summary(&self, context: &TableContext<'_>) -> Option<String> {
        document_summary("Bound to", context)
    }
}

#[cfg(test)]
mod tests {
    use gridx_model::{Column, ColumnType, GridData, Value};

    use super::*;
    use crate::settings::{ColumnSettings, StoreSettings, TableSettings};
    use crate::store::MemoryStore;

    fn store_settings() -> StoreSettings {
        StoreSettings {
            endpoint: "file:///srv/store".to_string(),
            access_key_id: "id".to_string(),
            secret_access_key: "secret".to_string(),
        }
    }

    fn table(message_type: &str, key: &str) -> TableSettings {
        TableSettings {
            bucket: "feeds".to_string(),
            key: key.to_string(),
            message_type: message_type.to_string(),
            ..TableSettings::default()
        }
    }

    fn orders() -> RecordSet {
        RecordSet::from_rows(
            vec![Column::text("Name"), Column::new("Val", ColumnType::Number)],
            vec![vec![Value::text("Ann"), Value::Number(3.5)]],
        )
        .unwrap()
    }

    #[test]
    fn test_export_json() {
        let store = MemoryStore::new();
        let store_settings = store_settings();
        let table = table("JSON", "orders.json");
        let context = TableContext::new("Orders", &store_settings, &table);

        DocumentExporter::new(&store).export(&context, &orders()).unwrap();
        let written = String::from_utf8(store.get("feeds", "orders.json").unwrap()).unwrap();
        assert_eq!(
            written,
            "{\"NewDataSet\":{\"Orders\":{\"Name\":\"Ann\",\"Val\":3.5}}}\n"
        );
    }

    #[test]
    fn test_export_rejects_csv_message_type() {
        let store = MemoryStore::new();
        let store_settings = store_settings();
        let table = table("CSV", "orders.json");
        let context = TableContext::new("Orders", &store_settings, &table);

        let err = DocumentExporter::new(&store).export(&context, &orders()).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidMessageType { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_export_bad_rules_fail_before_upload() {
        let store = MemoryStore::new();
        let store_settings = store_settings();
        let mut table = table("XML", "orders.xml");
        table.transform = Some("<rules><explode match=\"x\"/></rules>".to_string());
        let context = TableContext::new("Orders", &store_settings, &table);

        let err = DocumentExporter::new(&store).export(&context, &orders()).unwrap_err();
        assert!(matches!(err, AdapterError::Transform { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_import_merges_fragments() {
        let store = MemoryStore::new()
            .with_object("feeds", "a.json", "\u{feff}{\"NewDataSet\":{\"T\":{\"Name\":\"Ann\"}}}")
            .with_object("feeds", "b.json", "{\"NewDataSet\":{\"T\":[{\"Name\":\"Bob\"},{\"Name\":\"Cy\"}]}}");
        let store_settings = store_settings();
        let mut table = table("JSON", "");
        table.keys = vec!["a.json".to_string(), "b.json".to_string()];
        let context = TableContext::new("T", &store_settings, &table);

        let imported = DocumentImporter::new(&store).import(&context).unwrap();
        let records = imported.to_record_set().unwrap();
        assert_eq!(records.column_names(), vec!["Name"]);
        assert_eq!(records.len(), 3);
        assert_eq!(imported.rows().last(), Some(vec!["Cy".to_string()]));
    }

    #[test]
    fn test_import_empty_uses_column_settings() {
        let store = MemoryStore::new().with_object("feeds", "empty.xml", "<NewDataSet/>");
        let store_settings = store_settings();
        let mut table = table("XML", "empty.xml");
        table.columns = vec![
            ColumnSettings {
                name: "Name".to_string(),
                export: true,
            },
            ColumnSettings {
                name: "Val".to_string(),
                export: true,
            },
        ];
        let context = TableContext::new("T", &store_settings, &table);

        let imported = DocumentImporter::new(&store).import(&context).unwrap();
        let names: Vec<&str> = imported
            .columns()
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Name", "Val"]);
        assert_eq!(imported.rows().count(), 0);
    }

    #[test]
    fn test_import_opaque_text() {
        let store = MemoryStore::new().with_object("feeds", "raw.txt", "status: \\ok\\\n");
        let store_settings = store_settings();
        let table = table("OTHER", "raw.txt");
        let context = TableContext::new("Raw", &store_settings, &table);

        let records = DocumentImporter::new(&store)
            .import(&context)
            .unwrap()
            .to_record_set()
            .unwrap();
        assert_eq!(records.column_names(), vec!["data_Text"]);
        assert_eq!(records.records()[0].get(0), Some(&Value::text("status: ok")));
    }

    #[test]
    fn test_import_malformed_document_is_transform_failure() {
        let store = MemoryStore::new().with_object("feeds", "bad.xml", "<open>");
        let store_settings = store_settings();
        let table = table("XML", "bad.xml");
        let context = TableContext::new("T", &store_settings, &table);

        let err = DocumentImporter::new(&store).import(&context).unwrap_err();
        assert!(matches!(err, AdapterError::Transform { .. }));
    }

    #[test]
    fn test_summary() {
        let store = MemoryStore::new();
        let store_settings = store_settings();
        let table = table("JSON", "orders.json");
        let context = TableContext::new("Orders", &store_settings, &table);

        insta::assert_snapshot!(
            DocumentImporter::new(&store).summary(&context).unwrap(),
            @"Bound to Amazon S3: Region = file:///srv/store, Bucket = feeds, Key = orders.json, Message Type = JSON"
        );
    }
}
