//! CSV exporter and importer.

use gridx_csv::{CsvReadOptions, CsvRecords, CsvWriteOptions, MemorySource, encode_to_string};
use gridx_culture::CultureProfile;
use gridx_model::RecordSet;

use crate::adapter::{ExportReport, Exporter, ImportedRecords, Importer, single_key};
use crate::error::{AdapterError, Result};
use crate::settings::TableContext;
use crate::store::ObjectStore;

/// Writes record sets as delimited text.
pub struct CsvExporter<'s> {
    store: &'s dyn ObjectStore,
}

impl<'s> CsvExporter<'s> {
    pub fn new(store: &'s dyn ObjectStore) -> Self {
        Self { store }
    }
}

impl Exporter for CsvExporter<'_> {
    fn export(&self, context: &TableContext<'_>, records: &RecordSet) -> Result<ExportReport> {
        let keys = context.validate()?;
        let table = context.table;
        let culture = CultureProfile::resolve_optional(table.culture_name()).map_err(|e| {
            AdapterError::LocaleInvalid {
                culture: table.culture_name().unwrap_or_default().to_string(),
                message: e.to_string(),
            }
        })?;

        let records = records.clone().with_export_flags(table.export_flags());
        let options = CsvWriteOptions {
            separator: table.write_separator().to_string(),
            write_headers: table.headers,
            culture,
        };
        let text = encode_to_string(&records, &options).map_err(AdapterError::Encode)?;

        let bucket = table.bucket.trim();
        let key = single_key(context, &keys);
        self.store.put(bucket, key, text.as_bytes())?;
        tracing::info!(
            table = context.name,
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
        if !context.is_bound() {
            return None;
        }
        let table = context.table;
        let mut line = format!(
            "Exporting to Amazon S3 CSV: Region = {}, Bucket = {}, Key = {}, Write headers = {}, Separator = '{}'",
            context.store.endpoint.trim(),
            table.bucket.trim(),
            context.keys_label(),
            table.headers,
            table.write_separator()
        );
        if let Some(culture) = table.culture_name() {
            line.push_str(&format!(", Culture='{culture}'"));
        }
        Some(line)
    }
}

/// Reads delimited text into a lazily typed record stream.
pub struct CsvImporter<'s> {
    store: &'s dyn ObjectStore,
}

impl<'s> CsvImporter<'s> {
    pub fn new(store: &'s dyn ObjectStore) -> Self {
        Self { store }
    }
}

impl Importer for CsvImporter<'_> {
    /// An unknown culture is not an error here: the records are read without
    /// culture reparsing.
    fn import(&self, context: &TableContext<'_>) -> Result<ImportedRecords> {
        let keys = context.validate()?;
        let table = context.table;
        let culture = match CultureProfile::resolve_optional(table.culture_name()) {
            Ok(culture) => culture,
            Err(e) => {
                tracing::warn!(table = context.name, error = %e, "ignoring import culture");
                None
            }
        };

        let bucket = table.bucket.trim();
        let key = single_key(context, &keys);
        let bytes = self.store.get(bucket, key)?;
        tracing::info!(
            table = context.name,
            bytes = bytes.len(),
            "success downloading data from {bucket}|{key}"
        );

        let options = CsvReadOptions {
            separator: table.read_separator(),
            use_headers: table.headers,
            culture,
        };
        let source = MemorySource::new(format!("{bucket}|{key}"), bytes);
        let records = CsvRecords::new(source, options).map_err(AdapterError::Decode)?;
        Ok(ImportedRecords::Delimited(records))
    }

    fn summary(&self, context: &TableContext<'_>) -> Option<String> {
        if !context.is_bound() {
            return None;
        }
        let table = context.table;
        let mut line = format!(
            "Bound to Amazon S3 CSV: Region = {}, Bucket = {}, Key = {}, Use headers = {}, Separator = '{}'",
            context.store.endpoint.trim(),
            table.bucket.trim(),
            context.keys_label(),
            table.headers,
            table.read_separator()
        );
        if let Some(culture) = table.culture_name() {
            line.push_str(&format!(", Culture='{culture}'"));
        }
        Some(line)
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

    fn table() -> TableSettings {
        TableSettings {
            bucket: "exports".to_string(),
            key: "orders.csv".to_string(),
            ..TableSettings::default()
        }
    }

    fn orders() -> RecordSet {
        RecordSet::from_rows(
            vec![
                Column::text("Name"),
                Column::new("Val", ColumnType::Number),
                Column::text("Secret"),
            ],
            vec![
                vec![Value::text("Ann"), Value::Number(3.5), Value::text("x")],
                vec![Value::text("B, C"), Value::Number(-1.0), Value::text("y")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_export_writes_enabled_columns() {
        let store = MemoryStore::new();
        let store_settings = store_settings();
        let mut table = table();
        table.columns.push(ColumnSettings {
            name: "Secret".to_string(),
            export: false,
        });
        let context = TableContext::new("Orders", &store_settings, &table);

        let report = CsvExporter::new(&store).export(&context, &orders()).unwrap();
        assert_eq!(report.rows, 2);
        let written = store.get("exports", "orders.csv").unwrap();
        assert_eq!(
            String::from_utf8(written).unwrap(),
            "Name,Val\nAnn,3.5\n\"B, C\",-1\n"
        );
    }

    #[test]
    fn test_export_rejects_unknown_culture_before_upload() {
        let store = MemoryStore::new();
        let store_settings = store_settings();
        let mut table = table();
        table.culture = Some("xx-YY".to_string());
        let context = TableContext::new("Orders", &store_settings, &table);

        let err = CsvExporter::new(&store).export(&context, &orders()).unwrap_err();
        assert!(matches!(err, AdapterError::LocaleInvalid { .. }));
        assert!(err.to_string().starts_with("The culture 'xx-YY' is not valid."));
        assert!(store.is_empty());
    }

    #[test]
    fn test_export_culture_formats_numbers() {
        let store = MemoryStore::new();
        let store_settings = store_settings();
        let mut table = table();
        table.separator = ";".to_string();
        table.culture = Some("de-DE".to_string());
        let context = TableContext::new("Orders", &store_settings, &table);

        CsvExporter::new(&store).export(&context, &orders()).unwrap();
        let written = String::from_utf8(store.get("exports", "orders.csv").unwrap()).unwrap();
        assert_eq!(written, "Name;Val;Secret\nAnn;3,5;x\nB, C;-1;y\n");
    }

    #[test]
    fn test_import_with_unknown_culture_falls_back() {
        let store = MemoryStore::new().with_object("exports", "orders.csv", "Name,Val\nAnn,3.5\n");
        let store_settings = store_settings();
        let mut table = table();
        table.culture = Some("xx-YY".to_string());
        let context = TableContext::new("Orders", &store_settings, &table);

        let imported = CsvImporter::new(&store).import(&context).unwrap();
        let columns = imported.columns().unwrap();
        assert_eq!(columns[0].name, "Name");
        assert_eq!(columns[0].column_type, ColumnType::Text);
        assert_eq!(columns[1].column_type, ColumnType::Number);
        assert_eq!(
            imported.rows().collect::<Vec<_>>(),
            vec![vec!["Ann".to_string(), "3.5".to_string()]]
        );
    }

    #[test]
    fn test_import_missing_object() {
        let store = MemoryStore::new();
        let store_settings = store_settings();
        let table = table();
        let context = TableContext::new("Orders", &store_settings, &table);

        let err = CsvImporter::new(&store).import(&context).unwrap_err();
        assert!(matches!(err, AdapterError::Transfer(_)));
    }

    #[test]
    fn test_summaries() {
        let store = MemoryStore::new();
        let store_settings = store_settings();
        let mut table = table();
        table.culture = Some("de-DE".to_string());
        let context = TableContext::new("Orders", &store_settings, &table);

        insta::assert_snapshot!(
            CsvExporter::new(&store).summary(&context).unwrap(),
            @"Exporting to Amazon S3 CSV: Region = file:///srv/store, Bucket = exports, Key = orders.csv, Write headers = true, Separator = ',', Culture='de-DE'"
        );
        insta::assert_snapshot!(
            CsvImporter::new(&store).summary(&context).unwrap(),
            @"Bound to Amazon S3 CSV: Region = file:///srv/store, Bucket = exports, Key = orders.csv, Use headers = true, Separator = ',', Culture='de-DE'"
        );

        table.bucket.clear();
        let context = TableContext::new("Orders", &store_settings, &table);
        assert!(CsvExporter::new(&store).summary(&context).is_none());
    }
}
