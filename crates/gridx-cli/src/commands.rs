//! Command implementations shared by the binary and its tests.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info_span, trace};

use gridx_model::{GridData, RecordSet};
use gridx_transfer::{
    AdapterSettings, ExportReport, MemoryStore, MessageType, ObjectStore, TableContext,
    exporter_for, importer_for, open_store,
};

use crate::logging::redact_value;

/// Result of `gridx export`.
#[derive(Debug)]
pub struct ExportOutcome {
    pub table: String,
    pub summary: Option<String>,
    pub report: ExportReport,
}

/// Result of `gridx import`.
#[derive(Debug)]
pub struct ImportOutcome {
    pub table: String,
    pub summary: Option<String>,
    pub records: RecordSet,
}

/// One row of `gridx summary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub table: String,
    pub message_type: std::result::Result<MessageType, String>,
    pub export: Option<String>,
    pub import: Option<String>,
}

pub fn load_settings(path: &Path) -> Result<AdapterSettings> {
    AdapterSettings::load(path).with_context(|| format!("load settings {}", path.display()))
}

/// Reads a JSON record-set dump: `{"columns": [...], "records": [[...]]}`.
pub fn read_records(path: &Path) -> Result<RecordSet> {
    let file = File::open(path).with_context(|| format!("open records {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parse records {}", path.display()))
}

fn open_table_store(context: &TableContext<'_>) -> Result<Box<dyn ObjectStore>> {
    context.validate()?;
    let store = open_store(&context.store.endpoint)?;
    Ok(store)
}

pub fn run_export(config: &Path, table: &str, input: &Path) -> Result<ExportOutcome> {
    let settings = load_settings(config)?;
    let context = settings.table(table)?;
    let span = info_span!("export", table = context.name);
    let _guard = span.enter();

    let records = read_records(input)?;
    debug!(rows = records.len(), columns = records.columns().len(), "read input records");

    let store = open_table_store(&context)?;
    let exporter = exporter_for(context.table.message_type()?, store.as_ref());
    let report = exporter
        .export(&context, &records)
        .with_context(|| format!("export table {table}"))?;

    Ok(ExportOutcome {
        table: table.to_string(),
        summary: exporter.summary(&context),
        report,
    })
}

pub fn run_import(config: &Path, table: &str) -> Result<ImportOutcome> {
    let settings = load_settings(config)?;
    let context = settings.table(table)?;
    let span = info_span!("import", table = context.name);
    let _guard = span.enter();

    let store = open_table_store(&context)?;
    let importer = importer_for(context.table.message_type()?, store.as_ref());
    let imported = importer
        .import(&context)
        .with_context(|| format!("import table {table}"))?;
    for row in imported.rows() {
        trace!(row = redact_value(&row.join(", ")), "imported row");
    }
    let records = imported
        .to_record_set()
        .with_context(|| format!("read records of table {table}"))?;

    Ok(ImportOutcome {
        table: table.to_string(),
        summary: importer.summary(&context),
        records,
    })
}

/// Describes every configured table without touching the store.
pub fn run_summary(config: &Path) -> Result<Vec<TableSummary>> {
    let settings = load_settings(config)?;
    let store = MemoryStore::new();
    Ok(settings
        .table_contexts()
        .map(|context| summarize(&context, &store))
        .collect())
}

fn summarize(context: &TableContext<'_>, store: &dyn ObjectStore) -> TableSummary {
    let message_type = context.table.message_type().map_err(|e| e.to_string());
    let (export, import) = match &message_type {
        Ok(message_type) => (
            exporter_for(*message_type, store).summary(context),
            importer_for(*message_type, store).summary(context),
        ),
        Err(_) => (None, None),
    };
    TableSummary {
        table: context.name.to_string(),
        message_type,
        export,
        import,
    }
}
