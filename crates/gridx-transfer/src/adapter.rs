//! Exporter and importer traits and their dispatch by message type.

use gridx_csv::{CsvRecords, MemorySource};
use gridx_model::{Column, GridData, RecordSet};

use crate::delimited::{CsvExporter, CsvImporter};
use crate::document::{DocumentExporter, DocumentImporter};
use crate::error::{AdapterError, Result};
use crate::settings::{MessageType, TableContext};
use crate::store::ObjectStore;

/// Writes a record set to the object store.
pub trait Exporter {
    fn export(&self, context: &TableContext<'_>, records: &RecordSet) -> Result<ExportReport>;

    /// One-line description of the target, or `None` when the table is not
    /// bound to an endpoint, bucket, and key.
    fn summary(&self, context: &TableContext<'_>) -> Option<String>;
}

/// Reads records from the object store.
pub trait Importer {
    fn import(&self, context: &TableContext<'_>) -> Result<ImportedRecords>;

    fn summary(&self, context: &TableContext<'_>) -> Option<String>;
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub bucket: String,
    pub key: String,
    pub rows: usize,
    pub bytes: usize,
}

/// Records produced by an import.
///
/// Delimited text stays lazily decoded; documents are fully merged.
#[derive(Debug)]
pub enum ImportedRecords {
    Delimited(CsvRecords<MemorySource>),
    Document(RecordSet),
}

impl ImportedRecords {
    /// Materializes the records with their column types.
    pub fn to_record_set(&self) -> Result<RecordSet> {
        match self {
            Self::Delimited(records) => records.to_record_set().map_err(AdapterError::Decode),
            Self::Document(records) => Ok(records.clone()),
        }
    }
}

impl GridData for ImportedRecords {
    fn columns(&self) -> Option<&[Column]> {
        match self {
            Self::Delimited(records) => records.columns(),
            Self::Document(records) => GridData::columns(records),
        }
    }

    fn rows(&self) -> Box<dyn Iterator<Item = Vec<String>> + '_> {
        match self {
            Self::Delimited(records) => GridData::rows(records),
            Self::Document(records) => GridData::rows(records),
        }
    }
}

/// Returns the exporter for a message type.
pub fn exporter_for<'s>(message_type: MessageType, store: &'s dyn ObjectStore) -> Box<dyn Exporter + 's> {
    match message_type {
        MessageType::Csv => Box::new(CsvExporter::new(store)),
        MessageType::Document(_) => Box::new(DocumentExporter::new(store)),
    }
}

/// Returns the importer for a message type.
pub fn importer_for<'s>(message_type: MessageType, store: &'s dyn ObjectStore) -> Box<dyn Importer + 's> {
    match message_type {
        MessageType::Csv => Box::new(CsvImporter::new(store)),
        MessageType::Document(_) => Box::new(DocumentImporter::new(store)),
    }
}

/// Picks the first key and warns about any others.
pub(crate) fn single_key<'a>(context: &TableContext<'_>, keys: &[&'a str]) -> &'a str {
    if keys.len() > 1 {
        tracing::warn!(
            table = context.name,
            ignored = keys.len() - 1,
            "only the first key is used for this message type"
        );
    }
    keys.first().copied().unwrap_or_default()
}
