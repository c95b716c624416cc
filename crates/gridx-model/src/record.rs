//! Records, record sets, and the host-facing [`GridData`] view.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::error::{ModelError, Result};
use crate::value::Value;

/// One row of values, accessed positionally.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl From<Vec<Value>> for Record {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

/// Read-only view over a tabular record source.
///
/// Implemented by in-memory [`RecordSet`]s and by lazily decoded streams.
/// `columns()` returns `None` when the source could not be read at all; an
/// empty slice means the source was readable but declared no columns.
pub trait GridData {
    fn columns(&self) -> Option<&[Column]>;

    /// Produces a fresh cursor over the rows, one text field per column.
    fn rows(&self) -> Box<dyn Iterator<Item = Vec<String>> + '_>;
}

#[derive(Deserialize)]
struct RecordSetData {
    columns: Vec<Column>,
    #[serde(default)]
    records: Vec<Record>,
}

/// An ordered sequence of records with an immutable column list.
///
/// Every record's arity equals the column count and column names are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordSetData")]
pub struct RecordSet {
    columns: Vec<Column>,
    records: Vec<Record>,
}

impl TryFrom<RecordSetData> for RecordSet {
    type Error = ModelError;

    fn try_from(data: RecordSetData) -> Result<Self> {
        let mut set = RecordSet::new(data.columns)?;
        for record in data.records {
            set.push(record)?;
        }
        Ok(set)
    }
}

impl RecordSet {
    /// Creates an empty set, rejecting duplicate column names.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ModelError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
        }
        Ok(Self {
            columns,
            records: Vec::new(),
        })
    }

    /// Creates a set and fills it with rows.
    pub fn from_rows<I, R>(columns: Vec<Column>, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<Record>,
    {
        let mut set = Self::new(columns)?;
        for row in rows {
            set.push(row)?;
        }
        Ok(set)
    }

    /// Appends a record whose arity must match the column count.
    pub fn push(&mut self, record: impl Into<Record>) -> Result<()> {
        let record = record.into();
        if record.len() != self.columns.len() {
            return Err(ModelError::ArityMismatch {
                expected: self.columns.len(),
                actual: record.len(),
            });
        }
        self.records.push(record);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns the column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns the values of one column by name.
    pub fn column_values(&self, name: &str) -> Result<Vec<&Value>> {
        let index = self
            .column_index(name)
            .ok_or_else(|| ModelError::ColumnNotFound {
                name: name.to_string(),
            })?;
        Ok(self.records.iter().map(|r| &r.values[index]).collect())
    }

    /// Returns a copy of this set with a different export mask.
    ///
    /// Columns not named in `enabled` keep their current flag.
    #[must_use]
    pub fn with_export_flags<'a>(mut self, flags: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        for (name, enabled) in flags {
            if let Some(column) = self.columns.iter_mut().find(|c| c.name == name) {
                column.export_enabled = enabled;
            }
        }
        self
    }
}

impl GridData for RecordSet {
    fn columns(&self) -> Option<&[Column]> {
        Some(&self.columns)
    }

    fn rows(&self) -> Box<dyn Iterator<Item = Vec<String>> + '_> {
        Box::new(self.records.iter().map(|record| {
            record
                .values
                .iter()
                .map(|v| v.as_invariant_text().into_owned())
                .collect()
        }))
    }
}
