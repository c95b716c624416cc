//! Conversion between record sets and document trees.
//!
//! `to_document` produces the data-set shape:
//!
//! ```xml
//! <NewDataSet>
//!   <Orders><Name>Ann</Name><Val>3.5</Val></Orders>
//!   <Orders><Name>B, C</Name></Orders>
//! </NewDataSet>
//! ```
//!
//! Null fields are omitted. Reading a tree back groups the root's children
//! by element name; each group is a table and each element a row.

use gridx_culture::parse_typed;
use gridx_model::{Column, ColumnType, RecordSet, Value};

use crate::error::Result;
use crate::tree::{Document, Element, Node, value_text};

/// Root element of documents produced from record sets.
pub const DATASET_ROOT: &str = "NewDataSet";

/// Table name used when none is given.
pub const DEFAULT_TABLE_NAME: &str = "Table";

/// Converts a record set into a document tree.
///
/// Leaves are typed by the column's base type. Columns that are not
/// export-enabled and null values are left out.
pub fn to_document(records: &RecordSet, table_name: &str) -> Document {
    let table_name = match table_name.trim() {
        "" => DEFAULT_TABLE_NAME,
        name => name,
    };

    let mut root = Element::new(DATASET_ROOT);
    for record in records.records() {
        let mut row = Element::new(table_name);
        for (column, value) in records.columns().iter().zip(record.values()) {
            if !column.export_enabled || value.is_null() {
                continue;
            }
            let leaf = coerce(value, column.base_type());
            row.push(Element::new(column.name.as_str()).with_child(leaf));
        }
        root.push(row);
    }
    Document::new(root)
}

/// Converts a value to the given column type, keeping it as text when the
/// conversion is not possible.
pub(crate) fn coerce(value: &Value, column_type: ColumnType) -> Value {
    match (value.column_type(), column_type) {
        (None, _) => Value::Null,
        (Some(actual), wanted) if actual == wanted => value.clone(),
        (Some(_), ColumnType::Text) => Value::Text(value_text(value).into_owned()),
        (Some(_), wanted) => parse_typed(&value_text(value), wanted),
    }
}

/// Reads every table of a document, in order of first appearance.
pub fn tables(document: &Document) -> Result<Vec<(String, RecordSet)>> {
    let root = &document.root;
    let mut groups: Vec<(&str, Vec<&Element>)> = Vec::new();
    for element in root.elements() {
        match groups.iter_mut().find(|(name, _)| *name == element.name) {
            Some((_, rows)) => rows.push(element),
            None => groups.push((element.name.as_str(), vec![element])),
        }
    }

    if groups.is_empty() {
        if root.text().trim().is_empty() {
            return Ok(Vec::new());
        }
        groups.push((root.name.as_str(), vec![root]));
    }

    groups
        .into_iter()
        .map(|(name, rows)| Ok((name.to_string(), read_table(&rows)?)))
        .collect()
}

/// Reads the first table of a document; no table yields an empty set.
pub fn from_document(document: &Document) -> Result<RecordSet> {
    match tables(document)?.into_iter().next() {
        Some((_, records)) => Ok(records),
        None => Ok(RecordSet::new(Vec::new())?),
    }
}

/// Reads the first table, or returns `declared` with zero rows when the
/// document holds no rows.
pub fn from_document_with_schema(document: &Document, declared: &[Column]) -> Result<RecordSet> {
    match tables(document)?.into_iter().next() {
        Some((_, records)) if !records.is_empty() => Ok(records),
        _ => Ok(RecordSet::new(declared.to_vec())?),
    }
}

/// The fields of one row, in document order.
fn row_fields(row: &Element) -> Vec<(String, Option<Value>)> {
    let mut fields: Vec<(String, Option<Value>)> = row
        .attributes
        .iter()
        .map(|(name, value)| (name.clone(), Some(Value::text(value.as_str()))))
        .collect();

    if row.has_elements() {
        for child in row.elements() {
            if fields.iter().any(|(name, _)| *name == child.name) {
                tracing::debug!(row = %row.name, field = %child.name, "ignoring repeated field");
                continue;
            }
            fields.push((child.name.clone(), child.value()));
        }
    } else if !row.text().trim().is_empty() {
        let value = match row.children.as_slice() {
            [Node::Value(value)] => value.clone(),
            _ => Value::Text(row.text()),
        };
        fields.push((format!("{}_Text", row.name), Some(value)));
    }
    fields
}

fn read_table(rows: &[&Element]) -> Result<RecordSet> {
    let mut names: Vec<String> = Vec::new();
    let mut parsed: Vec<Vec<(usize, Value)>> = Vec::with_capacity(rows.len());

    for row in rows {
        let mut values = Vec::new();
        for (name, value) in row_fields(row) {
            let index = match names.iter().position(|n| *n == name) {
                Some(index) => index,
                None => {
                    names.push(name);
                    names.len() - 1
                }
            };
            if let Some(value) = value {
                values.push((index, value));
            }
        }
        parsed.push(values);
    }

    let types: Vec<ColumnType> = (0..names.len())
        .map(|index| {
            let mut seen = parsed
                .iter()
                .flatten()
                .filter(|(i, _)| *i == index)
                .filter_map(|(_, value)| value.column_type());
            if let Some(first) = seen.next()
                && seen.all(|t| t == first)
            {
                first
            } else {
                ColumnType::Text
            }
        })
        .collect();

    let columns: Vec<Column> = names
        .into_iter()
        .zip(&types)
        .map(|(name, column_type)| Column::new(name, *column_type))
        .collect();

    let mut records = RecordSet::new(columns)?;
    for values in parsed {
        let mut record = vec![Value::Null; types.len()];
        for (index, value) in values {
            record[index] = coerce(&value, types[index]);
        }
        records.push(record)?;
    }
    Ok(records)
}
