//! Merging of per-fragment record sets.

use gridx_model::{Column, RecordSet, Value};

use crate::bridge::coerce;
use crate::error::Result;

/// Combines import fragments into one record set with a stable schema.
///
/// The first non-empty fragment fixes the columns. Rows of later fragments
/// are matched by column name: missing fields become null and fields the
/// schema does not know are dropped. When every fragment is empty the
/// result has the fallback columns and no rows.
#[derive(Debug, Clone, Default)]
pub struct RecordMerger {
    fallback: Vec<Column>,
}

impl RecordMerger {
    pub fn new(fallback: Vec<Column>) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> &[Column] {
        &self.fallback
    }

    pub fn merge<I>(&self, fragments: I) -> Result<RecordSet>
    where
        I: IntoIterator<Item = RecordSet>,
    {
        let mut merged: Option<RecordSet> = None;
        let mut fragment_count = 0usize;

        for fragment in fragments {
            fragment_count += 1;
            if fragment.is_empty() {
                continue;
            }
            match merged.as_mut() {
                None => merged = Some(fragment),
                Some(target) => append_by_name(target, &fragment)?,
            }
        }

        match merged {
            Some(records) => {
                tracing::debug!(
                    fragments = fragment_count,
                    rows = records.len(),
                    "merged import fragments"
                );
                Ok(records)
            }
            None => {
                tracing::debug!(
                    fragments = fragment_count,
                    columns = self.fallback.len(),
                    "no rows found, using fallback columns"
                );
                Ok(RecordSet::new(self.fallback.clone())?)
            }
        }
    }
}

fn append_by_name(target: &mut RecordSet, fragment: &RecordSet) -> Result<()> {
    let mapping: Vec<Option<usize>> = target
        .columns()
        .iter()
        .map(|column| fragment.column_index(&column.name))
        .collect();
    let types: Vec<_> = target.columns().iter().map(|c| c.column_type).collect();

    let dropped: Vec<&str> = fragment
        .column_names()
        .into_iter()
        .filter(|name| target.column_index(name).is_none())
        .collect();
    if !dropped.is_empty() {
        tracing::debug!(fields = ?dropped, "dropping fields missing from the merged schema");
    }

    for record in fragment.records() {
        let values: Vec<Value> = mapping
            .iter()
            .zip(&types)
            .map(|(index, column_type)| {
                index
                    .and_then(|i| record.get(i))
                    .map_or(Value::Null, |value| coerce(value, *column_type))
            })
            .collect();
        target.push(values)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use gridx_model::ColumnType;

    use super::*;

    fn name_val() -> Vec<Column> {
        vec![Column::text("Name"), Column::new("Val", ColumnType::Number)]
    }

    #[test]
    fn test_merge_nothing_uses_fallback() {
        let merged = RecordMerger::new(name_val())
            .merge(Vec::new())
            .unwrap();
        assert_eq!(merged.column_names(), vec!["Name", "Val"]);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_all_empty_fragments_use_fallback() {
        let empty = || RecordSet::new(vec![Column::text("Other")]).unwrap();
        let merged = RecordMerger::new(name_val())
            .merge(vec![empty(), empty(), empty()])
            .unwrap();
        assert_eq!(merged.columns(), name_val().as_slice());
        assert_eq!(merged.len(), 0);
    }

    #[test]
    fn test_first_non_empty_fragment_sets_schema() {
        let first = RecordSet::from_rows(
            vec![Column::text("A"), Column::text("B")],
            vec![vec![Value::text("1"), Value::text("2")]],
        )
        .unwrap();
        let second = RecordSet::from_rows(
            vec![Column::text("B"), Column::text("C")],
            vec![vec![Value::text("3"), Value::text("4")]],
        )
        .unwrap();
        let merged = RecordMerger::new(name_val())
            .merge(vec![RecordSet::new(Vec::new()).unwrap(), first, second])
            .unwrap();
        assert_eq!(merged.column_names(), vec!["A", "B"]);
        assert_eq!(merged.len(), 2);
        assert_eq!(
            merged.records()[1].values(),
            &[Value::Null, Value::text("3")]
        );
    }
}
