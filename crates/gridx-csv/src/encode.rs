//! Record set to delimited text.

use std::io::Write;

use gridx_culture::{CultureProfile, format_value};
use gridx_model::{Column, Record, RecordSet};

use crate::error::Result;
use crate::quote::quote_field;

/// Token written for null or unavailable values.
pub const NULL_TOKEN: &str = "null";

/// Default field separator.
pub const DEFAULT_SEPARATOR: &str = ",";

/// Options for [`write_csv`] and [`encode_to_string`].
#[derive(Debug, Clone)]
pub struct CsvWriteOptions {
    /// Field separator; may be longer than one character.
    pub separator: String,
    pub write_headers: bool,
    /// Culture for numbers and date-times; `None` uses the locale-neutral form.
    pub culture: Option<&'static CultureProfile>,
}

impl Default for CsvWriteOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            write_headers: true,
            culture: None,
        }
    }
}

impl CsvWriteOptions {
    /// Returns the configured separator, or `,` when it is empty.
    pub fn effective_separator(&self) -> &str {
        if self.separator.is_empty() {
            DEFAULT_SEPARATOR
        } else {
            &self.separator
        }
    }
}

/// Writes a record set as delimited text, one `\n`-terminated line per row.
///
/// Only export-enabled columns are written, in their original order.
/// Returns the number of data rows written.
pub fn write_csv<W: Write>(
    writer: &mut W,
    records: &RecordSet,
    options: &CsvWriteOptions,
) -> Result<usize> {
    let separator = options.effective_separator();
    let enabled = enabled_columns(records.columns());

    if options.write_headers {
        let names: Vec<&str> = enabled.iter().map(|(_, c)| c.name.as_str()).collect();
        writeln!(writer, "{}", names.join(separator))?;
    }

    for record in records.records() {
        writeln!(writer, "{}", render_row(record, &enabled, options))?;
    }

    tracing::debug!(
        rows = records.len(),
        columns = enabled.len(),
        "encoded delimited text"
    );
    Ok(records.len())
}

/// Encodes a record set into a string.
pub fn encode_to_string(records: &RecordSet, options: &CsvWriteOptions) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, records, options)?;
    // Every fragment written above is a `&str`.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn enabled_columns(columns: &[Column]) -> Vec<(usize, &Column)> {
    columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.export_enabled)
        .collect()
}

fn render_row(record: &Record, enabled: &[(usize, &Column)], options: &CsvWriteOptions) -> String {
    let separator = options.effective_separator();
    let culture = options.culture.unwrap_or_else(CultureProfile::invariant);

    let fields: Vec<String> = enabled
        .iter()
        .map(|(index, _)| {
            let text = record
                .get(*index)
                .and_then(|value| format_value(value, culture))
                .unwrap_or_else(|| NULL_TOKEN.to_string());
            quote_field(&text, separator).into_owned()
        })
        .collect();
    fields.join(separator)
}
