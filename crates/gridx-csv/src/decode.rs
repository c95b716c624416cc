//! Delimited text to a lazily typed record stream.

use std::borrow::Cow;
use std::collections::HashSet;
use std::io::{self, Read};
use std::sync::OnceLock;

use gridx_culture::{CultureProfile, infer_type, parse_typed, reparse_field};
use gridx_model::{Column, ColumnType, GridData, RecordSet, Value};

use crate::error::{CsvError, Result};
use crate::source::ByteSource;

/// Options for [`CsvRecords`].
#[derive(Debug, Clone, Copy)]
pub struct CsvReadOptions {
    /// Field separator; must be a single-byte character.
    pub separator: char,
    /// Whether the first row holds column names.
    pub use_headers: bool,
    /// Culture used to normalize numbers on field access.
    pub culture: Option<&'static CultureProfile>,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            separator: ',',
            use_headers: true,
            culture: None,
        }
    }
}

/// Outcome of the one-time column inference.
#[derive(Debug)]
enum Inference {
    Ready(Vec<Column>),
    Failed(String),
}

/// A decoded, restartable record stream over a [`ByteSource`].
///
/// The column list (names plus types inferred from the first data row) is
/// computed once, on first access, and never changes afterwards. Each call
/// to [`records`](CsvRecords::records) re-opens the source and starts a new,
/// independent pass.
#[derive(Debug)]
pub struct CsvRecords<S> {
    source: S,
    options: CsvReadOptions,
    delimiter: u8,
    inference: OnceLock<Inference>,
}

impl<S: ByteSource> CsvRecords<S> {
    /// Creates a stream; no bytes are read until columns or rows are requested.
    pub fn new(source: S, options: CsvReadOptions) -> Result<Self> {
        let delimiter = u8::try_from(options.separator)
            .ok()
            .filter(|b| b.is_ascii() && !matches!(b, b'"' | b'\n' | b'\r'))
            .ok_or(CsvError::UnsupportedSeparator {
                separator: options.separator,
            })?;

        Ok(Self {
            source,
            options,
            delimiter,
            inference: OnceLock::new(),
        })
    }

    pub fn options(&self) -> &CsvReadOptions {
        &self.options
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the column list, or `None` if the source could not be read.
    pub fn columns(&self) -> Option<&[Column]> {
        match self.inference() {
            Inference::Ready(columns) => Some(columns),
            Inference::Failed(_) => None,
        }
    }

    /// Like [`columns`](Self::columns), but reports why they are missing.
    pub fn try_columns(&self) -> Result<&[Column]> {
        match self.inference() {
            Inference::Ready(columns) => Ok(columns),
            Inference::Failed(reason) => Err(CsvError::NoColumns {
                name: self.source.describe(),
                reason: reason.clone(),
            }),
        }
    }

    /// Starts a fresh pass over the data rows.
    ///
    /// The header row, if any, is skipped again on every pass. Rows that
    /// cannot be decoded are logged and skipped.
    pub fn records(&self) -> CsvRecordIter<'_> {
        let Some(columns) = self.columns() else {
            return CsvRecordIter::empty(self.options.culture);
        };

        let rows = match self.open_rows() {
            Ok(rows) => Some(rows),
            Err(e) => {
                tracing::warn!(
                    source = %self.source.describe(),
                    error = %e,
                    "failed to re-open delimited text"
                );
                None
            }
        };

        CsvRecordIter {
            rows,
            field_count: columns.len(),
            skip_header: self.options.use_headers,
            culture: self.options.culture,
        }
    }

    /// Materializes every row, converting fields to the inferred column types.
    pub fn to_record_set(&self) -> Result<RecordSet> {
        let columns = self.try_columns()?.to_vec();
        let rows: Vec<Vec<Value>> = self.records().map(|r| r.to_values(&columns)).collect();
        Ok(RecordSet::from_rows(columns, rows)?)
    }

    fn inference(&self) -> &Inference {
        self.inference.get_or_init(|| self.infer())
    }

    fn open_rows(&self) -> io::Result<RawRows<'_>> {
        Ok(RawRows::new(
            self.source.open()?,
            self.delimiter,
            self.source.describe(),
        ))
    }

    fn infer(&self) -> Inference {
        let mut rows = match self.open_rows() {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(
                    source = %self.source.describe(),
                    error = %e,
                    "delimited text is unavailable"
                );
                return Inference::Failed(e.to_string());
            }
        };

        let Some(first) = rows.next() else {
            tracing::debug!(source = %self.source.describe(), "delimited text is empty");
            return Inference::Ready(Vec::new());
        };

        let field_count = first.fields.len();
        let (names, sample) = if self.options.use_headers {
            (unique_names(&first.fields), rows.next())
        } else {
            ((0..field_count).map(|i| format!("Col{i}")).collect(), Some(first))
        };

        let columns: Vec<Column> = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let column_type = sample
                    .as_ref()
                    .and_then(|row| row.fields.get(i))
                    .map_or(ColumnType::Text, |field| infer_type(field.as_str()));
                Column::new(name, column_type)
            })
            .collect();

        tracing::debug!(
            source = %self.source.describe(),
            columns = columns.len(),
            types = ?columns.iter().map(|c| c.column_type).collect::<Vec<_>>(),
            "inferred column types"
        );
        Inference::Ready(columns)
    }
}

impl<S: ByteSource> GridData for CsvRecords<S> {
    fn columns(&self) -> Option<&[Column]> {
        CsvRecords::columns(self)
    }

    fn rows(&self) -> Box<dyn Iterator<Item = Vec<String>> + '_> {
        Box::new(self.records().map(|record| record.to_strings()))
    }
}

/// Makes header names unique; blank names become `ColN`.
fn unique_names(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(raw.len());
    raw.iter()
        .enumerate()
        .map(|(i, name)| {
            let base = match name.trim() {
                "" => format!("Col{i}"),
                trimmed => trimmed.to_string(),
            };
            let mut candidate = base.clone();
            let mut suffix = 1;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{base}_{suffix}");
                suffix += 1;
            }
            candidate
        })
        .collect()
}

/// One physical row as parsed text.
#[derive(Debug)]
struct RawRow {
    line: u64,
    fields: Vec<String>,
}

/// Input wrapper that keeps the bytes of the row being parsed.
struct RowTap<'a> {
    inner: Box<dyn Read + 'a>,
    kept: Vec<u8>,
    kept_from: u64,
    exhausted: bool,
}

impl<'a> RowTap<'a> {
    fn new(inner: Box<dyn Read + 'a>) -> Self {
        Self {
            inner,
            kept: Vec::new(),
            kept_from: 0,
            exhausted: false,
        }
    }

    /// Stream offset just past the last byte read.
    fn end(&self) -> u64 {
        self.kept_from + self.kept.len() as u64
    }

    fn release_before(&mut self, offset: u64) {
        let count = usize::try_from(offset.saturating_sub(self.kept_from))
            .map_or(self.kept.len(), |count| count.min(self.kept.len()));
        self.kept.drain(..count);
        self.kept_from += count as u64;
    }

    fn kept_since(&self, offset: u64) -> &[u8] {
        let start = usize::try_from(offset.saturating_sub(self.kept_from))
            .map_or(self.kept.len(), |start| start.min(self.kept.len()));
        &self.kept[start..]
    }
}

impl Read for RowTap<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        if read == 0 {
            self.exhausted = true;
        }
        self.kept.extend_from_slice(&buf[..read]);
        Ok(read)
    }
}

/// Returns the offset of a quote still open at the end of `row`.
fn unclosed_quote(row: &[u8], delimiter: u8) -> Option<usize> {
    let mut open = None;
    let mut at_field_start = true;
    let mut bytes = row.iter().copied().enumerate().peekable();
    while let Some((i, byte)) = bytes.next() {
        if open.is_some() {
            if byte == b'"' && bytes.next_if(|&(_, next)| next == b'"').is_none() {
                open = None;
            }
            continue;
        }
        match byte {
            b'"' if at_field_start => {
                open = Some(i);
                at_field_start = false;
            }
            b'\n' | b'\r' => at_field_start = true,
            _ => at_field_start = byte == delimiter,
        }
    }
    open
}

/// Successfully decoded rows of one pass.
///
/// A row whose quoted field is never closed would swallow the rest of the
/// input. It is skipped instead, and parsing resumes on the line after the
/// opening quote.
struct RawRows<'a> {
    reader: csv::Reader<RowTap<'a>>,
    record: csv::ByteRecord,
    delimiter: u8,
    name: String,
    line_offset: u64,
    at_start: bool,
    done: bool,
}

impl<'a> RawRows<'a> {
    fn new(input: Box<dyn Read + 'a>, delimiter: u8, name: String) -> Self {
        Self {
            reader: Self::reader(input, delimiter),
            record: csv::ByteRecord::new(),
            delimiter,
            name,
            line_offset: 0,
            at_start: true,
            done: false,
        }
    }

    fn reader(input: Box<dyn Read + 'a>, delimiter: u8) -> csv::Reader<RowTap<'a>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(RowTap::new(input))
    }

    fn decode_fields(&self) -> std::result::Result<Vec<String>, std::str::Utf8Error> {
        self.record
            .iter()
            .map(|field| std::str::from_utf8(field).map(str::to_string))
            .collect()
    }

    /// Checks whether the row starting at `start` ran to end of input inside
    /// quotes. Returns the line breaks before the opening quote and the bytes
    /// after the line it opened on.
    fn unclosed_row(&self, start: u64) -> Option<(u64, Vec<u8>)> {
        let tap = self.reader.get_ref();
        if !tap.exhausted || self.reader.position().byte() != tap.end() {
            return None;
        }
        let row = tap.kept_since(start);
        let open = unclosed_quote(row, self.delimiter)?;
        let breaks = row[..open].iter().filter(|&&b| b == b'\n').count() as u64;
        let rest = row[open..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or_else(Vec::new, |newline| row[open + newline + 1..].to_vec());
        Some((breaks, rest))
    }
}

impl Iterator for RawRows<'_> {
    type Item = RawRow;

    fn next(&mut self) -> Option<RawRow> {
        while !self.done {
            let consumed = self.reader.position().byte();
            self.reader.get_mut().release_before(consumed);
            let read = self.reader.read_byte_record(&mut self.record);
            let at_start = std::mem::replace(&mut self.at_start, false);
            match read {
                Ok(false) => self.done = true,
                Ok(true) => {
                    let (start, start_line) = self
                        .record
                        .position()
                        .map_or((0, 0), |p| (p.byte(), p.line()));
                    let line = start_line + self.line_offset;
                    if let Some((breaks, rest)) = self.unclosed_row(start) {
                        tracing::warn!(
                            source = %self.name,
                            line = line + breaks,
                            "skipping row with an unclosed quote"
                        );
                        let rest: Box<dyn Read> = Box::new(io::Cursor::new(rest));
                        self.reader = Self::reader(rest, self.delimiter);
                        self.line_offset = line + breaks;
                        continue;
                    }
                    match self.decode_fields() {
                        Ok(mut fields) => {
                            if at_start
                                && let Some(first) = fields.first_mut()
                                && let Some(stripped) = first.strip_prefix('\u{feff}')
                            {
                                *first = stripped.to_string();
                            }
                            if fields.len() == 1 && fields[0].is_empty() {
                                continue;
                            }
                            return Some(RawRow { line, fields });
                        }
                        Err(e) => {
                            tracing::warn!(
                                source = %self.name,
                                line,
                                error = %e,
                                "skipping malformed row"
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        source = %self.name,
                        error = %e,
                        "stopping after unreadable delimited text"
                    );
                    self.done = true;
                }
            }
        }
        None
    }
}

/// Cursor over the data rows of one pass.
pub struct CsvRecordIter<'a> {
    rows: Option<RawRows<'a>>,
    field_count: usize,
    skip_header: bool,
    culture: Option<&'static CultureProfile>,
}

impl CsvRecordIter<'_> {
    fn empty(culture: Option<&'static CultureProfile>) -> Self {
        Self {
            rows: None,
            field_count: 0,
            skip_header: false,
            culture,
        }
    }
}

impl Iterator for CsvRecordIter<'_> {
    type Item = CsvRecord;

    fn next(&mut self) -> Option<CsvRecord> {
        let rows = self.rows.as_mut()?;
        if std::mem::take(&mut self.skip_header) {
            rows.next()?;
        }
        let RawRow { line, mut fields } = rows.next()?;
        fields.resize(self.field_count, String::new());
        Some(CsvRecord {
            line,
            fields,
            culture: self.culture,
        })
    }
}

/// One decoded row with exactly one raw field per column.
///
/// Field access through [`get`](CsvRecord::get) applies the culture reparse
/// each time it is called.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRecord {
    line: u64,
    fields: Vec<String>,
    culture: Option<&'static CultureProfile>,
}

impl CsvRecord {
    /// Physical line the row started on (1-based).
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns a field normalized to the locale-neutral form.
    pub fn get(&self, index: usize) -> Option<Cow<'_, str>> {
        self.fields
            .get(index)
            .map(|field| reparse_field(field, self.culture))
    }

    /// Returns a field exactly as it appeared in the input.
    pub fn raw(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Returns every field normalized to the locale-neutral form.
    pub fn to_strings(&self) -> Vec<String> {
        (0..self.fields.len())
            .filter_map(|i| self.get(i).map(Cow::into_owned))
            .collect()
    }

    /// Converts the fields to values of the given column types.
    pub fn to_values(&self, columns: &[Column]) -> Vec<Value> {
        columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                self.get(i)
                    .map_or(Value::Null, |text| parse_typed(&text, column.column_type))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn decode(text: &str, options: CsvReadOptions) -> CsvRecords<MemorySource> {
        CsvRecords::new(MemorySource::new("test", text), options).unwrap()
    }

    #[test]
    fn test_headers_and_inference() {
        let records = decode("Name,Val\nAnn,3.5\n", CsvReadOptions::default());
        let columns = records.columns().unwrap();
        assert_eq!(
            columns,
            &[
                Column::text("Name"),
                Column::new("Val", ColumnType::Number)
            ]
        );
        let rows: Vec<CsvRecord> = records.records().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(0).as_deref(), Some("Ann"));
        assert_eq!(rows[0].get(1).as_deref(), Some("3.5"));
    }

    #[test]
    fn test_synthesized_columns_without_headers() {
        let options = CsvReadOptions {
            use_headers: false,
            ..CsvReadOptions::default()
        };
        let records = decode("Ann,2024-01-15\nBob,2024-02-01\n", options);
        let columns = records.columns().unwrap();
        assert_eq!(columns[0].name, "Col0");
        assert_eq!(columns[1].name, "Col1");
        assert_eq!(columns[1].column_type, ColumnType::DateTime);
        assert_eq!(records.records().count(), 2);
    }

    #[test]
    fn test_inference_uses_first_data_row_only() {
        let records = decode("A\n1\nnot a number\n", CsvReadOptions::default());
        assert_eq!(records.columns().unwrap()[0].column_type, ColumnType::Number);
        let set = records.to_record_set().unwrap();
        assert_eq!(set.records()[1].get(0), Some(&Value::text("not a number")));
    }

    #[test]
    fn test_short_rows_padded_long_rows_truncated() {
        let records = decode("A,B\n1\n2,x,extra\n", CsvReadOptions::default());
        let rows: Vec<Vec<String>> = records.rows().collect();
        assert_eq!(rows, vec![vec!["1", ""], vec!["2", "x"]]);
    }

    #[test]
    fn test_restartable() {
        let records = decode("A\nx\ny\n", CsvReadOptions::default());
        assert_eq!(records.records().count(), 2);
        assert_eq!(records.records().count(), 2);
    }

    #[test]
    fn test_quoted_fields() {
        let records = decode("Name,Val\n\"B, C\",-1\n\"say \"\"hi\"\"\",2\n", CsvReadOptions::default());
        let rows: Vec<Vec<String>> = records.rows().collect();
        assert_eq!(rows[0], vec!["B, C", "-1"]);
        assert_eq!(rows[1], vec!["say \"hi\"", "2"]);
    }

    #[test]
    fn test_bom_and_blank_lines() {
        let records = decode("\u{feff}Name\n\nAnn\n\n", CsvReadOptions::default());
        assert_eq!(records.columns().unwrap()[0].name, "Name");
        assert_eq!(records.records().count(), 1);
    }

    #[test]
    fn test_duplicate_and_blank_headers() {
        let records = decode("A,A,\n1,2,3\n", CsvReadOptions::default());
        let names: Vec<&str> = records
            .columns()
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "A_1", "Col2"]);
    }

    #[test]
    fn test_culture_reparse_on_access() {
        let options = CsvReadOptions {
            separator: ';',
            culture: Some(CultureProfile::resolve("de-DE").unwrap()),
            ..CsvReadOptions::default()
        };
        let records = decode("Val;Name\n1.234,5;Ann\n", options);
        assert_eq!(records.columns().unwrap()[0].column_type, ColumnType::Text);
        let row = records.records().next().unwrap();
        assert_eq!(row.raw(0), Some("1.234,5"));
        assert_eq!(row.get(0).as_deref(), Some("1234.5"));
        assert_eq!(row.get(1).as_deref(), Some("Ann"));
    }

    #[test]
    fn test_invalid_utf8_row_skipped() {
        let mut bytes = b"A\nok\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        bytes.extend_from_slice(b"after\n");
        let records =
            CsvRecords::new(MemorySource::new("bytes", bytes), CsvReadOptions::default()).unwrap();
        let rows: Vec<CsvRecord> = records.records().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].raw(0), Some("after"));
        assert_eq!(rows[1].line(), 4);
    }

    #[test]
    fn test_culture_does_not_affect_inference() {
        let options = CsvReadOptions {
            separator: ';',
            culture: Some(CultureProfile::resolve("de-DE").unwrap()),
            ..CsvReadOptions::default()
        };
        let records = decode("Qty;Price\n3;1.250,75\n4;2.500,5\n", options);
        let types: Vec<ColumnType> = records
            .columns()
            .unwrap()
            .iter()
            .map(|c| c.column_type)
            .collect();
        assert_eq!(types, vec![ColumnType::Number, ColumnType::Text]);
        let set = records.to_record_set().unwrap();
        assert_eq!(set.records()[1].get(1), Some(&Value::text("2500.5")));
    }

    #[test]
    fn test_unclosed_quote_row_skipped() {
        let records = decode("A,B\n1,x\n\"broken,2\n3,y\n4,z\n", CsvReadOptions::default());
        let rows: Vec<Vec<String>> = records.rows().collect();
        assert_eq!(rows, vec![vec!["1", "x"], vec!["3", "y"], vec!["4", "z"]]);
        let lines: Vec<u64> = records.records().map(|r| r.line()).collect();
        assert_eq!(lines, vec![2, 4, 5]);
    }

    #[test]
    fn test_unclosed_quote_on_last_line() {
        let records = decode("A,B\nok,1\nlast,\"open", CsvReadOptions::default());
        let rows: Vec<Vec<String>> = records.rows().collect();
        assert_eq!(rows, vec![vec!["ok", "1"]]);
    }

    #[test]
    fn test_closed_multiline_quote_kept() {
        let records = decode("A,B\n\"two\nlines\",1\n2,y", CsvReadOptions::default());
        let rows: Vec<Vec<String>> = records.rows().collect();
        assert_eq!(rows, vec![vec!["two\nlines", "1"], vec!["2", "y"]]);
    }

    #[test]
    fn test_empty_input_has_no_columns_but_is_readable() {
        let records = decode("", CsvReadOptions::default());
        assert_eq!(records.columns(), Some(&[][..]));
        assert_eq!(records.records().count(), 0);
    }

    #[test]
    fn test_unsupported_separator() {
        let options = CsvReadOptions {
            separator: '\u{2016}',
            ..CsvReadOptions::default()
        };
        let result = CsvRecords::new(MemorySource::new("x", ""), options);
        assert!(matches!(
            result,
            Err(CsvError::UnsupportedSeparator { separator: '\u{2016}' })
        ));
    }
}
