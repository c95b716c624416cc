//! Delimited-text codec for record sets.
//!
//! - **Encoding**: header line, per-column export mask, culture formatting,
//!   `null` token, and quoting of fields that contain the separator, a
//!   double quote, or a line feed.
//! - **Decoding**: a restartable [`CsvRecords`] stream whose column types are
//!   inferred once, from the first data row.
//!
//! # Example
//!
//! ```
//! use gridx_csv::{CsvReadOptions, CsvRecords, MemorySource};
//! use gridx_model::ColumnType;
//!
//! let records = CsvRecords::new(
//!     MemorySource::new("inline", "Name,Val\nAnn,3.5\n"),
//!     CsvReadOptions::default(),
//! )?;
//! let columns = records.columns().unwrap_or_default();
//! assert_eq!(columns[1].column_type, ColumnType::Number);
//! assert_eq!(records.records().count(), 1);
//! # Ok::<(), gridx_csv::CsvError>(())
//! ```

mod decode;
mod encode;
mod error;
mod quote;
mod source;

pub use decode::{CsvReadOptions, CsvRecord, CsvRecordIter, CsvRecords};
pub use encode::{
    CsvWriteOptions, DEFAULT_SEPARATOR, NULL_TOKEN, encode_to_string, write_csv,
};
pub use error::{CsvError, Result};
pub use quote::{needs_quotes, quote_field};
pub use source::{ByteSource, FileSource, MemorySource};
