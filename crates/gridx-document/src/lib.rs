//! Document encodings and rule-set transforms for record sets.
//!
//! Every document, whatever its wire encoding, is decoded into one canonical
//! [`Document`] tree. Rule sets reshape the tree and the bridge turns it into
//! record sets (and back):
//!
//! ```text
//! text --decode--> Document --rules--> Document --encode--> text
//!                                          |
//!                                          +--tables--> RecordSet
//! ```
//!
//! # Example
//!
//! ```
//! use gridx_document::{DocumentEncoding, TransformPipeline};
//!
//! let pipeline = TransformPipeline::with_rule_text(
//!     DocumentEncoding::Markup,
//!     r#"<rules><rename match="qty" to="Quantity"/></rules>"#,
//! )?;
//! let records = pipeline.import("<NewDataSet><Order><qty>3</qty></Order></NewDataSet>")?;
//! assert_eq!(records.column_names(), vec!["Quantity"]);
//! # Ok::<(), gridx_document::TransformError>(())
//! ```

mod bridge;
mod encoding;
mod error;
mod keyvalue;
mod markup;
mod merger;
mod pipeline;
mod rules;
mod tree;

pub use bridge::{
    DATASET_ROOT, DEFAULT_TABLE_NAME, from_document, from_document_with_schema, tables,
    to_document,
};
pub use encoding::{
    DocumentCodec, DocumentEncoding, KeyValueCodec, MarkupCodec, OPAQUE_ROOT, OpaqueCodec,
    convert,
};
pub use error::{DocumentError, Result, TransformError};
pub use keyvalue::{WRAPPER_ROOT, parse_key_value, render_key_value};
pub use markup::{parse_markup, render_markup, render_markup_compact};
pub use merger::RecordMerger;
pub use pipeline::TransformPipeline;
pub use rules::{DEFAULT_SELECT_ROOT, Pattern, Rule, RuleSet};
pub use tree::{Document, Element, MARKUP_DATETIME_FORMAT, Node, value_text};
