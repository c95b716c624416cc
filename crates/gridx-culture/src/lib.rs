//! Culture-aware value codec.
//!
//! Converts typed scalar values to and from text using a [`CultureProfile`]
//! (decimal separator, grouping, currency symbol, date-time pattern). Import
//! paths normalize every culture-specific number to the locale-neutral form
//! so downstream consumers never special-case locale.
//!
//! # Example
//!
//! ```
//! use gridx_culture::{CultureProfile, reparse_field};
//!
//! let german = CultureProfile::resolve("de-DE")?;
//! assert_eq!(reparse_field("1.234,5", Some(german)), "1234.5");
//! assert_eq!(reparse_field("1.234,5", None), "1.234,5");
//! # Ok::<(), gridx_culture::CultureError>(())
//! ```

mod codec;
mod culture;
mod datetime;
mod error;
mod number;

pub use codec::{format_value, infer_type, parse, parse_typed, reparse_field};
pub use culture::CultureProfile;
pub use datetime::{format_datetime, parse_invariant_datetime};
pub use error::{CultureError, Result};
pub use number::{NumberStyle, format_number, parse_invariant_number, parse_number};
