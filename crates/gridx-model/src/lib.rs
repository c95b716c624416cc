//! Tabular data model for the grid exchange adapters.
//!
//! This crate defines the types that flow across the boundary between the
//! host grid and the codecs:
//!
//! - [`Value`]: a typed scalar (text, number, date-time, or null)
//! - [`Column`]: name, inferred/declared type, and export flag
//! - [`Record`] / [`RecordSet`]: positional rows with a fixed column list
//! - [`GridData`]: the read-only view every record source exposes to the host
//!
//! # Example
//!
//! ```
//! use gridx_model::{Column, ColumnType, RecordSet, Value};
//!
//! let mut set = RecordSet::new(vec![
//!     Column::new("Name", ColumnType::Text),
//!     Column::new("Val", ColumnType::Number),
//! ])?;
//! set.push(vec![Value::text("Ann"), Value::Number(3.5)])?;
//!
//! assert_eq!(set.len(), 1);
//! # Ok::<(), gridx_model::ModelError>(())
//! ```

mod column;
mod error;
mod record;
mod value;

pub use column::{Column, ColumnType};
pub use error::{ModelError, Result};
pub use record::{GridData, Record, RecordSet};
pub use value::{INVARIANT_DATETIME_FORMAT, Value, format_invariant_number};
