//! Typed scalar values and their locale-neutral text form.

use std::borrow::Cow;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::column::ColumnType;

/// Locale-neutral date-time pattern (`MM/dd/yyyy HH:mm:ss`).
pub const INVARIANT_DATETIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// A single field value in a record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    /// Missing or unavailable value.
    #[default]
    Null,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Convenience constructor for text values.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the column type this value naturally belongs to.
    ///
    /// `Null` carries no type and returns `None`.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Self::Null => None,
            Self::Text(_) => Some(ColumnType::Text),
            Self::Number(_) => Some(ColumnType::Number),
            Self::DateTime(_) => Some(ColumnType::DateTime),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Renders the value in the locale-neutral convention.
    ///
    /// `Null` renders as an empty string.
    pub fn as_invariant_text(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Text(text) => Cow::Borrowed(text.as_str()),
            Self::Number(n) => Cow::Owned(format_invariant_number(*n)),
            Self::DateTime(dt) => Cow::Owned(dt.format(INVARIANT_DATETIME_FORMAT).to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_invariant_text())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Formats a double in the canonical locale-neutral form.
///
/// Non-finite values use the literal tokens `Infinity`, `-Infinity` and `NaN`;
/// finite values use the shortest representation that round-trips.
pub fn format_invariant_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_invariant_number_tokens() {
        assert_eq!(format_invariant_number(f64::INFINITY), "Infinity");
        assert_eq!(format_invariant_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_invariant_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_invariant_number_shortest() {
        assert_eq!(format_invariant_number(3.5), "3.5");
        assert_eq!(format_invariant_number(-1.0), "-1");
        assert_eq!(format_invariant_number(0.1), "0.1");
        assert_eq!(format_invariant_number(1234567.0), "1234567");
    }

    #[test]
    fn test_invariant_datetime() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(13, 4, 5)
            .unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "01/02/2024 13:04:05");
    }

    #[test]
    fn test_null_is_empty_text() {
        assert_eq!(Value::Null.as_invariant_text(), "");
        assert!(Value::from(None::<f64>).is_null());
    }

    #[test]
    fn test_column_type_of_value() {
        assert_eq!(Value::text("a").column_type(), Some(ColumnType::Text));
        assert_eq!(Value::Number(1.0).column_type(), Some(ColumnType::Number));
        assert_eq!(Value::Null.column_type(), None);
    }
}
