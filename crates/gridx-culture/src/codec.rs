//! Conversion between typed [`Value`]s and text.

use std::borrow::Cow;

use gridx_model::{ColumnType, Value, format_invariant_number};

use crate::culture::CultureProfile;
use crate::datetime::{format_datetime, parse_invariant_datetime};
use crate::number::{NumberStyle, format_number, parse_invariant_number, parse_number};

/// Renders a value with the culture's conventions.
///
/// Returns `None` for [`Value::Null`]; callers choose their own null token.
pub fn format_value(value: &Value, culture: &CultureProfile) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Text(text) => Some(text.clone()),
        Value::Number(n) => Some(format_number(*n, culture)),
        Value::DateTime(dt) => Some(format_datetime(*dt, culture)),
    }
}

/// Parses a text token against an optional culture.
///
/// With a culture, a numeric parse ("any" style) is attempted first and the
/// result is a [`Value::Number`]. Without one, or when the number does not
/// parse, the token is returned verbatim as text.
pub fn parse(text: &str, culture: Option<&CultureProfile>) -> (Value, ColumnType) {
    if let Some(culture) = culture
        && let Some(n) = parse_number(text, culture, NumberStyle::Any)
    {
        return (Value::Number(n), ColumnType::Number);
    }
    (Value::text(text), ColumnType::Text)
}

/// Re-emits a culture-formatted number in the locale-neutral form.
///
/// Blank text, text that is not a number, and every token when `culture` is
/// `None` pass through unchanged.
pub fn reparse_field<'a>(text: &'a str, culture: Option<&CultureProfile>) -> Cow<'a, str> {
    if text.trim().is_empty() {
        return Cow::Borrowed(text);
    }
    match parse(text, culture) {
        (Value::Number(n), _) => Cow::Owned(format_invariant_number(n)),
        _ => Cow::Borrowed(text),
    }
}

/// Infers a column type from a single sample field.
///
/// Number wins over date-time; anything else (including blank) is text.
pub fn infer_type(text: &str) -> ColumnType {
    if parse_invariant_number(text).is_some() {
        ColumnType::Number
    } else if parse_invariant_datetime(text).is_some() {
        ColumnType::DateTime
    } else {
        ColumnType::Text
    }
}

/// Converts locale-neutral text into a value of the given column type.
///
/// Blank text is `Null` for number and date-time columns. Text that does not
/// parse as the declared type is kept as [`Value::Text`].
pub fn parse_typed(text: &str, column_type: ColumnType) -> Value {
    match column_type {
        ColumnType::Text => Value::text(text),
        _ if text.trim().is_empty() => Value::Null,
        ColumnType::Number => {
            parse_invariant_number(text).map_or_else(|| Value::text(text), Value::Number)
        }
        ColumnType::DateTime => {
            parse_invariant_datetime(text).map_or_else(|| Value::text(text), Value::DateTime)
        }
    }
}
