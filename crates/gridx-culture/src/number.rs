//! Culture-aware number formatting and parsing.
//!
//! Formatting always renders non-finite values as `Infinity`, `-Infinity`
//! and `NaN`; these tokens are never localized.

use gridx_model::format_invariant_number;

use crate::culture::CultureProfile;

/// Which textual number styles a parse accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    /// Leading sign, grouping, decimal point and exponent.
    Float,
    /// Everything in `Float`, plus trailing sign, parenthesised negatives
    /// and the culture's currency symbol.
    Any,
}

/// Formats a double with the culture's decimal separator and no grouping.
pub fn format_number(value: f64, culture: &CultureProfile) -> String {
    let text = format_invariant_number(value);
    if !value.is_finite() || culture.decimal_separator() == '.' {
        return text;
    }
    text.replace('.', &culture.decimal_separator().to_string())
}

/// Parses a number in the locale-neutral convention (`Float` style).
pub fn parse_invariant_number(value: &str) -> Option<f64> {
    parse_number(value, CultureProfile::invariant(), NumberStyle::Float)
}

/// Parses a number using the culture's separators.
///
/// Handles common formats:
/// - Standard numbers: "123", "-45.67"
/// - Thousands separators: "1,234,567" (culture group separator)
/// - Whitespace: "  123  "
/// - Scientific notation: "1.23e5"
/// - With [`NumberStyle::Any`]: "(12)", "12-", "$12.50"
///
/// Returns None if the value cannot be parsed as a number.
pub fn parse_number(value: &str, culture: &CultureProfile, style: NumberStyle) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(special) = parse_special(trimmed) {
        return Some(special);
    }

    let mut body = trimmed;
    let mut negative = false;

    if style == NumberStyle::Any {
        if let Some(inner) = body.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
            negative = true;
            body = inner.trim();
        }
        body = strip_currency(body, culture.currency_symbol());
    }

    if let Some(rest) = strip_sign(body, true) {
        negative ^= rest.0;
        body = rest.1;
    } else if style == NumberStyle::Any
        && let Some(rest) = strip_sign(body, false)
    {
        negative ^= rest.0;
        body = rest.1;
    }

    if style == NumberStyle::Any {
        body = strip_currency(body, culture.currency_symbol());
    }

    let digits = normalize_digits(body, culture)?;
    let parsed: f64 = digits.parse().ok()?;
    Some(if negative { -parsed } else { parsed })
}

/// Parses the non-finite tokens (case-insensitive).
fn parse_special(value: &str) -> Option<f64> {
    let lower = value.to_lowercase();
    match lower.as_str() {
        "nan" => Some(f64::NAN),
        "infinity" | "+infinity" | "\u{221e}" => Some(f64::INFINITY),
        "-infinity" | "-\u{221e}" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

/// Strips a leading (or trailing) sign, returning whether it was negative.
fn strip_sign(value: &str, leading: bool) -> Option<(bool, &str)> {
    const MINUS: [char; 2] = ['-', '\u{2212}'];
    if leading {
        if let Some(rest) = value.strip_prefix(MINUS) {
            return Some((true, rest.trim_start()));
        }
        if let Some(rest) = value.strip_prefix('+') {
            return Some((false, rest.trim_start()));
        }
    } else {
        if let Some(rest) = value.strip_suffix(MINUS) {
            return Some((true, rest.trim_end()));
        }
        if let Some(rest) = value.strip_suffix('+') {
            return Some((false, rest.trim_end()));
        }
    }
    None
}

fn strip_currency<'a>(value: &'a str, symbol: &str) -> &'a str {
    if let Some(rest) = value.strip_prefix(symbol) {
        return rest.trim_start();
    }
    if let Some(rest) = value.strip_suffix(symbol) {
        return rest.trim_end();
    }
    value
}

/// Rewrites the culture-specific digits into a string `f64::from_str` accepts.
fn normalize_digits(value: &str, culture: &CultureProfile) -> Option<String> {
    let mut out = String::with_capacity(value.len());
    let mut seen_digit = false;
    let mut seen_decimal = false;
    let mut seen_exponent = false;

    for c in value.chars() {
        if c.is_ascii_digit() {
            out.push(c);
            seen_digit = true;
        } else if c == culture.decimal_separator() && !seen_decimal && !seen_exponent {
            out.push('.');
            seen_decimal = true;
        } else if culture.is_group_char(c) && seen_digit && !seen_decimal && !seen_exponent {
            // grouping is positional-free, like the host's lenient parser
        } else if (c == 'e' || c == 'E') && seen_digit && !seen_exponent {
            out.push('e');
            seen_exponent = true;
        } else if (c == '+' || c == '-') && out.ends_with('e') {
            out.push(c);
        } else {
            return None;
        }
    }

    if !seen_digit || out.ends_with(['e', '+', '-']) {
        return None;
    }
    Some(out)
}
