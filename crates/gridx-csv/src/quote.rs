//! Field quoting rules.

use std::borrow::Cow;

/// Returns true if a rendered value must be wrapped in double quotes.
///
/// A value is quoted when it contains the separator's first character, a
/// double quote, a line feed, or (for multi-character separators) the whole
/// separator.
pub fn needs_quotes(value: &str, separator: &str) -> bool {
    let first_matches = separator
        .chars()
        .next()
        .is_some_and(|first| value.contains(first));

    first_matches
        || value.contains('"')
        || value.contains('\n')
        || (separator.chars().count() > 1 && value.contains(separator))
}

/// Applies the quoting rule, doubling any embedded quotes.
pub fn quote_field<'a>(value: &'a str, separator: &str) -> Cow<'a, str> {
    if needs_quotes(value, separator) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_value_not_quoted() {
        assert!(!needs_quotes("Ann", ","));
        assert!(!needs_quotes("3.5", ","));
        assert!(!needs_quotes("", ","));
    }

    #[test]
    fn test_separator_quote_newline() {
        assert!(needs_quotes("B, C", ","));
        assert!(needs_quotes("say \"hi\"", ","));
        assert!(needs_quotes("line\nbreak", ","));
        assert!(!needs_quotes("B, C", ";"));
    }

    #[test]
    fn test_multi_char_separator_first_char() {
        assert!(needs_quotes("a|b", "||"));
        assert!(needs_quotes("a||b", "||"));
        assert!(!needs_quotes("a;b", "||"));
    }

    #[test]
    fn test_quote_field_doubles_quotes() {
        assert_eq!(quote_field("say \"hi\"", ","), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_field("B, C", ","), "\"B, C\"");
        assert_eq!(quote_field("Ann", ","), "Ann");
    }
}
