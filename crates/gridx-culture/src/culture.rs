//! Built-in culture profiles.

use std::fmt;

use crate::error::{CultureError, Result};

/// Number and date-time conventions for one locale.
///
/// Profiles are static; resolve one by identifier with
/// [`CultureProfile::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CultureProfile {
    name: &'static str,
    decimal_separator: char,
    group_separator: char,
    currency_symbol: &'static str,
    /// chrono pattern for the culture's short date + long time.
    datetime_format: &'static str,
}

static INVARIANT: CultureProfile = CultureProfile {
    name: "invariant",
    decimal_separator: '.',
    group_separator: ',',
    currency_symbol: "\u{a4}",
    datetime_format: gridx_model::INVARIANT_DATETIME_FORMAT,
};

static CULTURES: &[CultureProfile] = &[
    CultureProfile {
        name: "en-US",
        decimal_separator: '.',
        group_separator: ',',
        currency_symbol: "$",
        datetime_format: "%-m/%-d/%Y %-I:%M:%S %p",
    },
    CultureProfile {
        name: "en-GB",
        decimal_separator: '.',
        group_separator: ',',
        currency_symbol: "\u{a3}",
        datetime_format: "%d/%m/%Y %H:%M:%S",
    },
    CultureProfile {
        name: "de-DE",
        decimal_separator: ',',
        group_separator: '.',
        currency_symbol: "\u{20ac}",
        datetime_format: "%d.%m.%Y %H:%M:%S",
    },
    CultureProfile {
        name: "fr-FR",
        decimal_separator: ',',
        group_separator: '\u{202f}',
        currency_symbol: "\u{20ac}",
        datetime_format: "%d/%m/%Y %H:%M:%S",
    },
    CultureProfile {
        name: "nl-NL",
        decimal_separator: ',',
        group_separator: '.',
        currency_symbol: "\u{20ac}",
        datetime_format: "%-d-%-m-%Y %H:%M:%S",
    },
    CultureProfile {
        name: "es-ES",
        decimal_separator: ',',
        group_separator: '.',
        currency_symbol: "\u{20ac}",
        datetime_format: "%d/%m/%Y %-H:%M:%S",
    },
    CultureProfile {
        name: "it-IT",
        decimal_separator: ',',
        group_separator: '.',
        currency_symbol: "\u{20ac}",
        datetime_format: "%d/%m/%Y %H:%M:%S",
    },
    CultureProfile {
        name: "pt-BR",
        decimal_separator: ',',
        group_separator: '.',
        currency_symbol: "R$",
        datetime_format: "%d/%m/%Y %H:%M:%S",
    },
    CultureProfile {
        name: "sv-SE",
        decimal_separator: ',',
        group_separator: '\u{a0}',
        currency_symbol: "kr",
        datetime_format: "%Y-%m-%d %H:%M:%S",
    },
    CultureProfile {
        name: "ja-JP",
        decimal_separator: '.',
        group_separator: ',',
        currency_symbol: "\u{ffe5}",
        datetime_format: "%Y/%m/%d %-H:%M:%S",
    },
];

impl CultureProfile {
    /// The locale-neutral profile.
    pub fn invariant() -> &'static CultureProfile {
        &INVARIANT
    }

    /// Resolves a culture identifier such as `de-DE` or `en_gb`.
    ///
    /// Matching is case-insensitive and accepts `_` in place of `-`. A blank
    /// identifier or `invariant` resolves to the locale-neutral profile.
    pub fn resolve(name: &str) -> Result<&'static CultureProfile> {
        let normalized = name.trim().replace('_', "-");
        if normalized.is_empty() || normalized.eq_ignore_ascii_case(INVARIANT.name) {
            return Ok(&INVARIANT);
        }
        CULTURES
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| CultureError::Unknown {
                name: name.trim().to_string(),
            })
    }

    /// Resolves an optional identifier; blank or absent means "no culture".
    pub fn resolve_optional(name: Option<&str>) -> Result<Option<&'static CultureProfile>> {
        match name.map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => Self::resolve(name).map(Some),
        }
    }

    /// Lists the identifiers of all built-in cultures.
    pub fn available() -> impl Iterator<Item = &'static str> {
        std::iter::once(INVARIANT.name).chain(CULTURES.iter().map(|c| c.name))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    pub fn group_separator(&self) -> char {
        self.group_separator
    }

    pub fn currency_symbol(&self) -> &'static str {
        self.currency_symbol
    }

    pub fn datetime_format(&self) -> &'static str {
        self.datetime_format
    }

    pub fn is_invariant(&self) -> bool {
        self.name == INVARIANT.name
    }

    /// Returns true if `c` acts as a grouping separator in this culture.
    ///
    /// Space-like group separators accept any of the space variants.
    pub(crate) fn is_group_char(&self, c: char) -> bool {
        if c == self.group_separator {
            return true;
        }
        is_space_like(self.group_separator) && is_space_like(c)
    }
}

fn is_space_like(c: char) -> bool {
    matches!(c, ' ' | '\u{a0}' | '\u{202f}')
}

impl fmt::Display for CultureProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
