//! Error types for delimited-text encoding and decoding.

use std::io;

use gridx_model::ModelError;
use thiserror::Error;

/// Errors that can occur while encoding or decoding delimited text.
#[derive(Debug, Error)]
pub enum CsvError {
    /// The decoder only splits on single-byte separators.
    #[error("separator {separator:?} is not a single-byte character")]
    UnsupportedSeparator { separator: char },

    /// The byte source could not be opened or positioned.
    #[error("failed to open {name}: {source}")]
    Open {
        name: String,
        #[source]
        source: io::Error,
    },

    /// The column list could not be established.
    #[error("no columns available from {name}: {reason}")]
    NoColumns { name: String, reason: String },

    /// Writing encoded output failed.
    #[error("failed to write delimited text: {0}")]
    Write(#[from] io::Error),

    /// A decoded row did not fit the record set.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type for delimited-text operations.
pub type Result<T> = std::result::Result<T, CsvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CsvError::UnsupportedSeparator { separator: '\u{2016}' };
        assert_eq!(
            err.to_string(),
            "separator '\u{2016}' is not a single-byte character"
        );
        let err = CsvError::NoColumns {
            name: "orders.csv".to_string(),
            reason: "not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no columns available from orders.csv: not found"
        );
    }
}
