//! Error types for the tabular data model.

use thiserror::Error;

/// Errors raised when a record set would violate its invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A record's arity differs from the column count of its set.
    #[error("record has {actual} values but the set has {expected} columns")]
    ArityMismatch { expected: usize, actual: usize },

    /// Two columns share the same name.
    #[error("duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    /// Column lookup by name failed.
    #[error("column '{name}' not found")]
    ColumnNotFound { name: String },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::ArityMismatch {
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "record has 3 values but the set has 2 columns"
        );
    }
}
