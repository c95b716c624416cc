//! Error types for document conversion and transforms.

use gridx_model::ModelError;
use thiserror::Error;

/// Errors raised while converting between encodings and the document tree.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Markup text could not be parsed or written.
    #[error("invalid markup: {message}")]
    Markup { message: String },

    /// Key/value text could not be parsed or written.
    #[error("invalid key/value document: {message}")]
    KeyValue { message: String },

    /// The text names an encoding that does not exist.
    #[error("unknown document encoding '{name}'")]
    UnknownEncoding { name: String },

    /// The tree could not be turned into a record set.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl DocumentError {
    pub(crate) fn markup(err: impl std::fmt::Display) -> Self {
        Self::Markup {
            message: err.to_string(),
        }
    }

    pub(crate) fn key_value(err: impl std::fmt::Display) -> Self {
        Self::KeyValue {
            message: err.to_string(),
        }
    }
}

/// Errors surfaced by a transform pass.
///
/// Both variants are fatal to the operation that raised them.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The rule set is invalid, or could not be applied to the input.
    #[error("transform failed: {message}")]
    Failure { message: String },

    /// The transformed result could not be read back.
    #[error("transform result could not be parsed: {message}")]
    ResultParse { message: String },
}

impl TransformError {
    pub(crate) fn failure(err: impl std::fmt::Display) -> Self {
        Self::Failure {
            message: err.to_string(),
        }
    }

    pub(crate) fn result_parse(err: impl std::fmt::Display) -> Self {
        Self::ResultParse {
            message: err.to_string(),
        }
    }

    /// Returns the underlying human-readable message.
    pub fn message(&self) -> &str {
        match self {
            Self::Failure { message } | Self::ResultParse { message } => message,
        }
    }
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;
