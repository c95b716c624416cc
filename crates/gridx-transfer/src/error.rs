//! Error types for object transfer and the exchange adapters.

use std::io;
use std::path::PathBuf;

use gridx_csv::CsvError;
use gridx_document::TransformError;
use thiserror::Error;

/// Errors raised by an [`ObjectStore`](crate::ObjectStore).
#[derive(Debug, Error)]
pub enum TransferError {
    /// The endpoint does not name a store this build can reach.
    #[error("unsupported store endpoint '{endpoint}'")]
    UnsupportedEndpoint { endpoint: String },

    /// Bucket or key would escape the store root.
    #[error("invalid object location {bucket}|{key}")]
    InvalidLocation { bucket: String, key: String },

    #[error("object {bucket}|{key} does not exist")]
    NotFound { bucket: String, key: String },

    #[error("failed to upload {bucket}|{key}: {source}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to download {bucket}|{key}: {source}")]
    Download {
        bucket: String,
        key: String,
        #[source]
        source: io::Error,
    },
}

impl TransferError {
    pub(crate) fn upload(bucket: &str, key: &str, source: io::Error) -> Self {
        Self::Upload {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        }
    }

    pub(crate) fn download(bucket: &str, key: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            return Self::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            };
        }
        Self::Download {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        }
    }
}

/// Broad category of an [`AdapterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ConfigurationMissing,
    InvalidConfiguration,
    LocaleInvalid,
    TransferFailure,
    TransformFailure,
    ResultParseFailure,
    Codec,
}

/// Failure result of an export, import, or settings operation.
///
/// The display text is the human-readable message reported to the host.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdapterError {
    // =========================================================================
    // CONFIGURATION
    // =========================================================================
    /// A required parameter is absent or blank; raised before any I/O.
    #[error("The {parameter} parameter is not specified")]
    ConfigurationMissing { parameter: &'static str },

    #[error("Invalid Message Type '{value}'")]
    InvalidMessageType { value: String },

    #[error("no settings for table '{table}'")]
    UnknownTable { table: String },

    #[error("failed to load settings from {path}: {message}")]
    Settings { path: PathBuf, message: String },

    #[error("The culture '{culture}' is not valid. Message: {message}")]
    LocaleInvalid { culture: String, message: String },

    // =========================================================================
    // RUNTIME
    // =========================================================================
    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("transform failed: {message}")]
    Transform { message: String },

    #[error("transform result could not be parsed: {message}")]
    ResultParse { message: String },

    #[error("failed to encode records: {0}")]
    Encode(#[source] CsvError),

    #[error("failed to decode records: {0}")]
    Decode(#[source] CsvError),
}

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;

impl From<TransformError> for AdapterError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::Failure { message } => Self::Transform { message },
            TransformError::ResultParse { message } => Self::ResultParse { message },
        }
    }
}

impl AdapterError {
    pub(crate) fn settings(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Settings {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationMissing { .. } => ErrorKind::ConfigurationMissing,
            Self::InvalidMessageType { .. } | Self::UnknownTable { .. } | Self::Settings { .. } => {
                ErrorKind::InvalidConfiguration
            }
            Self::LocaleInvalid { .. } => ErrorKind::LocaleInvalid,
            Self::Transfer(_) => ErrorKind::TransferFailure,
            Self::Transform { .. } => ErrorKind::TransformFailure,
            Self::ResultParse { .. } => ErrorKind::ResultParseFailure,
            Self::Encode(_) | Self::Decode(_) => ErrorKind::Codec,
        }
    }

    /// Check if this error is recoverable (user can fix the settings and retry).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ConfigurationMissing
                | ErrorKind::InvalidConfiguration
                | ErrorKind::LocaleInvalid
                | ErrorKind::TransformFailure
        )
    }

    /// Get a user-friendly suggestion for fixing this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ConfigurationMissing { .. } => {
                Some("Fill in the missing value in the [store] or table section of the settings.")
            }
            Self::InvalidMessageType { .. } => Some("Use one of CSV, XML, JSON, or OTHER."),
            Self::UnknownTable { .. } => Some("Add a [tables.<name>] section to the settings."),
            Self::LocaleInvalid { .. } => {
                Some("Use a culture identifier such as en-US or de-DE, or leave it empty.")
            }
            Self::Transfer(TransferError::NotFound { .. }) => {
                Some("Check that the bucket and key name an existing object.")
            }
            Self::Transfer(TransferError::UnsupportedEndpoint { .. }) => {
                Some("Use a file:// endpoint that points at the store directory.")
            }
            Self::Transform { .. } => {
                Some("Check the rule set; use <rules> with select, rename, drop, unwrap or lift-attributes.")
            }
            Self::ResultParse { .. } => {
                Some("Check that the transformed document has one element per row.")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameter_message() {
        let err = AdapterError::ConfigurationMissing {
            parameter: "Bucket Name",
        };
        assert_eq!(err.to_string(), "The Bucket Name parameter is not specified");
        assert_eq!(err.kind(), ErrorKind::ConfigurationMissing);
        assert!(err.is_recoverable());
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_transform_errors_keep_their_message() {
        let err = AdapterError::from(TransformError::Failure {
            message: "unknown rule element 'explode'".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::TransformFailure);
        assert_eq!(err.to_string(), "transform failed: unknown rule element 'explode'");

        let err = AdapterError::from(TransformError::ResultParse {
            message: "bad".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::ResultParseFailure);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_missing_object_is_not_found() {
        let err = TransferError::download(
            "exports",
            "a.csv",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, TransferError::NotFound { .. }));
        assert_eq!(err.to_string(), "object exports|a.csv does not exist");
    }
}
