//! Error types for culture resolution.

use thiserror::Error;

/// Errors that can occur while resolving a culture identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CultureError {
    /// The identifier does not name a known culture.
    #[error("culture '{name}' is not supported")]
    Unknown { name: String },
}

/// Result type for culture operations.
pub type Result<T> = std::result::Result<T, CultureError>;
