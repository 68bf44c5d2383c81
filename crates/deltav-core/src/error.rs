//! Error types for deltav.

use thiserror::Error;

/// Main error type for codec operations.
#[derive(Error, Debug)]
pub enum DeltavError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Allocation failed: {0}")]
    Allocation(String),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Decompression error: {0}")]
    Decompression(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DeltavError {
    /// Shorthand for a size disagreement between two byte counts.
    pub fn size_mismatch(expected: usize, got: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{} bytes", expected),
            got: format!("{} bytes", got),
        }
    }
}

impl From<std::collections::TryReserveError> for DeltavError {
    fn from(e: std::collections::TryReserveError) -> Self {
        Self::Allocation(e.to_string())
    }
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, DeltavError>;
