//! Error types for ragline-vector.

use thiserror::Error;

/// Result type for ragline-vector operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying an index.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Dimension mismatch between a vector and the index.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension fixed at build time.
        expected: usize,
        /// Dimension of the offending vector.
        actual: usize,
    },

    /// Invalid vector (zero-length, contains NaN or Inf).
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// Requested neighbor count is not usable.
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
}
