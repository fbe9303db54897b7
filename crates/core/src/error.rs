//! Crate-wide error type.
//!
//! Recoverable conditions are returned as [`Error`] values; invariant
//! violations (a defect in the index itself, such as an insert that fails to
//! grow the base level) panic instead of returning.

use std::io;
use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by indexes, stores, and the database front.
#[derive(Debug, Error)]
pub enum Error {
    /// A vector's length disagrees with the index's fixed dimension.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A key or snapshot file is absent where one was required.
    #[error("not found: {0}")]
    NotFound(String),

    /// A distance name that is not in the metric registry.
    #[error("unknown distance metric {0:?}")]
    UnknownMetric(String),

    /// A snapshot written by an incompatible format version.
    #[error("incompatible snapshot version: expected {expected}, found {found}")]
    VersionMismatch { expected: i64, found: i64 },

    /// Malformed snapshot bytes.
    #[error("snapshot decode failed: {0}")]
    Decode(String),

    /// Underlying read or write failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The embedding collaborator failed to produce a vector.
    #[error("embedding failed: {0}")]
    Embedding(String),
}
