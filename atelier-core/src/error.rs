//! Error types for atelier-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from parsing a `MAJOR.MINOR.PATCH` version string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The input was the empty string.
    #[error("empty version string")]
    Empty,

    /// A component was empty, non-numeric, or overflowed `u64`.
    #[error("invalid component '{component}' in version '{input}'")]
    InvalidComponent { input: String, component: String },

    /// More than `MAJOR.MINOR.PATCH` was supplied.
    #[error("version '{input}' has more than three components")]
    TooManyComponents { input: String },
}

/// Unexpected faults raised by a migration's predicate or transform.
///
/// Absent files and unparsable structured files are *not* errors: the
/// migration reports "does not apply" for those. These variants are for
/// conditions the migration cannot reason about at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    /// A file was readable but its content broke an assumption the
    /// transform depends on.
    #[error("malformed {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// The transform produced a value it could not serialize back to text.
    #[error("failed to serialize {path}: {message}")]
    Serialize { path: PathBuf, message: String },

    /// Any other internal fault.
    #[error("{0}")]
    Internal(String),
}
