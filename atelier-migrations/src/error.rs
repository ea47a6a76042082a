//! Error types for atelier-migrations.

use atelier_core::Version;
use thiserror::Error;

/// Registry construction failures. These are build defects, not consumer
/// problems: a registry that fails to build must never run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Adjacent migrations are not strictly ascending.
    #[error(
        "migration at index {index} ({next}) does not sort after the previous one ({previous})"
    )]
    OutOfOrder {
        index: usize,
        previous: Version,
        next: Version,
    },
}
