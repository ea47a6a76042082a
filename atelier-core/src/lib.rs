//! Atelier core library — versions, file snapshots, the migration contract.
//!
//! Public API surface:
//! - [`version`] — [`Version`] and the three-part comparator
//! - [`snapshot`] — [`FileSnapshot`] and [`FileChanges`]
//! - [`migration`] — the [`Migration`] trait every shipped upgrade implements
//! - [`paths`] — well-known consumer project layout
//! - [`error`] — [`VersionError`], [`MigrationError`]

pub mod error;
pub mod migration;
pub mod paths;
pub mod snapshot;
pub mod version;

pub use error::{MigrationError, VersionError};
pub use migration::Migration;
pub use snapshot::{FileChanges, FileSnapshot};
pub use version::{compare, Version};
