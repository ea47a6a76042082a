//! The contract every shipped upgrade implements.
//!
//! A migration is a pure function pair over a [`FileSnapshot`]:
//!
//! - [`Migration::applies`] answers "does this snapshot still need me?" It
//!   returns `Ok(false)` when any file it depends on is absent, and when a
//!   structured file it would edit cannot be parsed.
//! - [`Migration::migrate`] returns only the paths it rewrote. Running it on
//!   its own output, or on a snapshot where `applies` is `false`, yields no
//!   effective change.
//!
//! Migrations never touch the filesystem. Discovery belongs to the resolver
//! and writes belong to the runner.

use crate::error::MigrationError;
use crate::snapshot::{FileChanges, FileSnapshot};
use crate::version::Version;

pub trait Migration: Send + Sync {
    /// Release that introduced this migration. Unique within a registry.
    fn version(&self) -> Version;

    /// Operator-facing one-line summary.
    fn description(&self) -> &'static str;

    /// Relative paths that seed the snapshot. Dynamically discovered project
    /// files are added by the resolver on top of these.
    fn declared_files(&self) -> &'static [&'static str];

    fn applies(&self, snapshot: &FileSnapshot) -> Result<bool, MigrationError>;

    fn migrate(&self, snapshot: &FileSnapshot) -> Result<FileChanges, MigrationError>;
}

impl std::fmt::Debug for dyn Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("version", &self.version())
            .field("description", &self.description())
            .finish()
    }
}
