//! # atelier-upgrade
//!
//! Runs the migration registry against a consumer project on disk.
//!
//! Call [`Runner::run`] to heal a project and advance its version marker, or
//! [`plan`] to see which migrations would apply without touching anything.

pub mod error;
pub mod guard;
pub mod marker;
pub mod plan;
pub mod resolver;
pub mod runner;
pub mod writer;

pub use error::UpgradeError;
pub use guard::{Fault, Stage};
pub use plan::{diff_changes, plan, FileDiff, MigrationState, MigrationStatus};
pub use resolver::Resolver;
pub use runner::{
    AppliedMigration, MarkerOutcome, RunMode, RunOptions, RunWarning, Runner, UpgradeReport,
};
pub use writer::{write_changes, WriteResult};
