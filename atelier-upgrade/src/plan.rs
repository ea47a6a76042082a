//! Read-only views of pending work: per-migration status and unified diffs.

use std::path::{Path, PathBuf};

use serde::Serialize;
use similar::TextDiff;

use atelier_core::{FileChanges, FileSnapshot, Version};
use atelier_migrations::Registry;

use crate::guard::{guarded, Stage};
use crate::resolver::Resolver;

/// Predicate result for one migration against the current files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MigrationState {
    Pending,
    Clean,
    Faulted { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub version: Version,
    pub description: String,
    #[serde(flatten)]
    pub state: MigrationState,
}

/// A single file diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Check every migration against freshly resolved files without changing
/// anything.
pub fn plan(root: &Path, registry: &Registry) -> Vec<MigrationStatus> {
    let resolver = Resolver::new(root);
    registry
        .iter()
        .map(|m| {
            let snapshot = resolver.resolve(m.declared_files());
            let state = match guarded(m.version(), Stage::Applies, || m.applies(&snapshot)) {
                Ok(true) => MigrationState::Pending,
                Ok(false) => MigrationState::Clean,
                Err(fault) => MigrationState::Faulted {
                    message: fault.message,
                },
            };
            MigrationStatus {
                version: m.version(),
                description: m.description().to_string(),
                state,
            }
        })
        .collect()
}

/// Unified diffs between `before` and `before` with `changes` applied.
/// Paths absent from `before` diff against the empty file.
pub fn diff_changes(before: &FileSnapshot, changes: &FileChanges) -> Vec<FileDiff> {
    changes
        .iter()
        .filter_map(|(path, new)| {
            let old = before.get(path).unwrap_or("");
            if old == new {
                return None;
            }
            let old_header = format!("a/{}", path.display());
            let new_header = format!("b/{}", path.display());
            let unified = TextDiff::from_lines(old, new)
                .unified_diff()
                .context_radius(3)
                .header(&old_header, &new_header)
                .to_string();
            Some(FileDiff {
                path: path.to_path_buf(),
                unified_diff: unified,
            })
        })
        .collect()
}
