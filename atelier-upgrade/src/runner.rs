//! Migration runner: execute, verify, re-scan, then advance the marker.
//!
//! ## One run
//!
//! 1. For each migration, in registry order: resolve a fresh snapshot, ask
//!    `applies`, and if so `migrate`, write, re-resolve and ask `applies`
//!    again. A migration that still applies is logged, not fatal.
//! 2. If anything was applied (or anything faulted), re-check the whole
//!    registry against fresh snapshots. Only a clean re-scan advances the
//!    marker to the current tool version.
//! 3. If nothing applied and nothing faulted, the project is treated as
//!    healthy and the marker is advanced straight away.
//!
//! The marker is read for reporting only. Every migration is checked on
//! every run, which is what lets a run heal consumers left behind by a
//! crash, a reverted edit or an earlier buggy migration.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use atelier_core::paths::classify;
use atelier_core::{FileChanges, FileSnapshot, Migration, Version};
use atelier_migrations::Registry;

use crate::error::UpgradeError;
use crate::guard::{guarded, Fault, Stage};
use crate::marker;
use crate::plan::{diff_changes, FileDiff};
use crate::resolver::Resolver;
use crate::writer::{write_changes, WriteResult};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Normal upgrade or diagnostics. Both run the same algorithm; diagnostics
/// also logs every predicate result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Normal,
    Diagnostic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Version written to the marker on convergence.
    pub current: Version,
    pub mode: RunMode,
    /// Compute and report changes without writing files or the marker.
    pub dry_run: bool,
}

impl RunOptions {
    pub fn new(current: Version) -> Self {
        Self {
            current,
            mode: RunMode::Normal,
            dry_run: false,
        }
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedMigration {
    pub version: Version,
    pub description: String,
    /// Root-relative paths the migration rewrote.
    pub files: Vec<PathBuf>,
    /// Unified diffs, filled in dry-run mode only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diffs: Vec<FileDiff>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunWarning {
    /// A migration errored or panicked; treated as not applied this run.
    Fault {
        version: Version,
        stage: Stage,
        message: String,
    },
    /// `applies` was still true right after the migration's own write.
    StillApplies { version: Version },
    /// `applies` was true in the final re-scan.
    NeedsAttention { version: Version },
    /// The re-scan was not clean, so the marker kept its old value.
    MarkerWithheld,
    /// The marker records a newer release than the one running.
    MarkerAhead { marker: Version, current: Version },
}

impl From<Fault> for RunWarning {
    fn from(f: Fault) -> Self {
        RunWarning::Fault {
            version: f.version,
            stage: f.stage,
            message: f.message,
        }
    }
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunWarning::Fault {
                version,
                stage,
                message,
            } => write!(f, "migration {version} failed during {stage}: {message}"),
            RunWarning::StillApplies { version } => {
                write!(f, "migration {version} still applies after running")
            }
            RunWarning::NeedsAttention { version } => {
                write!(f, "migration {version} still needs attention after run")
            }
            RunWarning::MarkerWithheld => write!(f, "marker NOT advanced — rerun diagnostics"),
            RunWarning::MarkerAhead { marker, current } => write!(
                f,
                "project marker {marker} is newer than this atelier ({current})"
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MarkerOutcome {
    Advanced { version: Version },
    Withheld,
    /// Dry run: the marker is never written.
    Skipped,
}

/// Everything one run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeReport {
    /// Marker value before the run.
    pub previous: Version,
    pub current: Version,
    pub mode: RunMode,
    pub dry_run: bool,
    pub applied: Vec<AppliedMigration>,
    pub warnings: Vec<RunWarning>,
    pub marker: MarkerOutcome,
}

impl UpgradeReport {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// No warnings at all.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

pub struct Runner<'r> {
    resolver: Resolver,
    registry: &'r Registry,
}

impl<'r> Runner<'r> {
    pub fn new(root: impl Into<PathBuf>, registry: &'r Registry) -> Self {
        Self {
            resolver: Resolver::new(root),
            registry,
        }
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    /// Run every migration once and advance the marker on convergence.
    ///
    /// Only marker I/O is fatal. Migration faults, write failures and
    /// non-convergence come back as warnings in the report.
    pub fn run(&self, options: &RunOptions) -> Result<UpgradeReport, UpgradeError> {
        let previous = marker::read(self.root());
        let mut warnings = Vec::new();
        let mut applied = Vec::new();

        tracing::info!(
            "upgrading {} from {previous} to {}{}",
            self.root().display(),
            options.current,
            if options.dry_run { " (dry run)" } else { "" }
        );
        if previous > options.current {
            let w = RunWarning::MarkerAhead {
                marker: previous,
                current: options.current,
            };
            tracing::warn!("{w}");
            warnings.push(w);
        }

        // Dry runs never touch disk, so later migrations see earlier ones'
        // output through this overlay instead.
        let mut overlay = FileChanges::none();
        let mut faulted = false;

        for m in self.registry.iter() {
            match self.step(m, options, &mut overlay, &mut warnings) {
                Ok(Some(done)) => {
                    tracing::info!("migrated: {} ({})", m.description(), m.version());
                    applied.push(done);
                }
                Ok(None) => {}
                Err(fault) => {
                    faulted = true;
                    let w = RunWarning::from(fault);
                    tracing::warn!("{w}");
                    warnings.push(w);
                }
            }
        }

        let converged = if applied.is_empty() && !faulted {
            true
        } else {
            self.rescan(options, &overlay, &mut warnings)
        };

        let marker = if !converged {
            let w = RunWarning::MarkerWithheld;
            tracing::warn!("{w}");
            warnings.push(w);
            MarkerOutcome::Withheld
        } else if options.dry_run {
            MarkerOutcome::Skipped
        } else {
            marker::write(self.root(), options.current)?;
            MarkerOutcome::Advanced {
                version: options.current,
            }
        };

        tracing::info!("{} migration(s) applied", applied.len());
        Ok(UpgradeReport {
            previous,
            current: options.current,
            mode: options.mode,
            dry_run: options.dry_run,
            applied,
            warnings,
            marker,
        })
    }

    /// Check, apply and verify one migration. `Ok(None)` when it did not
    /// apply.
    fn step(
        &self,
        m: &dyn Migration,
        options: &RunOptions,
        overlay: &mut FileChanges,
        warnings: &mut Vec<RunWarning>,
    ) -> Result<Option<AppliedMigration>, Fault> {
        let version = m.version();
        let snapshot = self.snapshot(m, overlay);

        let applies = guarded(version, Stage::Applies, || m.applies(&snapshot))?;
        if options.mode == RunMode::Diagnostic {
            tracing::info!(
                "checked: {} ({version}): {}",
                m.description(),
                if applies { "pending" } else { "clean" }
            );
        }
        if !applies {
            return Ok(None);
        }

        let changes =
            guarded(version, Stage::Migrate, || m.migrate(&snapshot))?.without_noops(&snapshot);

        let (files, diffs) = if options.dry_run {
            let diffs = diff_changes(&snapshot, &changes);
            let files = changes.paths().map(Path::to_path_buf).collect();
            for (path, content) in changes {
                overlay.insert(path, content);
            }
            (files, diffs)
        } else {
            let written = write_changes(self.root(), &changes)
                .map_err(|e| Fault {
                    version,
                    stage: Stage::Write,
                    message: e.to_string(),
                })?
                .into_iter()
                .filter(|r| matches!(r, WriteResult::Written { .. }))
                .map(|r| r.path().to_path_buf())
                .collect();
            (written, Vec::new())
        };

        // Verification reads disk again rather than trusting `changes`.
        let post = self.snapshot(m, overlay);
        match guarded(version, Stage::Verify, || m.applies(&post)) {
            Ok(false) => {}
            Ok(true) => {
                let w = RunWarning::StillApplies { version };
                tracing::warn!("{w}");
                warnings.push(w);
            }
            Err(fault) => {
                let w = RunWarning::from(fault);
                tracing::warn!("{w}");
                warnings.push(w);
            }
        }

        Ok(Some(AppliedMigration {
            version,
            description: m.description().to_string(),
            files,
            diffs,
        }))
    }

    /// Full-registry re-check. `true` when no migration applies or faults.
    fn rescan(
        &self,
        options: &RunOptions,
        overlay: &FileChanges,
        warnings: &mut Vec<RunWarning>,
    ) -> bool {
        let mut clean = true;
        for m in self.registry.iter() {
            let version = m.version();
            let snapshot = self.snapshot(m, overlay);
            let w = match guarded(version, Stage::Rescan, || m.applies(&snapshot)) {
                Ok(false) => continue,
                Ok(true) => RunWarning::NeedsAttention { version },
                Err(fault) => RunWarning::from(fault),
            };
            tracing::warn!("{w}");
            warnings.push(w);
            clean = false;
        }
        if options.mode == RunMode::Diagnostic && clean {
            tracing::info!("re-scan clean: every migration is satisfied");
        }
        clean
    }

    /// Fresh snapshot for `m`, with any dry-run overlay laid on top.
    fn snapshot(&self, m: &dyn Migration, overlay: &FileChanges) -> FileSnapshot {
        let snapshot = self.resolver.resolve(m.declared_files());
        if overlay.is_empty() {
            return snapshot;
        }
        let declared = m.declared_files();
        let relevant: FileChanges = overlay
            .iter()
            .filter(|(path, _)| {
                snapshot.contains(path)
                    || declared.iter().any(|d| Path::new(d) == *path)
                    || classify(path).is_some()
            })
            .collect();
        relevant.apply_to(&snapshot)
    }
}
