//! `atelier upgrade` — heal the project and advance its version marker.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use atelier_migrations::Registry;
use atelier_upgrade::{MarkerOutcome, RunMode, RunOptions, Runner, UpgradeReport};

use super::{current_version, project_root};

/// Arguments for `atelier upgrade`.
#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Project root to upgrade.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Show what would change without writing any files.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl UpgradeArgs {
    pub fn run(self) -> Result<()> {
        execute(&self.root, RunMode::Normal, self.dry_run, self.json)
    }
}

/// Shared by `upgrade` and `doctor`.
pub fn execute(root: &Path, mode: RunMode, dry_run: bool, json: bool) -> Result<()> {
    let root = project_root(root)?;
    let registry = Registry::builtin().context("migration registry is invalid")?;
    let options = RunOptions::new(current_version()?)
        .with_mode(mode)
        .with_dry_run(dry_run);

    let report = Runner::new(&root, &registry)
        .run(&options)
        .with_context(|| format!("upgrade failed for '{}'", root.display()))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize report JSON")?
        );
        return Ok(());
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &UpgradeReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    for applied in &report.applied {
        println!(
            "{prefix}{} {} ({})",
            "✓".green().bold(),
            applied.description,
            applied.version
        );
        for path in &applied.files {
            println!("  ✎  {}", path.display());
        }
        for diff in &applied.diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }
    }

    for warning in &report.warnings {
        println!("{} {warning}", "!".yellow().bold());
    }

    match report.marker {
        MarkerOutcome::Advanced { version } if report.previous == version => {
            println!("{prefix}Project is up to date at {version}.");
        }
        MarkerOutcome::Advanced { version } => {
            println!("{prefix}Project upgraded {} → {version}.", report.previous);
        }
        MarkerOutcome::Withheld => {
            println!(
                "{}",
                "Marker left at previous version; run `atelier doctor` for details.".red()
            );
        }
        MarkerOutcome::Skipped => {
            println!("{prefix}Marker unchanged.");
        }
    }
    println!("{prefix}{} migration(s) applied", report.applied_count());
}
