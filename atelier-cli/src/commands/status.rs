//! `atelier status` — per-migration view of what an upgrade would do.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use atelier_core::Version;
use atelier_migrations::Registry;
use atelier_upgrade::{marker, plan, MigrationState, MigrationStatus};

use super::{current_version, project_root};

/// Arguments for `atelier status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Project root to inspect.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusJson {
    marker: Version,
    current: Version,
    pending: usize,
    migrations: Vec<MigrationStatus>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "version")]
    version: String,
    #[tabled(rename = "migration")]
    description: String,
    #[tabled(rename = "state")]
    state: String,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let root = project_root(&self.root)?;
        let registry = Registry::builtin().context("migration registry is invalid")?;
        let current = current_version()?;
        let marker = marker::read(&root);
        let statuses = plan(&root, &registry);
        let pending = statuses
            .iter()
            .filter(|s| s.state != MigrationState::Clean)
            .count();
        tracing::debug!("{pending} of {} migrations need attention", statuses.len());

        if self.json {
            let payload = StatusJson {
                marker,
                current,
                pending,
                migrations: statuses,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        println!(
            "Atelier v{current} | marker {marker} | {} migrations | {pending} need attention",
            statuses.len(),
        );
        let rows: Vec<StatusTableRow> = statuses
            .into_iter()
            .map(|s| StatusTableRow {
                version: s.version.to_string(),
                description: s.description,
                state: state_label(&s.state),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");

        if pending > 0 {
            println!("Run 'atelier upgrade' to apply pending migrations.");
        }
        Ok(())
    }
}

fn state_label(state: &MigrationState) -> String {
    match state {
        MigrationState::Pending => "PENDING".yellow().bold().to_string(),
        MigrationState::Clean => "CLEAN".green().to_string(),
        MigrationState::Faulted { message } => format!("{} {message}", "FAULT".red().bold()),
    }
}
