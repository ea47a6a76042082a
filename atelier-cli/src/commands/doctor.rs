//! `atelier doctor` — the upgrade run with every predicate result logged.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use atelier_upgrade::RunMode;

use super::upgrade::execute;

/// Arguments for `atelier doctor`.
#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Project root to check and repair.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl DoctorArgs {
    pub fn run(self) -> Result<()> {
        execute(&self.root, RunMode::Diagnostic, false, self.json)
    }
}
