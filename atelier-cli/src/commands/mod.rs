pub mod doctor;
pub mod status;
pub mod upgrade;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use atelier_core::Version;

/// The release this binary ships; written to the marker on convergence.
pub fn current_version() -> Result<Version> {
    env!("CARGO_PKG_VERSION")
        .parse()
        .context("package version is not MAJOR.MINOR.PATCH")
}

/// Check that `root` is an existing directory.
pub fn project_root(root: &Path) -> Result<PathBuf> {
    let meta = std::fs::metadata(root)
        .with_context(|| format!("cannot read project root '{}'", root.display()))?;
    if !meta.is_dir() {
        bail!("project root '{}' is not a directory", root.display());
    }
    tracing::debug!("project root: {}", root.display());
    Ok(root.to_path_buf())
}
