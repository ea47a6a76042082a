//! Error types for atelier-upgrade.

use std::path::PathBuf;

use thiserror::Error;

use atelier_migrations::RegistryError;

/// Fatal errors from an upgrade run.
///
/// Faults inside individual migrations are not errors at this level: the
/// runner contains them and reports them as warnings.
#[derive(Debug, Error)]
pub enum UpgradeError {
    /// The migration registry failed its ordering check.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Marker serialization error.
    #[error("version marker JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A migration asked to write outside the project root.
    #[error("refusing to write outside the project root: {path}")]
    UnsafePath { path: PathBuf },
}

/// Convenience constructor for [`UpgradeError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> UpgradeError {
    UpgradeError::Io {
        path: path.into(),
        source,
    }
}
