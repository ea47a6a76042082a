//! Version marker — the single persisted "healed to" fact.
//!
//! Stored at `<root>/.atelier/version.json` as `{ "version": "X.Y.Z" }`.
//! The marker is advisory: the runner never uses it to decide which
//! migrations to try, so a missing or corrupt marker just reads as `0.0.0`.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use atelier_core::paths::marker_path;
use atelier_core::Version;

use crate::error::{io_err, UpgradeError};
use crate::writer::atomic_write;

/// On-disk marker payload. Unknown fields are ignored on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMarker {
    pub version: Version,
}

/// Read the marker under `root`.
///
/// Never fails: absent → `0.0.0`; unreadable or unparsable → `0.0.0` with a
/// warning.
pub fn read(root: &Path) -> Version {
    let path = marker_path(root);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Version::ZERO,
        Err(err) => {
            tracing::warn!("ignoring unreadable version marker {}: {err}", path.display());
            return Version::ZERO;
        }
    };
    match serde_json::from_str::<VersionMarker>(&contents) {
        Ok(marker) => marker.version,
        Err(err) => {
            tracing::warn!("ignoring corrupt version marker {}: {err}", path.display());
            Version::ZERO
        }
    }
}

/// Overwrite the marker under `root` with `version`.
///
/// Output is deterministic: pretty JSON with a trailing newline.
pub fn write(root: &Path, version: Version) -> Result<(), UpgradeError> {
    let path = marker_path(root);
    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("invalid marker path")));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let mut json = serde_json::to_string_pretty(&VersionMarker { version })?;
    json.push('\n');
    atomic_write(&path, &json)?;
    tracing::debug!("version marker set to {version}");
    Ok(())
}
