//! Atomic writer for migration output.
//!
//! ## `write_changes` — all-or-nothing per migration
//!
//! 1. Reject any path that is absolute or climbs out of the root.
//! 2. Skip paths whose on-disk content already matches.
//! 3. Reject targets that exist but are not regular files, then stage every
//!    remaining path to `<path>.atelier.tmp`.
//! 4. If any check or staging write fails, remove every staged file; no
//!    target has been touched yet.
//! 5. Rename staged files into place.
//!
//! Steps 1-4 are all-or-nothing. The renames in step 5 are atomic per file
//! only: if one fails after others succeeded, the earlier targets keep
//! their new content and the error names the file that was not replaced.
//! The runner reports that as a write fault, its re-scan withholds the
//! marker, and the next run finishes the migration.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use atelier_core::paths::TMP_SUFFIX;
use atelier_core::FileChanges;

use crate::error::{io_err, UpgradeError};

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File already had this content; left untouched.
    Unchanged { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path } | WriteResult::Unchanged { path } => path,
        }
    }
}

/// Write every path in `changes` under `root`. Failures before the rename
/// phase write nothing; see the module docs for rename failures.
///
/// Returned results use root-relative paths, in `changes` order.
pub fn write_changes(root: &Path, changes: &FileChanges) -> Result<Vec<WriteResult>, UpgradeError> {
    for path in changes.paths() {
        ensure_relative(path)?;
    }

    let mut results = Vec::with_capacity(changes.len());
    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();

    for (rel, content) in changes.iter() {
        let target = root.join(rel);
        match prepare(&target, content) {
            Ok(None) => {
                tracing::debug!("unchanged: {}", rel.display());
                results.push(WriteResult::Unchanged {
                    path: rel.to_path_buf(),
                });
            }
            Ok(Some(tmp)) => {
                staged.push((tmp, target));
                results.push(WriteResult::Written {
                    path: rel.to_path_buf(),
                });
            }
            Err(e) => {
                discard(&staged);
                return Err(e);
            }
        }
    }

    for (idx, (tmp, target)) in staged.iter().enumerate() {
        if let Err(e) = std::fs::rename(tmp, target) {
            discard(&staged[idx..]);
            return Err(io_err(target, e));
        }
        tracing::info!("wrote: {}", target.display());
    }

    Ok(results)
}

/// Write a single file through a staged `.atelier.tmp` sibling.
pub(crate) fn atomic_write(path: &Path, content: &str) -> Result<(), UpgradeError> {
    let tmp = tmp_path(path);
    stage(path, &tmp, content)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

/// Stage `content` for `target`; `None` when the file already matches.
fn prepare(target: &Path, content: &str) -> Result<Option<PathBuf>, UpgradeError> {
    match std::fs::symlink_metadata(target) {
        Ok(meta) if meta.is_dir() => {
            return Err(io_err(
                target,
                std::io::Error::other("target exists and is a directory"),
            ));
        }
        _ => {}
    }
    if read_existing(target)?.as_deref() == Some(content) {
        return Ok(None);
    }
    let tmp = tmp_path(target);
    if let Err(e) = stage(target, &tmp, content) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(Some(tmp))
}

fn stage(target: &Path, tmp: &Path, content: &str) -> Result<(), UpgradeError> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        let _ = std::fs::remove_file(tmp);
    }
}

fn tmp_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(TMP_SUFFIX);
    PathBuf::from(name)
}

fn read_existing(path: &Path) -> Result<Option<String>, UpgradeError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        // Non-UTF-8 content is simply "different".
        Err(err) if err.kind() == ErrorKind::InvalidData => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

fn ensure_relative(path: &Path) -> Result<(), UpgradeError> {
    let ok = path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if ok {
        Ok(())
    } else {
        Err(UpgradeError::UnsafePath {
            path: path.to_path_buf(),
        })
    }
}
