//! Value-type views of consumer file content.
//!
//! A [`FileSnapshot`] is what a migration reads; a [`FileChanges`] is what it
//! returns. Both key on paths relative to the consumer project root.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// FileSnapshot
// ---------------------------------------------------------------------------

/// Immutable map from relative path to full file text.
///
/// Covers exactly the paths that were requested and present on disk. There
/// is no mutation API: producing a different snapshot means building a new
/// one (see [`FileChanges::apply_to`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSnapshot {
    files: BTreeMap<PathBuf, String>,
}

impl FileSnapshot {
    /// A snapshot with no files.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files.contains_key(path.as_ref())
    }

    /// Paths in deterministic (sorted) order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files
            .iter()
            .map(|(path, content)| (path.as_path(), content.as_str()))
    }

    /// Entries whose path satisfies `pred`, in sorted order.
    pub fn matching<'a, F>(&'a self, pred: F) -> impl Iterator<Item = (&'a Path, &'a str)> + 'a
    where
        F: Fn(&Path) -> bool + 'a,
    {
        self.iter().filter(move |(path, _)| pred(path))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<P, S> FromIterator<(P, S)> for FileSnapshot
where
    P: Into<PathBuf>,
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (P, S)>>(iter: I) -> Self {
        Self {
            files: iter
                .into_iter()
                .map(|(p, s)| (p.into(), s.into()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// FileChanges
// ---------------------------------------------------------------------------

/// The partial snapshot a migration returns: only the paths it rewrote,
/// each mapped to its complete new content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChanges {
    files: BTreeMap<PathBuf, String>,
}

impl FileChanges {
    /// No changes.
    pub fn none() -> Self {
        Self::default()
    }

    /// Record the new full content for `path`. A later insert for the same
    /// path replaces the earlier one.
    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files
            .iter()
            .map(|(path, content)| (path.as_path(), content.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Overlay these changes on `snapshot`, producing the in-memory
    /// post-image. Paths not in the snapshot are added.
    pub fn apply_to(&self, snapshot: &FileSnapshot) -> FileSnapshot {
        let mut files = snapshot.files.clone();
        for (path, content) in &self.files {
            files.insert(path.clone(), content.clone());
        }
        FileSnapshot { files }
    }

    /// Drop entries whose content is identical to what `snapshot` already
    /// holds for that path.
    pub fn without_noops(self, snapshot: &FileSnapshot) -> Self {
        Self {
            files: self
                .files
                .into_iter()
                .filter(|(path, content)| snapshot.get(path) != Some(content.as_str()))
                .collect(),
        }
    }
}

impl IntoIterator for FileChanges {
    type Item = (PathBuf, String);
    type IntoIter = btree_map::IntoIter<PathBuf, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl<P, S> FromIterator<(P, S)> for FileChanges
where
    P: Into<PathBuf>,
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (P, S)>>(iter: I) -> Self {
        Self {
            files: iter
                .into_iter()
                .map(|(p, s)| (p.into(), s.into()))
                .collect(),
        }
    }
}
