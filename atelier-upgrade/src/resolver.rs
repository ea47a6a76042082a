//! File resolver — assembles the snapshot a migration reads.
//!
//! Two stages:
//! 1. declared paths, read if present;
//! 2. discovery of per-project files under `projects/` (manifests and
//!    `v<N>` iteration pages), added unless already present.
//!
//! Discovery runs from scratch on every call. Nothing is cached, so a
//! project or iteration created between calls is always seen.

use std::collections::BTreeMap;
use std::fs::DirEntry;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use atelier_core::paths::{
    parse_iteration_dir, projects_root, ITERATION_PAGES, PROJECTS_DIR, PROJECT_MANIFEST,
};
use atelier_core::FileSnapshot;

#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
}

impl Resolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Snapshot of `declared` plus every discovered project file.
    ///
    /// Absent files are omitted; unreadable ones are logged and omitted.
    pub fn resolve(&self, declared: &[&str]) -> FileSnapshot {
        let mut files: BTreeMap<PathBuf, String> = BTreeMap::new();

        for rel in declared {
            let rel = PathBuf::from(rel);
            if files.contains_key(&rel) {
                continue;
            }
            if let Some(content) = self.read(&rel) {
                files.insert(rel, content);
            }
        }

        for rel in self.discover() {
            if files.contains_key(&rel) {
                continue;
            }
            if let Some(content) = self.read(&rel) {
                files.insert(rel, content);
            }
        }

        FileSnapshot::from_iter(files)
    }

    /// Root-relative paths of discovered project files, sorted by project
    /// name then iteration number.
    ///
    /// A missing `projects/` directory means no projects.
    pub fn discover(&self) -> Vec<PathBuf> {
        let container = projects_root(&self.root);
        let mut found = Vec::new();

        for project in sorted_dirs(&container) {
            let Some(name) = utf8_name(&project) else {
                continue;
            };
            let project_dir = project.path();
            let rel_project = Path::new(PROJECTS_DIR).join(&name);

            if project_dir.join(PROJECT_MANIFEST).is_file() {
                found.push(rel_project.join(PROJECT_MANIFEST));
            }

            let mut iterations: Vec<(u32, String)> = sorted_dirs(&project_dir)
                .iter()
                .filter_map(utf8_name)
                .filter_map(|dir| parse_iteration_dir(&dir).map(|n| (n, dir)))
                .collect();
            iterations.sort();

            for (_, dir) in iterations {
                for page in ITERATION_PAGES {
                    if project_dir.join(&dir).join(page).is_file() {
                        found.push(rel_project.join(&dir).join(page));
                    }
                }
            }
        }

        found
    }

    fn read(&self, rel: &Path) -> Option<String> {
        let path = self.root.join(rel);
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!("skipping unreadable {}: {err}", path.display());
                None
            }
        }
    }
}

/// Subdirectories of `dir`, sorted by name. Listing errors yield nothing.
fn sorted_dirs(dir: &Path) -> Vec<DirEntry> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            if err.kind() != ErrorKind::NotFound {
                tracing::warn!("cannot list {}: {err}", dir.display());
            }
            return vec![];
        }
    };
    let mut dirs: Vec<DirEntry> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .collect();
    dirs.sort_by_key(|e| e.file_name());
    dirs
}

fn utf8_name(entry: &DirEntry) -> Option<String> {
    let name = entry.file_name().into_string().ok();
    if name.is_none() {
        tracing::debug!("skipping non-UTF-8 directory {}", entry.path().display());
    }
    name
}
