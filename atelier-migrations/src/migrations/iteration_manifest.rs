//! 0.5.0 — record design iterations in each project manifest.
//!
//! Projects and their `v<N>` iterations are discovered by the resolver, so
//! this migration declares no files and works purely from snapshot paths.
//! Every parseable `projects/<p>/project.json` without an `iterations` key
//! gets one listing that project's iterations in numeric order. Manifests
//! that already have the key, or do not parse, are not touched.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use atelier_core::paths::{classify, LayoutEntry, ITERATION_PREFIX};
use atelier_core::{FileChanges, FileSnapshot, Migration, MigrationError, Version};
use serde_json::{Map, Value};

use crate::text::{parse_json_object, render_json_like};

const KEY: &str = "iterations";

pub struct IterationManifest;

/// Iteration numbers per project, from whatever pages were discovered.
fn iterations_by_project(snapshot: &FileSnapshot) -> BTreeMap<&str, BTreeSet<u32>> {
    let mut out: BTreeMap<&str, BTreeSet<u32>> = BTreeMap::new();
    for path in snapshot.paths() {
        if let Some(LayoutEntry::IterationPage {
            project, iteration, ..
        }) = classify(path)
        {
            out.entry(project).or_default().insert(iteration);
        }
    }
    out
}

/// Manifests that parse and lack the key, with their parsed content.
fn stale_manifests(snapshot: &FileSnapshot) -> Vec<(&Path, &str, &str, Map<String, Value>)> {
    snapshot
        .iter()
        .filter_map(|(path, content)| {
            let Some(LayoutEntry::ProjectManifest { project }) = classify(path) else {
                return None;
            };
            let manifest = parse_json_object(path, content)?;
            (!manifest.contains_key(KEY)).then_some((path, project, content, manifest))
        })
        .collect()
}

impl Migration for IterationManifest {
    fn version(&self) -> Version {
        Version::new(0, 5, 0)
    }

    fn description(&self) -> &'static str {
        "Record design iterations in project manifests"
    }

    fn declared_files(&self) -> &'static [&'static str] {
        &[]
    }

    fn applies(&self, snapshot: &FileSnapshot) -> Result<bool, MigrationError> {
        Ok(!stale_manifests(snapshot).is_empty())
    }

    fn migrate(&self, snapshot: &FileSnapshot) -> Result<FileChanges, MigrationError> {
        let iterations = iterations_by_project(snapshot);
        let mut changes = FileChanges::none();

        for (path, project, content, mut manifest) in stale_manifests(snapshot) {
            let list = iterations
                .get(project)
                .into_iter()
                .flatten()
                .map(|n| Value::String(format!("{ITERATION_PREFIX}{n}")))
                .collect();
            manifest.insert(KEY.to_string(), Value::Array(list));
            changes.insert(path, render_json_like(path, manifest, content)?);
        }
        Ok(changes)
    }
}
