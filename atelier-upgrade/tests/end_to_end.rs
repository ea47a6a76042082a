use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use filetime::{set_file_mtime, FileTime};
use tempfile::TempDir;

use atelier_core::{FileSnapshot, Version};
use atelier_migrations::Registry;
use atelier_upgrade::{marker, MarkerOutcome, RunOptions, Runner};

const OLDEST_SHAPE: &[(&str, &str)] = &[
    (
        "src/main.tsx",
        "import React from \"react\";\nimport App from \"./App\";\n\nrender(\n  <App />\n);\n",
    ),
    (
        "package.json",
        "{\n  \"name\": \"moodboard\",\n  \"scripts\": {\n    \"dev\": \"vite\"\n  }\n}\n",
    ),
    ("CLAUDE.md", "# Moodboard\n\n## Workflow\n\nIterate.\n\n## Notes\n\nKeep.\n"),
    ("atelier.config.yaml", "canvas:\n  zoom: 1\n"),
    ("projects/hero/project.json", "{\n  \"name\": \"hero\"\n}\n"),
    ("projects/hero/v1/docs.tsx", "export default () => null;\n"),
    (
        "projects/hero/v1/tokens.tsx",
        "export * from \"@atelier/tokens/legacy\";\n",
    ),
    ("projects/hero/v10/docs.tsx", "export default () => null;\n"),
    ("projects/hero/v2/docs.tsx", "export default () => null;\n"),
    ("projects/empty/project.json", "{\n  \"name\": \"empty\"\n}\n"),
];

fn current() -> Version {
    env!("CARGO_PKG_VERSION").parse().expect("package version")
}

fn scaffold(files: &[(&str, &str)]) -> TempDir {
    let root = TempDir::new().expect("tempdir");
    for (rel, content) in files {
        let path = root.path().join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, content).expect("write fixture");
    }
    root
}

/// Apply every migration in order to an in-memory copy of `files`.
fn sequential(registry: &Registry, files: &[(&str, &str)]) -> FileSnapshot {
    let mut snapshot: FileSnapshot = files.iter().copied().collect();
    for m in registry.iter() {
        if m.applies(&snapshot).expect("applies") {
            snapshot = m.migrate(&snapshot).expect("migrate").apply_to(&snapshot);
        }
    }
    snapshot
}

fn read(root: &Path, rel: &Path) -> String {
    fs::read_to_string(root.join(rel)).expect("read migrated file")
}

#[test]
fn oldest_shape_converges_in_one_run() {
    let registry = Registry::builtin().expect("registry");
    let root = scaffold(OLDEST_SHAPE);

    let report = Runner::new(root.path(), &registry)
        .run(&RunOptions::new(current()))
        .expect("run");

    assert!(report.is_clean(), "unexpected warnings: {:?}", report.warnings);
    assert_eq!(report.previous, Version::ZERO);
    let applied: Vec<String> = report.applied.iter().map(|a| a.version.to_string()).collect();
    assert_eq!(applied, ["0.1.0", "0.2.0", "0.3.0", "0.4.0", "0.5.0", "0.10.0"]);
    assert_eq!(report.marker, MarkerOutcome::Advanced { version: current() });
    assert_eq!(marker::read(root.path()), current());

    let expected = sequential(&registry, OLDEST_SHAPE);
    for (rel, content) in expected.iter() {
        assert_eq!(read(root.path(), rel), content, "{} differs", rel.display());
    }
}

#[test]
fn iteration_list_is_sorted_numerically() {
    let registry = Registry::builtin().expect("registry");
    let root = scaffold(OLDEST_SHAPE);
    Runner::new(root.path(), &registry)
        .run(&RunOptions::new(current()))
        .expect("run");

    let manifest: serde_json::Value =
        serde_json::from_str(&read(root.path(), Path::new("projects/hero/project.json")))
            .expect("manifest json");
    assert_eq!(manifest["iterations"], serde_json::json!(["v1", "v2", "v10"]));
    let empty: serde_json::Value =
        serde_json::from_str(&read(root.path(), Path::new("projects/empty/project.json")))
            .expect("manifest json");
    assert_eq!(empty["iterations"], serde_json::json!([]));
}

#[test]
fn second_run_touches_nothing() {
    let registry = Registry::builtin().expect("registry");
    let root = scaffold(OLDEST_SHAPE);
    let runner = Runner::new(root.path(), &registry);
    runner.run(&RunOptions::new(current())).expect("first run");

    let old = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(24 * 60 * 60));
    for (rel, _) in OLDEST_SHAPE {
        set_file_mtime(root.path().join(rel), old).expect("set old mtime");
    }

    let report = runner.run(&RunOptions::new(current())).expect("second run");
    assert_eq!(report.applied_count(), 0);
    assert!(report.is_clean(), "{:?}", report.warnings);
    assert_eq!(report.previous, current());

    for (rel, _) in OLDEST_SHAPE {
        let meta = fs::metadata(root.path().join(rel)).expect("metadata");
        assert_eq!(
            FileTime::from_last_modification_time(&meta),
            old,
            "{rel} was rewritten"
        );
    }
}

#[test]
fn dry_run_reports_the_same_work_without_writing() {
    let registry = Registry::builtin().expect("registry");
    let root = scaffold(OLDEST_SHAPE);

    let report = Runner::new(root.path(), &registry)
        .run(&RunOptions::new(current()).with_dry_run(true))
        .expect("dry run");

    assert_eq!(report.applied_count(), 6);
    assert_eq!(report.marker, MarkerOutcome::Skipped);
    assert!(report.is_clean(), "{:?}", report.warnings);
    assert!(!root.path().join(".atelier").exists());
    for (rel, content) in OLDEST_SHAPE {
        assert_eq!(read(root.path(), Path::new(rel)), *content, "{rel} was written");
    }
    let provider = &report.applied[0];
    assert!(provider.diffs[0].unified_diff.contains("+  <AnnotationProvider>"));
}

#[test]
fn empty_directory_is_healthy() {
    let registry = Registry::builtin().expect("registry");
    let root = TempDir::new().expect("tempdir");
    let report = Runner::new(root.path(), &registry)
        .run(&RunOptions::new(current()))
        .expect("run");
    assert_eq!(report.applied_count(), 0);
    assert_eq!(marker::read(root.path()), current());
}
