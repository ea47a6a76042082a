//! Public-API checks for the comparator and the snapshot value types.

use std::cmp::Ordering;

use atelier_core::{compare, FileChanges, FileSnapshot, Version, VersionError};

#[test]
fn comparator_reference_cases() {
    assert_eq!(compare("0.0.10", "0.0.10").unwrap(), Ordering::Equal);
    assert_eq!(compare("0.0.9", "0.0.10").unwrap(), Ordering::Less);
    assert_eq!(compare("0.0.1", "0.1.0").unwrap(), Ordering::Less);
    assert_eq!(compare("1.0.0", "0.9.9").unwrap(), Ordering::Greater);
}

#[test]
fn comparator_surfaces_validation_errors() {
    let err = compare("1.0.0", "one").unwrap_err();
    assert!(matches!(err, VersionError::InvalidComponent { .. }), "got: {err}");
    assert!(err.to_string().contains("one"));
}

#[test]
fn sorted_versions_are_numeric_not_lexical() {
    let mut versions: Vec<Version> = ["0.10.0", "0.9.0", "0.1.0", "0.2"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    versions.sort();
    let rendered: Vec<String> = versions.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, ["0.1.0", "0.2.0", "0.9.0", "0.10.0"]);
}

#[test]
fn changes_overlay_is_a_new_value() {
    let before = FileSnapshot::from_iter([("a.txt", "1"), ("b.txt", "2")]);
    let changes = FileChanges::from_iter([("b.txt", "3")]);
    let after = changes.apply_to(&before);

    assert_eq!(before.get("b.txt"), Some("2"));
    assert_eq!(after.get("b.txt"), Some("3"));
    assert_eq!(after.get("a.txt"), Some("1"));
    assert_ne!(before, after);
}
