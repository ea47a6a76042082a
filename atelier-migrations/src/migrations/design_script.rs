//! 0.2.0 — add `"design": "atelier dev"` to package.json scripts.
//!
//! Merges into the existing `scripts` object (creating it if absent) and
//! leaves every other key where it was. A manifest that is not valid JSON,
//! or whose `scripts` is not an object, is left untouched.

use std::path::Path;

use atelier_core::{FileChanges, FileSnapshot, Migration, MigrationError, Version};
use serde_json::{Map, Value};

use crate::text::{parse_json_object, render_json_like};

const PACKAGE_JSON: &str = "package.json";
const SCRIPT_NAME: &str = "design";
const SCRIPT_COMMAND: &str = "atelier dev";

pub struct DesignScript;

/// `Some(map)` when the manifest parses and is missing the script.
fn needs_script(content: &str) -> Option<Map<String, Value>> {
    let manifest = parse_json_object(Path::new(PACKAGE_JSON), content)?;
    match manifest.get("scripts") {
        None => Some(manifest),
        Some(Value::Object(scripts)) if !scripts.contains_key(SCRIPT_NAME) => Some(manifest),
        Some(Value::Object(_)) => None,
        Some(_) => {
            tracing::debug!("skipping {PACKAGE_JSON}: `scripts` is not an object");
            None
        }
    }
}

impl Migration for DesignScript {
    fn version(&self) -> Version {
        Version::new(0, 2, 0)
    }

    fn description(&self) -> &'static str {
        "Add the design script to package.json"
    }

    fn declared_files(&self) -> &'static [&'static str] {
        &[PACKAGE_JSON]
    }

    fn applies(&self, snapshot: &FileSnapshot) -> Result<bool, MigrationError> {
        Ok(snapshot
            .get(PACKAGE_JSON)
            .and_then(needs_script)
            .is_some())
    }

    fn migrate(&self, snapshot: &FileSnapshot) -> Result<FileChanges, MigrationError> {
        let Some(content) = snapshot.get(PACKAGE_JSON) else {
            return Ok(FileChanges::none());
        };
        let Some(mut manifest) = needs_script(content) else {
            return Ok(FileChanges::none());
        };

        let scripts = manifest
            .entry("scripts")
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(scripts) = scripts else {
            return Err(MigrationError::Malformed {
                path: PACKAGE_JSON.into(),
                message: "`scripts` is not an object".to_string(),
            });
        };
        scripts.insert(
            SCRIPT_NAME.to_string(),
            Value::String(SCRIPT_COMMAND.to_string()),
        );

        let mut changes = FileChanges::none();
        changes.insert(
            PACKAGE_JSON,
            render_json_like(Path::new(PACKAGE_JSON), manifest, content)?,
        );
        Ok(changes)
    }
}
