//! 0.4.0 — enable the canvas annotation layer in atelier.config.yaml.
//!
//! The config is parsed only to decide; the edit itself appends a top-level
//! `annotations:` block to the text so comments, key order and quoting of
//! every existing entry survive byte-for-byte. A flow-style config
//! (`{theme: dusk}`) gets the key as a flow entry before its closing brace
//! instead. An unparsable config, or one whose top level is not a mapping,
//! is left alone.

use atelier_core::{FileChanges, FileSnapshot, Migration, MigrationError, Version};
use serde_yaml::Value;

const CONFIG: &str = "atelier.config.yaml";
const KEY: &str = "annotations";
const BLOCK: &str = "annotations:\n  enabled: true\n  layer: canvas\n";
const FLOW_ENTRY: &str = "annotations: {enabled: true, layer: canvas}";

pub struct AnnotationConfig;

enum ConfigState {
    Missing,
    Present,
    Unusable,
}

fn inspect(content: &str) -> ConfigState {
    if content.trim().is_empty() {
        return ConfigState::Missing;
    }
    match serde_yaml::from_str::<Value>(content) {
        Ok(Value::Null) => ConfigState::Missing,
        Ok(Value::Mapping(map)) if map.contains_key(KEY) => ConfigState::Present,
        Ok(Value::Mapping(_)) => ConfigState::Missing,
        Ok(_) => {
            tracing::debug!("skipping {CONFIG}: top level is not a mapping");
            ConfigState::Unusable
        }
        Err(e) => {
            tracing::debug!("skipping unparsable {CONFIG}: {e}");
            ConfigState::Unusable
        }
    }
}

impl Migration for AnnotationConfig {
    fn version(&self) -> Version {
        Version::new(0, 4, 0)
    }

    fn description(&self) -> &'static str {
        "Enable the canvas annotation layer in atelier.config.yaml"
    }

    fn declared_files(&self) -> &'static [&'static str] {
        &[CONFIG]
    }

    fn applies(&self, snapshot: &FileSnapshot) -> Result<bool, MigrationError> {
        Ok(snapshot
            .get(CONFIG)
            .is_some_and(|content| matches!(inspect(content), ConfigState::Missing)))
    }

    fn migrate(&self, snapshot: &FileSnapshot) -> Result<FileChanges, MigrationError> {
        let Some(content) = snapshot.get(CONFIG) else {
            return Ok(FileChanges::none());
        };
        if !matches!(inspect(content), ConfigState::Missing) {
            return Ok(FileChanges::none());
        }

        let updated = std::iter::once(append_block(content))
            .chain(insert_flow_entry(content))
            .find(|candidate| matches!(inspect(candidate), ConfigState::Present))
            .ok_or_else(|| MigrationError::Malformed {
                path: CONFIG.into(),
                message: "cannot add a top-level key to this document".to_string(),
            })?;

        let mut changes = FileChanges::none();
        changes.insert(CONFIG, updated);
        Ok(changes)
    }
}

fn append_block(content: &str) -> String {
    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let mut updated = content.to_string();
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push_str(newline);
    }
    updated.push_str(&BLOCK.replace('\n', newline));
    updated
}

/// `{a: 1}` becomes `{a: 1, annotations: {...}}`. `None` unless the
/// document ends with the closing brace of a flow mapping.
fn insert_flow_entry(content: &str) -> Option<String> {
    if !content.trim_end().ends_with('}') {
        return None;
    }
    let close = content.rfind('}')?;
    let head = content[..close].trim_end();
    let sep = if head.ends_with('{') {
        ""
    } else if head.ends_with(',') {
        " "
    } else {
        ", "
    };
    Some(format!(
        "{head}{sep}{FLOW_ENTRY}{}{}",
        &content[head.len()..close],
        &content[close..]
    ))
}
