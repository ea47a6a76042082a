//! 0.9.0 — remove duplicate `AnnotationProvider` imports from the app entry.
//!
//! Entries that were hand-merged from a newer scaffold after 0.1.0 had
//! already run ended up importing the provider twice, which the bundler
//! rejects. Keeps the first import and drops the others.

use atelier_core::{FileChanges, FileSnapshot, Migration, MigrationError, Version};

use super::{is_provider_import, APP_ENTRY};
use crate::text::Lines;

pub struct DedupeProviderImport;

fn import_count(content: &str) -> usize {
    content.lines().filter(|l| is_provider_import(l)).count()
}

impl Migration for DedupeProviderImport {
    fn version(&self) -> Version {
        Version::new(0, 9, 0)
    }

    fn description(&self) -> &'static str {
        "Remove duplicate AnnotationProvider imports"
    }

    fn declared_files(&self) -> &'static [&'static str] {
        &[APP_ENTRY]
    }

    fn applies(&self, snapshot: &FileSnapshot) -> Result<bool, MigrationError> {
        Ok(snapshot
            .get(APP_ENTRY)
            .is_some_and(|content| import_count(content) > 1))
    }

    fn migrate(&self, snapshot: &FileSnapshot) -> Result<FileChanges, MigrationError> {
        let Some(content) = snapshot.get(APP_ENTRY) else {
            return Ok(FileChanges::none());
        };
        if import_count(content) < 2 {
            return Ok(FileChanges::none());
        }

        let mut doc = Lines::parse(content);
        let mut seen = false;
        doc.lines.retain(|line| {
            if !is_provider_import(line) {
                return true;
            }
            !std::mem::replace(&mut seen, true)
        });

        let mut changes = FileChanges::none();
        changes.insert(APP_ENTRY, doc.render());
        Ok(changes)
    }
}
