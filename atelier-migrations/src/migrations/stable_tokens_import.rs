//! 0.10.0 — point iteration token pages at the stable tokens module.
//!
//! `@atelier/tokens/legacy` was removed; its exports now live in
//! `@atelier/tokens`. Only exact module specifiers (quoted) are rewritten, so
//! `@atelier/tokens/legacy-colors` and prose mentions are left alone.

use atelier_core::paths::{classify, LayoutEntry, TOKENS_PAGE};
use atelier_core::{FileChanges, FileSnapshot, Migration, MigrationError, Version};

const LEGACY: [&str; 2] = ["\"@atelier/tokens/legacy\"", "'@atelier/tokens/legacy'"];
const STABLE: [&str; 2] = ["\"@atelier/tokens\"", "'@atelier/tokens'"];

pub struct StableTokensImport;

fn is_tokens_page(path: &std::path::Path) -> bool {
    matches!(
        classify(path),
        Some(LayoutEntry::IterationPage { page, .. }) if page == TOKENS_PAGE
    )
}

fn uses_legacy(content: &str) -> bool {
    LEGACY.iter().any(|spec| content.contains(spec))
}

impl Migration for StableTokensImport {
    fn version(&self) -> Version {
        Version::new(0, 10, 0)
    }

    fn description(&self) -> &'static str {
        "Point iteration token pages at the stable tokens module"
    }

    fn declared_files(&self) -> &'static [&'static str] {
        &[]
    }

    fn applies(&self, snapshot: &FileSnapshot) -> Result<bool, MigrationError> {
        Ok(snapshot
            .matching(is_tokens_page)
            .any(|(_, content)| uses_legacy(content)))
    }

    fn migrate(&self, snapshot: &FileSnapshot) -> Result<FileChanges, MigrationError> {
        let mut changes = FileChanges::none();
        for (path, content) in snapshot.matching(is_tokens_page) {
            if !uses_legacy(content) {
                continue;
            }
            let updated = LEGACY
                .iter()
                .zip(STABLE)
                .fold(content.to_string(), |acc, (from, to)| acc.replace(from, to));
            changes.insert(path, updated);
        }
        Ok(changes)
    }
}
