//! 0.1.0 — wrap the app entry in `<AnnotationProvider>`.
//!
//! The annotation layer reads its state from a React context, so the
//! scaffolded `<App />` has to sit inside the provider. Two independent
//! edits: the import (after the last existing import) and the wrapper
//! (around the first `<App />`). Either may already be present on a
//! hand-edited entry; only the missing one is added.
//!
//! An `<App />` alone on its line gets the provider on the lines around it.
//! One sharing its line with code, as in `root.render(<App />);`, is wrapped
//! inline.

use atelier_core::{FileChanges, FileSnapshot, Migration, MigrationError, Version};

use super::{is_provider_import, APP_ENTRY, PROVIDER_IMPORT};
use crate::text::{indent_of, Lines};

const APP_ELEMENT: &str = "<App />";
const PROVIDER_OPEN: &str = "<AnnotationProvider>";
const PROVIDER_CLOSE: &str = "</AnnotationProvider>";

pub struct WrapAnnotationProvider;

struct EntryState {
    imported: bool,
    wrapped: bool,
}

fn inspect(content: &str) -> Option<EntryState> {
    if !content.contains(APP_ELEMENT) {
        return None;
    }
    Some(EntryState {
        imported: content.lines().any(is_provider_import),
        wrapped: content.contains(PROVIDER_OPEN),
    })
}

impl Migration for WrapAnnotationProvider {
    fn version(&self) -> Version {
        Version::new(0, 1, 0)
    }

    fn description(&self) -> &'static str {
        "Wrap the app entry in AnnotationProvider"
    }

    fn declared_files(&self) -> &'static [&'static str] {
        &[APP_ENTRY]
    }

    fn applies(&self, snapshot: &FileSnapshot) -> Result<bool, MigrationError> {
        let Some(content) = snapshot.get(APP_ENTRY) else {
            return Ok(false);
        };
        Ok(inspect(content).is_some_and(|s| !s.imported || !s.wrapped))
    }

    fn migrate(&self, snapshot: &FileSnapshot) -> Result<FileChanges, MigrationError> {
        let Some(content) = snapshot.get(APP_ENTRY) else {
            return Ok(FileChanges::none());
        };
        let Some(state) = inspect(content) else {
            return Ok(FileChanges::none());
        };

        let mut doc = Lines::parse(content);

        if !state.wrapped {
            if let Some(idx) = doc.lines.iter().position(|l| l.contains(APP_ELEMENT)) {
                let line = doc.lines[idx].clone();
                if line.trim() == APP_ELEMENT {
                    let indent = indent_of(&line).to_string();
                    let wrapped = [
                        format!("{indent}{PROVIDER_OPEN}"),
                        format!("  {line}"),
                        format!("{indent}{PROVIDER_CLOSE}"),
                    ];
                    doc.lines.splice(idx..=idx, wrapped);
                } else {
                    // `render(<App />);` and friends: wrap the element in place.
                    doc.lines[idx] = line.replacen(
                        APP_ELEMENT,
                        &format!("{PROVIDER_OPEN}{APP_ELEMENT}{PROVIDER_CLOSE}"),
                        1,
                    );
                }
            }
        }

        if !state.imported {
            let at = doc
                .lines
                .iter()
                .rposition(|l| l.trim_start().starts_with("import "))
                .map_or(0, |last| last + 1);
            doc.lines.insert(at, PROVIDER_IMPORT.to_string());
        }

        let updated = doc.render();
        let mut changes = FileChanges::none();
        if updated != content {
            changes.insert(APP_ENTRY, updated);
        }
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCAFFOLD: &str = r#"import React from "react";
import ReactDOM from "react-dom/client";
import App from "./App";
import "./index.css";

ReactDOM.createRoot(document.getElementById("root")!).render(
  <React.StrictMode>
    <App />
  </React.StrictMode>
);
"#;

    const EXPECTED: &str = r#"import React from "react";
import ReactDOM from "react-dom/client";
import App from "./App";
import "./index.css";
import { AnnotationProvider } from "@atelier/annotations";

ReactDOM.createRoot(document.getElementById("root")!).render(
  <React.StrictMode>
    <AnnotationProvider>
      <App />
    </AnnotationProvider>
  </React.StrictMode>
);
"#;

    fn entry(content: &str) -> FileSnapshot {
        FileSnapshot::from_iter([(APP_ENTRY, content)])
    }

    #[test]
    fn wraps_and_imports_the_scaffold() {
        let m = WrapAnnotationProvider;
        let snap = entry(SCAFFOLD);
        assert!(m.applies(&snap).unwrap());

        let changes = m.migrate(&snap).unwrap();
        assert_eq!(changes.get(APP_ENTRY), Some(EXPECTED));

        let post = changes.apply_to(&snap);
        assert!(!m.applies(&post).unwrap());
        assert!(m.migrate(&post).unwrap().is_empty());
    }

    #[test]
    fn only_adds_the_missing_import_when_already_wrapped() {
        let half = EXPECTED.replace(&format!("{PROVIDER_IMPORT}\n"), "");
        let m = WrapAnnotationProvider;
        let snap = entry(&half);
        assert!(m.applies(&snap).unwrap());
        assert_eq!(m.migrate(&snap).unwrap().get(APP_ENTRY), Some(EXPECTED));
    }

    #[test]
    fn only_wraps_when_import_already_present() {
        let half = SCAFFOLD.replace(
            "import \"./index.css\";\n",
            &format!("import \"./index.css\";\n{PROVIDER_IMPORT}\n"),
        );
        let m = WrapAnnotationProvider;
        let changes = m.migrate(&entry(&half)).unwrap();
        assert_eq!(changes.get(APP_ENTRY), Some(EXPECTED));
    }

    #[test]
    fn single_quoted_import_counts_as_imported() {
        let single = EXPECTED.replace(PROVIDER_IMPORT, "import { AnnotationProvider } from '@atelier/annotations';");
        assert!(!WrapAnnotationProvider.applies(&entry(&single)).unwrap());
    }

    #[test]
    fn entry_without_app_element_is_left_alone() {
        let custom = "import { Shell } from \"./Shell\";\nrender(<Shell />);\n";
        let m = WrapAnnotationProvider;
        assert!(!m.applies(&entry(custom)).unwrap());
        assert!(m.migrate(&entry(custom)).unwrap().is_empty());
    }

    #[test]
    fn one_line_render_is_wrapped_inline() {
        let before = "import App from \"./App\";\nReactDOM.createRoot(el).render(<App />);\n";
        let m = WrapAnnotationProvider;
        let snap = entry(before);
        assert!(m.applies(&snap).unwrap());

        let changes = m.migrate(&snap).unwrap();
        assert_eq!(
            changes.get(APP_ENTRY),
            Some(
                "import App from \"./App\";\nimport { AnnotationProvider } from \"@atelier/annotations\";\nReactDOM.createRoot(el).render(<AnnotationProvider><App /></AnnotationProvider>);\n"
            )
        );

        let post = changes.apply_to(&snap);
        assert!(!m.applies(&post).unwrap());
        assert!(m.migrate(&post).unwrap().is_empty());
    }

    #[test]
    fn absent_entry_does_not_apply() {
        assert!(!WrapAnnotationProvider.applies(&FileSnapshot::empty()).unwrap());
    }

    #[test]
    fn crlf_entries_keep_crlf() {
        let crlf = SCAFFOLD.replace('\n', "\r\n");
        let changes = WrapAnnotationProvider.migrate(&entry(&crlf)).unwrap();
        assert_eq!(
            changes.get(APP_ENTRY),
            Some(EXPECTED.replace('\n', "\r\n").as_str())
        );
    }
}
