//! 0.3.0 — document the annotation workflow in CLAUDE.md.
//!
//! The new section goes at the end of the `## Workflow` section, i.e. right
//! before the next heading of the same or higher level. Anchoring on the
//! heading keeps the insert correct however much earlier edits moved lines
//! around. Without the anchor the section is appended. Lines inside fenced
//! code blocks are never taken for headings.

use atelier_core::{FileChanges, FileSnapshot, Migration, MigrationError, Version};

use crate::text::Lines;

const AGENT_DOCS: &str = "CLAUDE.md";
const ANCHOR_HEADING: &str = "## Workflow";
const SECTION_HEADING: &str = "## Annotations";
const SECTION_BODY: &[&str] = &[
    "",
    "Designers leave annotations directly on the canvas. Before starting a new",
    "iteration, run `npm run design`, open the annotation panel and resolve",
    "every open note. Resolved notes are kept in the iteration's `docs.tsx`.",
];

pub struct AnnotationDocs;

fn is_section_break(line: &str) -> bool {
    line.starts_with("# ") || line.starts_with("## ")
}

fn has_section(doc: &Lines) -> bool {
    doc.position_trimmed(SECTION_HEADING).is_some()
}

impl Migration for AnnotationDocs {
    fn version(&self) -> Version {
        Version::new(0, 3, 0)
    }

    fn description(&self) -> &'static str {
        "Document the annotation workflow in CLAUDE.md"
    }

    fn declared_files(&self) -> &'static [&'static str] {
        &[AGENT_DOCS]
    }

    fn applies(&self, snapshot: &FileSnapshot) -> Result<bool, MigrationError> {
        Ok(snapshot
            .get(AGENT_DOCS)
            .is_some_and(|content| !has_section(&Lines::parse(content))))
    }

    fn migrate(&self, snapshot: &FileSnapshot) -> Result<FileChanges, MigrationError> {
        let Some(content) = snapshot.get(AGENT_DOCS) else {
            return Ok(FileChanges::none());
        };
        let mut doc = Lines::parse(content);
        if has_section(&doc) {
            return Ok(FileChanges::none());
        }

        let fenced = doc.fenced();
        let insert_at = match doc.position_trimmed(ANCHOR_HEADING) {
            Some(anchor) => (anchor + 1..doc.lines.len())
                .find(|&i| !fenced[i] && is_section_break(&doc.lines[i]))
                .unwrap_or(doc.lines.len()),
            None => doc.lines.len(),
        };

        // Step back over blank lines so spacing is normalised around the block.
        let mut at = insert_at;
        while at > 0 && doc.lines[at - 1].trim().is_empty() {
            at -= 1;
        }

        let mut block = Vec::with_capacity(SECTION_BODY.len() + 3);
        if at > 0 {
            block.push(String::new());
        }
        block.push(SECTION_HEADING.to_string());
        block.extend(SECTION_BODY.iter().map(|l| l.to_string()));
        if insert_at < doc.lines.len() {
            block.push(String::new());
        }

        doc.lines.splice(at..insert_at, block);
        doc.ensure_trailing_newline();

        let mut changes = FileChanges::none();
        changes.insert(AGENT_DOCS, doc.render());
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(content: &str) -> FileSnapshot {
        FileSnapshot::from_iter([(AGENT_DOCS, content)])
    }

    fn section() -> String {
        let mut s = format!("{SECTION_HEADING}\n");
        for line in SECTION_BODY {
            s.push_str(line);
            s.push('\n');
        }
        s
    }

    #[test]
    fn inserts_after_the_workflow_section() {
        let before = "# Moodboard\n\n## Workflow\n\nIterate in projects/.\n\n## Tokens\n\nUse tokens.tsx.\n";
        let expected = format!(
            "# Moodboard\n\n## Workflow\n\nIterate in projects/.\n\n{}\n## Tokens\n\nUse tokens.tsx.\n",
            section()
        );
        let changes = AnnotationDocs.migrate(&docs(before)).unwrap();
        assert_eq!(changes.get(AGENT_DOCS), Some(expected.as_str()));
    }

    #[test]
    fn workflow_as_last_section_appends_at_end() {
        let before = "# App\n\n## Workflow\n\nShip it.\n";
        let expected = format!("# App\n\n## Workflow\n\nShip it.\n\n{}", section());
        let changes = AnnotationDocs.migrate(&docs(before)).unwrap();
        assert_eq!(changes.get(AGENT_DOCS), Some(expected.as_str()));
    }

    #[test]
    fn subsections_stay_inside_workflow() {
        let before = "## Workflow\n\n### Daily\n\nSync.\n## Other\n";
        let out = AnnotationDocs.migrate(&docs(before)).unwrap();
        let text = out.get(AGENT_DOCS).unwrap();
        let daily = text.find("### Daily").unwrap();
        let ann = text.find(SECTION_HEADING).unwrap();
        let other = text.find("## Other").unwrap();
        assert!(daily < ann && ann < other, "{text}");
    }

    #[test]
    fn missing_anchor_appends_with_trailing_newline() {
        let before = "# Notes without a workflow heading";
        let expected = format!("# Notes without a workflow heading\n\n{}", section());
        let changes = AnnotationDocs.migrate(&docs(before)).unwrap();
        assert_eq!(changes.get(AGENT_DOCS), Some(expected.as_str()));
    }

    #[test]
    fn shell_comments_in_code_fences_are_not_headings() {
        let before = "## Workflow\n\n```sh\n# install deps\nnpm i\n```\n\n## Tokens\n";
        let expected = format!(
            "## Workflow\n\n```sh\n# install deps\nnpm i\n```\n\n{}\n## Tokens\n",
            section()
        );
        let changes = AnnotationDocs.migrate(&docs(before)).unwrap();
        assert_eq!(changes.get(AGENT_DOCS), Some(expected.as_str()));
    }

    #[test]
    fn example_heading_inside_a_fence_does_not_count_as_present() {
        let before = "## Workflow\n\n~~~md\n## Annotations\n~~~\n";
        let m = AnnotationDocs;
        assert!(m.applies(&docs(before)).unwrap());
        let once = m.migrate(&docs(before)).unwrap().apply_to(&docs(before));
        assert!(!m.applies(&once).unwrap());
        assert!(once.get(AGENT_DOCS).unwrap().ends_with(&section()));
    }

    #[test]
    fn migrate_is_idempotent() {
        let before = "# App\n\n## Workflow\n\nShip it.\n\n## Tokens\n";
        let once = AnnotationDocs.migrate(&docs(before)).unwrap().apply_to(&docs(before));
        assert!(!AnnotationDocs.applies(&once).unwrap());
        assert!(AnnotationDocs.migrate(&once).unwrap().is_empty());
    }

    #[test]
    fn absent_docs_do_not_apply() {
        assert!(!AnnotationDocs.applies(&FileSnapshot::empty()).unwrap());
    }
}
