//! Line- and JSON-level helpers shared by the shipped migrations.

use std::path::Path;

use atelier_core::MigrationError;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

/// A file split into lines, remembering its newline style and whether it
/// ended with a newline so [`Lines::render`] reproduces untouched content.
#[derive(Debug, Clone)]
pub(crate) struct Lines {
    pub lines: Vec<String>,
    newline: &'static str,
    trailing: bool,
}

impl Lines {
    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.lines().map(str::to_string).collect(),
            newline: if content.contains("\r\n") { "\r\n" } else { "\n" },
            trailing: content.ends_with('\n'),
        }
    }

    pub fn render(&self) -> String {
        let mut out = self.lines.join(self.newline);
        if self.trailing {
            out.push_str(self.newline);
        }
        out
    }

    /// Index of the first line outside fenced code whose trimmed text
    /// equals `needle`.
    pub fn position_trimmed(&self, needle: &str) -> Option<usize> {
        let fenced = self.fenced();
        self.lines
            .iter()
            .enumerate()
            .position(|(i, l)| !fenced[i] && l.trim() == needle)
    }

    /// Per line: is it part of a Markdown fenced code block (delimiters
    /// included)? A fence opened with ``` only closes on ```, same for ~~~.
    /// An unclosed fence runs to the end of the file.
    pub fn fenced(&self) -> Vec<bool> {
        let mut open: Option<&'static str> = None;
        self.lines
            .iter()
            .map(|line| {
                let marker = ["```", "~~~"]
                    .into_iter()
                    .find(|m| line.trim_start().starts_with(m));
                match (open, marker) {
                    (None, Some(m)) => {
                        open = Some(m);
                        true
                    }
                    (Some(o), Some(m)) if o == m => {
                        open = None;
                        true
                    }
                    (Some(_), _) => true,
                    (None, None) => false,
                }
            })
            .collect()
    }

    /// Force a trailing newline on render.
    pub fn ensure_trailing_newline(&mut self) {
        self.trailing = true;
    }
}

/// Leading whitespace of `line`.
pub(crate) fn indent_of(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Parse `content` as a JSON object. `None` for anything else, including
/// syntax errors: callers fail closed on unparsable documents.
pub(crate) fn parse_json_object(path: &Path, content: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            tracing::debug!("skipping {}: top level is not an object", path.display());
            None
        }
        Err(e) => {
            tracing::debug!("skipping unparsable {}: {e}", path.display());
            None
        }
    }
}

/// Serialize `map` pretty-printed with the indentation `original` uses, and
/// keep its trailing newline. Key order is preserved, so a document that was
/// already in this shape only differs by the keys the caller added.
pub(crate) fn render_json_like(
    path: &Path,
    map: Map<String, Value>,
    original: &str,
) -> Result<String, MigrationError> {
    use serde::Serialize;

    let indent = detect_indent(original);
    let mut buf = Vec::with_capacity(original.len() + 64);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    Value::Object(map)
        .serialize(&mut ser)
        .map_err(|e| MigrationError::Serialize {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut out = String::from_utf8(buf).map_err(|e| MigrationError::Serialize {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if original.ends_with("\r\n") {
        out = out.replace('\n', "\r\n");
        out.push_str("\r\n");
    } else if original.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

fn detect_indent(content: &str) -> &str {
    content
        .lines()
        .map(indent_of)
        .find(|indent| !indent.is_empty())
        .unwrap_or("  ")
}
