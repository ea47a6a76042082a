//! Well-known locations inside a consumer project.
//!
//! ```text
//! <root>/
//!   .atelier/version.json          version marker
//!   projects/
//!     <project>/
//!       project.json               per-project manifest
//!       v<N>/                      design iteration (N = 1, 2, …)
//!         docs.tsx
//!         tokens.tsx
//! ```

use std::path::{Component, Path, PathBuf};

pub const MARKER_DIR: &str = ".atelier";
pub const MARKER_FILE: &str = "version.json";

pub const PROJECTS_DIR: &str = "projects";
pub const PROJECT_MANIFEST: &str = "project.json";

/// Iteration directories are `v` followed by a decimal number.
pub const ITERATION_PREFIX: &str = "v";
pub const DOCS_PAGE: &str = "docs.tsx";
pub const TOKENS_PAGE: &str = "tokens.tsx";
pub const ITERATION_PAGES: &[&str] = &[DOCS_PAGE, TOKENS_PAGE];

/// Suffix for staged writes; never left behind after a successful write.
pub const TMP_SUFFIX: &str = ".atelier.tmp";

pub fn marker_path(root: &Path) -> PathBuf {
    root.join(MARKER_DIR).join(MARKER_FILE)
}

pub fn projects_root(root: &Path) -> PathBuf {
    root.join(PROJECTS_DIR)
}

/// `v12` → `Some(12)`. Rejects `v`, `v1a`, `V1`, `draft`.
pub fn parse_iteration_dir(name: &str) -> Option<u32> {
    let digits = name.strip_prefix(ITERATION_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// What a relative path means in the consumer layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutEntry<'a> {
    ProjectManifest {
        project: &'a str,
    },
    IterationPage {
        project: &'a str,
        iteration: u32,
        page: &'a str,
    },
}

impl LayoutEntry<'_> {
    pub fn project(&self) -> &str {
        match self {
            LayoutEntry::ProjectManifest { project } => project,
            LayoutEntry::IterationPage { project, .. } => project,
        }
    }
}

/// Classify a root-relative path against the project layout.
pub fn classify(path: &Path) -> Option<LayoutEntry<'_>> {
    let mut parts = Vec::with_capacity(4);
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => return None,
        }
    }

    match parts.as_slice() {
        [PROJECTS_DIR, project, PROJECT_MANIFEST] => {
            Some(LayoutEntry::ProjectManifest { project: *project })
        }
        [PROJECTS_DIR, project, dir, page] if ITERATION_PAGES.contains(page) => {
            Some(LayoutEntry::IterationPage {
                project: *project,
                iteration: parse_iteration_dir(dir)?,
                page: *page,
            })
        }
        _ => None,
    }
}

/// Root-relative path of a project's manifest.
pub fn project_manifest_path(project: &str) -> PathBuf {
    Path::new(PROJECTS_DIR).join(project).join(PROJECT_MANIFEST)
}

/// Root-relative path of an iteration page.
pub fn iteration_page_path(project: &str, iteration: u32, page: &str) -> PathBuf {
    Path::new(PROJECTS_DIR)
        .join(project)
        .join(format!("{ITERATION_PREFIX}{iteration}"))
        .join(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_dir_names() {
        assert_eq!(parse_iteration_dir("v1"), Some(1));
        assert_eq!(parse_iteration_dir("v012"), Some(12));
        assert_eq!(parse_iteration_dir("v"), None);
        assert_eq!(parse_iteration_dir("v1a"), None);
        assert_eq!(parse_iteration_dir("V1"), None);
        assert_eq!(parse_iteration_dir("draft"), None);
        assert_eq!(parse_iteration_dir("v+1"), None);
    }

    #[test]
    fn classify_manifest_and_pages() {
        assert_eq!(
            classify(Path::new("projects/onboarding/project.json")),
            Some(LayoutEntry::ProjectManifest {
                project: "onboarding"
            })
        );
        assert_eq!(
            classify(Path::new("projects/onboarding/v3/tokens.tsx")),
            Some(LayoutEntry::IterationPage {
                project: "onboarding",
                iteration: 3,
                page: TOKENS_PAGE,
            })
        );
    }

    #[test]
    fn classify_rejects_everything_else() {
        for p in [
            "src/main.tsx",
            "projects/project.json",
            "projects/a/v1/other.tsx",
            "projects/a/draft/docs.tsx",
            "projects/a/v1/nested/docs.tsx",
            "../projects/a/project.json",
            "/projects/a/project.json",
        ] {
            assert_eq!(classify(Path::new(p)), None, "{p}");
        }
    }

    #[test]
    fn builders_match_classify() {
        let manifest = project_manifest_path("p");
        assert!(matches!(
            classify(&manifest),
            Some(LayoutEntry::ProjectManifest { project: "p" })
        ));
        let page = iteration_page_path("p", 7, DOCS_PAGE);
        assert_eq!(page, PathBuf::from("projects/p/v7/docs.tsx"));
        assert_eq!(classify(&page).map(|e| e.project().to_string()), Some("p".into()));
    }

    #[test]
    fn marker_lives_under_dot_atelier() {
        let root = Path::new("/work/app");
        assert_eq!(
            marker_path(root),
            PathBuf::from("/work/app/.atelier/version.json")
        );
        assert_eq!(projects_root(root), PathBuf::from("/work/app/projects"));
    }
}
