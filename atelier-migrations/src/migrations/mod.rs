//! Every migration atelier has shipped, one module per release.
//!
//! | Version | Module                     | Touches                          |
//! |---------|----------------------------|----------------------------------|
//! | 0.1.0   | [`annotation_provider`]    | `src/main.tsx`                   |
//! | 0.2.0   | [`design_script`]          | `package.json`                   |
//! | 0.3.0   | [`annotation_docs`]        | `CLAUDE.md`                      |
//! | 0.4.0   | [`annotation_config`]      | `atelier.config.yaml`            |
//! | 0.5.0   | [`iteration_manifest`]     | `projects/*/project.json`        |
//! | 0.9.0   | [`dedupe_provider_import`] | `src/main.tsx`                   |
//! | 0.10.0  | [`stable_tokens_import`]   | `projects/*/v*/tokens.tsx`       |

pub mod annotation_config;
pub mod annotation_docs;
pub mod annotation_provider;
pub mod dedupe_provider_import;
pub mod design_script;
pub mod iteration_manifest;
pub mod stable_tokens_import;

pub use annotation_config::AnnotationConfig;
pub use annotation_docs::AnnotationDocs;
pub use annotation_provider::WrapAnnotationProvider;
pub use dedupe_provider_import::DedupeProviderImport;
pub use design_script::DesignScript;
pub use iteration_manifest::IterationManifest;
pub use stable_tokens_import::StableTokensImport;

/// App entry file scaffolded by `atelier init`.
pub const APP_ENTRY: &str = "src/main.tsx";

/// Import line added by 0.1.0 and policed by 0.9.0.
pub const PROVIDER_IMPORT: &str = r#"import { AnnotationProvider } from "@atelier/annotations";"#;

/// Whether `line` imports `AnnotationProvider` from the annotations package,
/// regardless of quote style or surrounding whitespace.
pub(crate) fn is_provider_import(line: &str) -> bool {
    let line = line.trim();
    line.starts_with("import ")
        && line.contains("AnnotationProvider")
        && (line.contains("\"@atelier/annotations\"") || line.contains("'@atelier/annotations'"))
}
