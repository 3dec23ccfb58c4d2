//! Tera rendering engine for front-matter blocks and document layout.
//!
//! | Template                      | Produces                                   |
//! |-------------------------------|--------------------------------------------|
//! | `front_matter/rule.tera`      | `---` / trigger / description / globs / `---` |
//! | `front_matter/workflow.tera`  | `---` / description / `---`                |
//! | `document.md.tera`            | front-matter, stamp, body — blank-line separated |
//! | `global_context.md.tera`      | body of the assembled global context file  |
//!
//! A user template directory may override any of them by relative name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::Tera;

use crate::context::{
    to_tera_context, ContextPart, DocumentCtx, GlobalContextCtx, RuleFrontMatterCtx,
    WorkflowFrontMatterCtx,
};
use crate::error::RenderError;

pub const RULE_FRONT_MATTER: &str = "front_matter/rule.tera";
pub const WORKFLOW_FRONT_MATTER: &str = "front_matter/workflow.tera";
pub const DOCUMENT: &str = "document.md.tera";
pub const GLOBAL_CONTEXT: &str = "global_context.md.tera";

// ---------------------------------------------------------------------------
// Embedded templates — baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    (RULE_FRONT_MATTER, include_str!("templates/front_matter/rule.tera")),
    (WORKFLOW_FRONT_MATTER, include_str!("templates/front_matter/workflow.tera")),
    (DOCUMENT, include_str!("templates/document.md.tera")),
    (GLOBAL_CONTEXT, include_str!("templates/global_context.md.tera")),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        tracing::debug!(template = %name, "loaded user template override");
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(normalize_template_name(Path::new(name)), (*content).to_string());
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine with optional user overrides.
///
/// Output is LF-only with trailing whitespace removed; callers add the final
/// newline where a whole document is produced.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Embedded templates plus any `.tera` overrides found in `user_template_dir`.
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    fn render<T: Serialize>(&self, name: &str, payload: &T) -> Result<String, RenderError> {
        let ctx = to_tera_context(payload)?;
        let rendered = self.tera.render(name, &ctx)?;
        Ok(rendered.replace("\r\n", "\n").trim_end().to_string())
    }

    pub fn rule_front_matter(&self, ctx: &RuleFrontMatterCtx<'_>) -> Result<String, RenderError> {
        self.render(RULE_FRONT_MATTER, ctx)
    }

    pub fn workflow_front_matter(
        &self,
        ctx: &WorkflowFrontMatterCtx<'_>,
    ) -> Result<String, RenderError> {
        self.render(WORKFLOW_FRONT_MATTER, ctx)
    }

    /// A complete document, ending in exactly one newline.
    pub fn document(&self, ctx: &DocumentCtx<'_>) -> Result<String, RenderError> {
        let mut text = self.render(DOCUMENT, ctx)?;
        text.push('\n');
        Ok(text)
    }

    pub fn global_context(&self, parts: &[ContextPart]) -> Result<String, RenderError> {
        self.render(GLOBAL_CONTEXT, &GlobalContextCtx { parts })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn engine_new_succeeds() {
        TemplateEngine::new(None).expect("embedded templates should parse");
    }

    #[test]
    fn rule_front_matter_omits_absent_keys() {
        let engine = TemplateEngine::new(None).unwrap();
        let text = engine
            .rule_front_matter(&RuleFrontMatterCtx {
                trigger: "manual",
                description: None,
                globs: None,
            })
            .unwrap();
        assert_eq!(text, "---\ntrigger: manual\n---");
    }

    #[test]
    fn rule_front_matter_with_every_key() {
        let engine = TemplateEngine::new(None).unwrap();
        let text = engine
            .rule_front_matter(&RuleFrontMatterCtx {
                trigger: "glob",
                description: Some("Rust sources"),
                globs: Some("**/*.rs"),
            })
            .unwrap();
        assert_eq!(text, "---\ntrigger: glob\ndescription: Rust sources\nglobs: **/*.rs\n---");
    }

    #[test]
    fn document_layout_separates_blocks_with_blank_lines() {
        let engine = TemplateEngine::new(None).unwrap();
        let text = engine
            .document(&DocumentCtx {
                front_matter: Some("---\ndescription: d\n---"),
                stamp: "<!-- stamp -->",
                body: "## A\n\n<b>x</b> & y",
            })
            .unwrap();
        assert_eq!(text, "---\ndescription: d\n---\n\n<!-- stamp -->\n\n## A\n\n<b>x</b> & y\n");
    }

    #[test]
    fn document_without_front_matter_or_body() {
        let engine = TemplateEngine::new(None).unwrap();
        let text = engine
            .document(&DocumentCtx {
                front_matter: None,
                stamp: "<!-- stamp -->",
                body: "",
            })
            .unwrap();
        assert_eq!(text, "<!-- stamp -->\n");
    }

    #[test]
    fn global_context_fences_structured_parts() {
        let engine = TemplateEngine::new(None).unwrap();
        let text = engine
            .global_context(&[
                ContextPart::fenced("tools.json", "json", "{\"a\": 1}"),
                ContextPart::markdown("style.md", "# Style\n\nBe terse."),
            ])
            .unwrap();
        assert_eq!(
            text,
            "## tools.json\n\n```json\n{\"a\": 1}\n```\n\n# Style\n\nBe terse."
        );
    }

    #[test]
    fn user_template_overrides_embedded() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("front_matter")).unwrap();
        std::fs::write(
            dir.path().join("front_matter/workflow.tera"),
            "---\ndescription: {{ description }}\nauto_execution_mode: 1\n---\n",
        )
        .unwrap();

        let engine = TemplateEngine::new(Some(dir.path())).unwrap();
        let text = engine
            .workflow_front_matter(&WorkflowFrontMatterCtx { description: "Ship it" })
            .unwrap();
        assert_eq!(text, "---\ndescription: Ship it\nauto_execution_mode: 1\n---");
    }

    #[test]
    fn missing_user_dir_is_ignored() {
        let dir = TempDir::new().unwrap();
        TemplateEngine::new(Some(&dir.path().join("absent"))).expect("absent dir is fine");
    }
}
