//! Template payloads — the serializable values each embedded template sees.

use serde::Serialize;

use crate::error::RenderError;

/// Input to `front_matter/rule.tera`.
#[derive(Debug, Clone, Serialize)]
pub struct RuleFrontMatterCtx<'a> {
    pub trigger: &'a str,
    pub description: Option<&'a str>,
    pub globs: Option<&'a str>,
}

/// Input to `front_matter/workflow.tera`.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowFrontMatterCtx<'a> {
    pub description: &'a str,
}

/// Input to `document.md.tera`: optional front-matter, stamp, then body.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentCtx<'a> {
    pub front_matter: Option<&'a str>,
    pub stamp: &'a str,
    pub body: &'a str,
}

/// One source file folded into the global context document.
///
/// Parts with a `language` are wrapped in a fenced block under a heading
/// named after the file; markdown parts are inlined as they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextPart {
    pub file_name: String,
    pub language: Option<String>,
    pub content: String,
}

impl ContextPart {
    pub fn markdown(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            language: None,
            content: content.into(),
        }
    }

    pub fn fenced(
        file_name: impl Into<String>,
        language: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            language: Some(language.into()),
            content: content.into(),
        }
    }
}

/// Input to `global_context.md.tera`.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalContextCtx<'a> {
    pub parts: &'a [ContextPart],
}

/// Convert any payload to a [`tera::Context`].
pub fn to_tera_context<T: Serialize>(payload: &T) -> Result<tera::Context, RenderError> {
    tera::Context::from_serialize(payload).map_err(RenderError::from)
}
