//! Dialect conversions — one per supported ordered pair of document kinds.
//!
//! Project conversions (context ↔ rule, command ↔ workflow) go through
//! sections and adapt headings and markup. Global command conversions keep
//! the body verbatim and only swap front-matter and stamp.

use std::borrow::Cow;
use std::path::Path;

use tandem_core::stamp::{format_stamp, strip_stamp_lines};
use tandem_core::{Dialect, DocumentKind, SyncStamp};

use crate::context::{ContextPart, DocumentCtx, RuleFrontMatterCtx, WorkflowFrontMatterCtx};
use crate::engine::TemplateEngine;
use crate::error::RenderError;
use crate::front_matter::{
    parse_front_matter, quote_scalar, strip_front_matter, FrontMatter, Trigger, RULE_DESCRIPTION_PLACEHOLDER,
    WORKFLOW_DESCRIPTION_PLACEHOLDER,
};
use crate::markup::{adapt_body_markup, adapt_heading, Direction};
use crate::sections::{decompose, recompose, Section};

/// Converted content, or `success: false` with empty content.
///
/// A failed merge means "skip this file": callers must not write it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub content: String,
    pub success: bool,
}

impl MergeResult {
    pub fn ok(content: String) -> Self {
        Self { content, success: true }
    }

    pub fn failed() -> Self {
        Self {
            content: String::new(),
            success: false,
        }
    }
}

/// Every conversion the transformer knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    ContextToRule,
    RuleToContext,
    CommandToWorkflow,
    WorkflowToCommand,
    SourceToCommandMirror,
    SourceToWorkflowMirror,
    CommandMirrorToSource,
    WorkflowMirrorToSource,
    CommandMirrorToWorkflowMirror,
    WorkflowMirrorToCommandMirror,
}

impl Conversion {
    /// The conversion that turns a `from` document into a `to` document.
    pub fn between(from: DocumentKind, to: DocumentKind) -> Option<Conversion> {
        use DocumentKind as K;
        match (from, to) {
            (K::Context, K::Rule) => Some(Conversion::ContextToRule),
            (K::Rule, K::Context) => Some(Conversion::RuleToContext),
            (K::Command, K::Workflow) => Some(Conversion::CommandToWorkflow),
            (K::Workflow, K::Command) => Some(Conversion::WorkflowToCommand),
            (K::GlobalSource, K::GlobalCommand) => Some(Conversion::SourceToCommandMirror),
            (K::GlobalSource, K::GlobalWorkflow) => Some(Conversion::SourceToWorkflowMirror),
            (K::GlobalCommand, K::GlobalSource) => Some(Conversion::CommandMirrorToSource),
            (K::GlobalWorkflow, K::GlobalSource) => Some(Conversion::WorkflowMirrorToSource),
            (K::GlobalCommand, K::GlobalWorkflow) => Some(Conversion::CommandMirrorToWorkflowMirror),
            (K::GlobalWorkflow, K::GlobalCommand) => Some(Conversion::WorkflowMirrorToCommandMirror),
            (
                K::Context
                | K::Rule
                | K::Command
                | K::Workflow
                | K::GlobalSource
                | K::GlobalCommand
                | K::GlobalWorkflow
                | K::Excluded
                | K::Other,
                _,
            ) => None,
        }
    }

    /// Dialect of the produced document.
    pub fn target_dialect(self) -> Dialect {
        match self {
            Conversion::ContextToRule => Dialect::Rule,
            Conversion::CommandToWorkflow
            | Conversion::SourceToWorkflowMirror
            | Conversion::CommandMirrorToWorkflowMirror => Dialect::Workflow,
            Conversion::RuleToContext
            | Conversion::WorkflowToCommand
            | Conversion::SourceToCommandMirror
            | Conversion::CommandMirrorToSource
            | Conversion::WorkflowMirrorToSource
            | Conversion::WorkflowMirrorToCommandMirror => Dialect::Context,
        }
    }
}

// ---------------------------------------------------------------------------
// Transformer
// ---------------------------------------------------------------------------

/// Pure content conversions between dialects. Create once and reuse.
pub struct Transformer {
    engine: TemplateEngine,
}

impl Transformer {
    /// Transformer with embedded templates only.
    pub fn new() -> Result<Self, RenderError> {
        Ok(Transformer {
            engine: TemplateEngine::new(None)?,
        })
    }

    /// Transformer honouring `.tera` overrides in `dir`.
    pub fn with_templates(dir: &Path) -> Result<Self, RenderError> {
        Ok(Transformer {
            engine: TemplateEngine::new(Some(dir))?,
        })
    }

    /// Convert `source` from kind `from` to kind `to`.
    ///
    /// `existing_target` is the current content of the target, whose
    /// front-matter values are carried over.
    pub fn convert(
        &self,
        from: DocumentKind,
        to: DocumentKind,
        source: &str,
        stamp: &SyncStamp,
        existing_target: Option<&str>,
    ) -> MergeResult {
        match Conversion::between(from, to) {
            Some(conversion) => self.apply(conversion, source, stamp, existing_target),
            None => merged(Err(RenderError::Unsupported { from, to })),
        }
    }

    pub fn apply(
        &self,
        conversion: Conversion,
        source: &str,
        stamp: &SyncStamp,
        existing_target: Option<&str>,
    ) -> MergeResult {
        let existing = existing_target.and_then(parse_front_matter);
        let existing = existing.as_ref();
        let result = match conversion {
            Conversion::ContextToRule => {
                self.sectioned(Direction::ToRule, Dialect::Rule, source, stamp, existing)
            }
            Conversion::CommandToWorkflow => {
                self.sectioned(Direction::ToRule, Dialect::Workflow, source, stamp, existing)
            }
            Conversion::RuleToContext | Conversion::WorkflowToCommand => {
                self.sectioned(Direction::ToContext, Dialect::Context, source, stamp, None)
            }
            Conversion::SourceToCommandMirror
            | Conversion::CommandMirrorToSource
            | Conversion::WorkflowMirrorToSource
            | Conversion::WorkflowMirrorToCommandMirror => self.verbatim(None, source, stamp),
            Conversion::SourceToWorkflowMirror | Conversion::CommandMirrorToWorkflowMirror => {
                self.verbatim(Some(existing), source, stamp)
            }
        };
        merged(result)
    }

    pub fn context_to_rule(
        &self,
        source: &str,
        stamp: &SyncStamp,
        existing: Option<&str>,
    ) -> MergeResult {
        self.apply(Conversion::ContextToRule, source, stamp, existing)
    }

    pub fn rule_to_context(&self, source: &str, stamp: &SyncStamp) -> MergeResult {
        self.apply(Conversion::RuleToContext, source, stamp, None)
    }

    pub fn command_to_workflow(
        &self,
        source: &str,
        stamp: &SyncStamp,
        existing: Option<&str>,
    ) -> MergeResult {
        self.apply(Conversion::CommandToWorkflow, source, stamp, existing)
    }

    pub fn workflow_to_command(&self, source: &str, stamp: &SyncStamp) -> MergeResult {
        self.apply(Conversion::WorkflowToCommand, source, stamp, None)
    }

    /// Assemble the global context document from its parts.
    pub fn global_context(&self, parts: &[ContextPart], stamp: &SyncStamp) -> MergeResult {
        let parts: Vec<ContextPart> = parts
            .iter()
            .map(|part| ContextPart {
                content: match part.language {
                    Some(_) => part.content.trim().to_string(),
                    None => strip_stamp_lines(&part.content),
                },
                ..part.clone()
            })
            .filter(|part| !part.content.is_empty())
            .collect();
        merged(
            self.engine
                .global_context(&parts)
                .and_then(|body| self.assemble(None, stamp, &body)),
        )
    }

    /// Build the front-matter block for `dialect`, carrying over `existing`.
    ///
    /// Returns `None` for the context dialect, which has no front-matter.
    pub fn build_front_matter(
        &self,
        dialect: Dialect,
        existing: Option<&FrontMatter>,
    ) -> Result<Option<String>, RenderError> {
        match dialect {
            Dialect::Context => Ok(None),
            Dialect::Rule => {
                let (trigger, globs) = match existing {
                    Some(FrontMatter::Rule { trigger, globs, .. }) => (*trigger, globs.as_deref()),
                    Some(FrontMatter::Workflow { .. }) | None => (Trigger::default(), None),
                };
                let carried = carried_description(existing);
                let description = carried
                    .as_deref()
                    .or_else(|| trigger.wants_description().then_some(RULE_DESCRIPTION_PLACEHOLDER));
                self.engine
                    .rule_front_matter(&RuleFrontMatterCtx {
                        trigger: trigger.as_str(),
                        description,
                        globs,
                    })
                    .map(Some)
            }
            Dialect::Workflow => {
                let carried = carried_description(existing);
                let description = carried.as_deref().unwrap_or(WORKFLOW_DESCRIPTION_PLACEHOLDER);
                self.engine
                    .workflow_front_matter(&WorkflowFrontMatterCtx { description })
                    .map(Some)
            }
        }
    }

    /// Front-matter (if any), stamp, then body.
    pub fn assemble(
        &self,
        front_matter: Option<&str>,
        stamp: &SyncStamp,
        body: &str,
    ) -> Result<String, RenderError> {
        let stamp = format_stamp(stamp);
        self.engine.document(&DocumentCtx {
            front_matter,
            stamp: &stamp,
            body: body.trim(),
        })
    }

    fn sectioned(
        &self,
        direction: Direction,
        dialect: Dialect,
        source: &str,
        stamp: &SyncStamp,
        existing: Option<&FrontMatter>,
    ) -> Result<String, RenderError> {
        let sections: Vec<Section> = decompose(strip_front_matter(source))
            .into_iter()
            .map(|section| Section {
                heading: section
                    .heading
                    .as_deref()
                    .map(|h| adapt_heading(direction, h).to_string()),
                body: adapt_body_markup(direction, &section.body),
            })
            .collect();
        let front_matter = self.build_front_matter(dialect, existing)?;
        self.assemble(front_matter.as_deref(), stamp, &recompose(&sections))
    }

    /// `existing` is `Some` when the target takes workflow front-matter.
    fn verbatim(
        &self,
        existing: Option<Option<&FrontMatter>>,
        source: &str,
        stamp: &SyncStamp,
    ) -> Result<String, RenderError> {
        let body = strip_stamp_lines(strip_front_matter(source));
        let front_matter = match existing {
            Some(existing) => self.build_front_matter(Dialect::Workflow, existing)?,
            None => None,
        };
        self.assemble(front_matter.as_deref(), stamp, &body)
    }
}

/// The existing description, quoted again when it would not survive as a
/// plain YAML scalar. A placeholder read back without its quotes comes out in
/// its original quoted form.
fn carried_description(existing: Option<&FrontMatter>) -> Option<Cow<'_, str>> {
    existing.and_then(FrontMatter::description).map(quote_scalar)
}

fn merged(result: Result<String, RenderError>) -> MergeResult {
    match result {
        Ok(content) => MergeResult::ok(content),
        Err(e) => {
            tracing::warn!(error = %e, "conversion failed");
            MergeResult::failed()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
