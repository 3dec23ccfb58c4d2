//! Project-level entry points: whole-project sync from the rule dialect back
//! to the context dialect, and forward sync of a single edited file.

use std::path::Path;

use tandem_core::{DocumentKind, SyncResult};
use tandem_renderer::Conversion;

use crate::orchestrator::{resolve, Orchestrator, PairOutcome, SkipReason};

impl Orchestrator {
    /// Sync every rule to its context file and every workflow to its command
    /// under `root`.
    ///
    /// `success` is false only when `root` itself cannot be scanned.
    pub async fn sync_project(&self, root: &Path) -> SyncResult {
        let documents = match self.classifier.enumerate(root).await {
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "project scan failed");
                return SyncResult::failed();
            }
        };

        let mut result = SyncResult::noop();
        for doc in &documents {
            let (target, conversion) = match doc.kind {
                DocumentKind::Rule => (
                    self.classifier.rule_to_context(&doc.path),
                    Conversion::RuleToContext,
                ),
                DocumentKind::Workflow => (
                    self.classifier.workflow_to_command(&doc.path),
                    Conversion::WorkflowToCommand,
                ),
                DocumentKind::Context
                | DocumentKind::Command
                | DocumentKind::GlobalSource
                | DocumentKind::GlobalCommand
                | DocumentKind::GlobalWorkflow
                | DocumentKind::Excluded
                | DocumentKind::Other => continue,
            };
            result.files_processed += 1;
            let outcome = match target {
                Some(target) => self.sync_pair(doc, &target, conversion).await,
                None => {
                    tracing::debug!(path = %doc.path.display(), "skipped: no counterpart");
                    PairOutcome::Skipped(SkipReason::NoCounterpart)
                }
            };
            outcome.record(&doc.path, &mut result);
        }
        result
    }

    /// Forward-sync one edited file: a project command to its workflow, or a
    /// context-named file to its rule copy. Anything else is a no-op.
    ///
    /// A relative `path` is resolved against `project_root`, or the working
    /// directory when there is none.
    pub async fn sync_file(&self, path: &Path, project_root: Option<&Path>) -> SyncResult {
        let path = resolve(path, project_root);
        let kind = self.classifier.classify(&path);

        // Uppercase names other than the canonical one classify as `Other`
        // but still sync as context files.
        let (target, conversion, source_kind) = if kind == DocumentKind::Command {
            match self.classifier.command_to_workflow(&path) {
                Some(target) => (target, Conversion::CommandToWorkflow, DocumentKind::Command),
                None => return SyncResult::noop(),
            }
        } else if self.classifier.is_context_candidate(&path) {
            (
                self.classifier.context_to_rule(&path),
                Conversion::ContextToRule,
                DocumentKind::Context,
            )
        } else {
            tracing::debug!(path = %path.display(), %kind, "not a context or command file");
            return SyncResult::noop();
        };

        let mut source = match self.classifier.read_document(&path).await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, "cannot read edited file");
                return SyncResult::failed();
            }
        };
        source.kind = source_kind;

        let mut result = SyncResult {
            files_processed: 1,
            ..SyncResult::noop()
        };
        self.sync_pair(&source, &target, conversion)
            .await
            .record(&path, &mut result);
        result
    }
}
