//! Global command templates: three-way reconciliation across the source
//! root and both mirrors, and reverse sync of one edited mirror file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tandem_core::{Document, DocumentKind, SyncResult};
use tandem_detector::GlobalRoot;
use tandem_renderer::Conversion;

use crate::orchestrator::{resolve, Orchestrator, PairOutcome, SkipReason};

/// Copies of one template, keyed by the root they were found under.
type Group = Vec<(GlobalRoot, Document)>;

impl Orchestrator {
    /// Reconcile the three global command roots.
    ///
    /// Documents are grouped by their path relative to their root. In every
    /// group with more than one copy the most recently modified copy wins
    /// (first root in source, command, workflow order on a tie) and is
    /// written to every other root, creating missing copies. Stamps are not
    /// consulted. Single-copy groups are skipped.
    pub async fn sync_global(&self) -> SyncResult {
        let groups = self.group_global(self.classifier.enumerate_global().await);

        let mut result = SyncResult::noop();
        for (relative, group) in &groups {
            result.files_processed += 1;
            let Some((winner_root, winner)) = newest(group) else {
                continue;
            };
            if group.len() < 2 {
                tracing::debug!(file = %relative.display(), "skipped: single copy");
                result.skipped.push(winner.path.clone());
                continue;
            }
            tracing::debug!(
                file = %relative.display(),
                from = %winner.path.display(),
                "newest copy wins"
            );

            for root in GlobalRoot::all().iter().copied().filter(|r| *r != winner_root) {
                let target = root.dir(&self.config.commands).join(relative);
                let outcome = match Conversion::between(winner_root.kind(), root.kind()) {
                    Some(conversion) => {
                        let existing = group
                            .iter()
                            .find(|(r, _)| *r == root)
                            .map(|(_, doc)| doc);
                        self.overwrite(winner, &target, conversion, existing).await
                    }
                    None => PairOutcome::Skipped(SkipReason::NoCounterpart),
                };
                outcome.record(&winner.path, &mut result);
            }
        }
        result
    }

    /// Reverse-sync one edited mirror file back to the source root.
    ///
    /// Files that are not global mirror copies are a successful no-op. A
    /// relative `path` is resolved against the working directory.
    pub async fn sync_global_file(&self, path: &Path) -> SyncResult {
        let path = &resolve(path, None);
        let kind = self.classifier.classify(path);
        let from = match kind {
            DocumentKind::GlobalCommand => GlobalRoot::Command,
            DocumentKind::GlobalWorkflow => GlobalRoot::Workflow,
            DocumentKind::Context
            | DocumentKind::Rule
            | DocumentKind::Command
            | DocumentKind::Workflow
            | DocumentKind::GlobalSource
            | DocumentKind::Excluded
            | DocumentKind::Other => {
                tracing::debug!(path = %path.display(), %kind, "not a global mirror file");
                return SyncResult::noop();
            }
        };

        let source = match self.classifier.read_document(path).await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, "cannot read edited mirror file");
                return SyncResult::failed();
            }
        };

        let mut result = SyncResult {
            files_processed: 1,
            ..SyncResult::noop()
        };
        let target = self.classifier.global_counterpart(path, from, GlobalRoot::Source);
        let conversion = Conversion::between(kind, DocumentKind::GlobalSource);
        let outcome = match (target, conversion) {
            (Some(target), Some(conversion)) => self.sync_pair(&source, &target, conversion).await,
            _ => PairOutcome::Skipped(SkipReason::NoCounterpart),
        };
        outcome.record(path, &mut result);
        result
    }

    fn group_global(&self, documents: Vec<Document>) -> BTreeMap<PathBuf, Group> {
        let mut groups: BTreeMap<PathBuf, Group> = BTreeMap::new();
        for doc in documents {
            let Some(root) = self.classifier.global_root(&doc.path) else {
                continue;
            };
            let Ok(relative) = doc.path.strip_prefix(root.dir(&self.config.commands)) else {
                continue;
            };
            let relative = relative.to_path_buf();
            groups.entry(relative).or_default().push((root, doc));
        }
        groups
    }
}

/// Most recently modified member; the earliest one wins a tie.
fn newest(group: &Group) -> Option<(GlobalRoot, &Document)> {
    let mut best: Option<(GlobalRoot, &Document)> = None;
    for (root, doc) in group {
        match best {
            Some((_, current)) if doc.modified <= current.modified => {}
            _ => best = Some((*root, doc)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn member(root: GlobalRoot, offset_s: i64) -> (GlobalRoot, Document) {
        (
            root,
            Document {
                path: PathBuf::from(format!("/{root:?}/deploy.md")),
                content: "x".to_string(),
                modified: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + Duration::seconds(offset_s),
                stamp: None,
                kind: root.kind(),
            },
        )
    }

    #[test]
    fn newest_prefers_latest_mtime() {
        let group = vec![
            member(GlobalRoot::Source, 0),
            member(GlobalRoot::Command, 5),
            member(GlobalRoot::Workflow, 2),
        ];
        assert_eq!(newest(&group).map(|(r, _)| r), Some(GlobalRoot::Command));
    }

    #[test]
    fn newest_tie_keeps_first() {
        let group = vec![member(GlobalRoot::Source, 3), member(GlobalRoot::Workflow, 3)];
        assert_eq!(newest(&group).map(|(r, _)| r), Some(GlobalRoot::Source));
    }

    #[test]
    fn newest_of_empty_group_is_none() {
        assert!(newest(&Vec::new()).is_none());
    }
}
