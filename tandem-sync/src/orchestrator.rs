//! The orchestrator and the pairwise sync policy every entry point shares.
//!
//! ## `sync_pair` — per-document protocol
//!
//! 1. Read the target fresh; a missing or blank target cannot conflict.
//! 2. Both stamped: skip when the target's stamp is at least as new.
//!    Otherwise skip only when the target's mtime leads by more than the
//!    configured tolerance.
//! 3. Convert, carrying the target's front-matter values over.
//! 4. Write atomically (or plan the write in dry-run mode).
//! 5. Lint the written file; failures are dropped.
//!
//! Each pair runs to completion before the next starts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tandem_core::{
    AccessError, Document, FileAccessor, PlannedWrite, SyncConfig, SyncResult, SyncStamp,
};
use tandem_detector::{Classifier, DetectError};
use tandem_renderer::{Conversion, Transformer};

use crate::error::SyncError;
use crate::lint::MarkdownLint;
use crate::writer::{write_target, WriteResult};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why a pair produced no write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Both copies are stamped and the target's stamp is not older.
    TargetStampNewer,
    /// No usable stamps; the target's mtime leads by more than the tolerance.
    TargetModifiedLater,
    /// Only the stamp would have changed.
    Unchanged,
    /// The source has no counterpart path in the target store.
    NoCounterpart,
    /// The source could not be read.
    Unreadable,
    MergeFailed,
    WriteFailed,
}

/// Result of one source → target step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairOutcome {
    Written(PathBuf),
    /// Dry-run: what would have been written.
    Planned(PlannedWrite),
    Skipped(SkipReason),
}

impl PairOutcome {
    /// Fold into a batch summary. `source` lands in `skipped` on a skip.
    pub fn record(self, source: &Path, result: &mut SyncResult) {
        match self {
            PairOutcome::Written(path) => {
                result.files_updated += 1;
                result.updated.push(path);
            }
            PairOutcome::Planned(write) => {
                result.files_updated += 1;
                result.updated.push(write.path.clone());
                result.planned.push(write);
            }
            PairOutcome::Skipped(_) => result.skipped.push(source.to_path_buf()),
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, PairOutcome::Written(_) | PairOutcome::Planned(_))
    }
}

/// Whether an existing `target` should be left alone.
///
/// Stamps decide whenever both copies carry one; filesystem times are only
/// consulted otherwise, and the target must lead by strictly more than
/// `tolerance` to win.
pub fn target_is_newer(source: &Document, target: &Document, tolerance: Duration) -> Option<SkipReason> {
    if let (Some(source_stamp), Some(target_stamp)) = (&source.stamp, &target.stamp) {
        return (target_stamp.last_sync_time >= source_stamp.last_sync_time)
            .then_some(SkipReason::TargetStampNewer);
    }
    let lead_ms = target
        .modified
        .signed_duration_since(source.modified)
        .num_milliseconds();
    let tolerance_ms = i64::try_from(tolerance.as_millis()).unwrap_or(i64::MAX);
    (lead_ms > tolerance_ms).then_some(SkipReason::TargetModifiedLater)
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives every sync entry point. Build once per process with the resolved
/// configuration.
pub struct Orchestrator {
    pub(crate) config: SyncConfig,
    pub(crate) files: FileAccessor,
    pub(crate) classifier: Classifier,
    pub(crate) transformer: Transformer,
    pub(crate) lint: MarkdownLint,
    pub(crate) dry_run: bool,
}

impl Orchestrator {
    /// Loads template overrides from `config.templates_dir` when it exists.
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        let transformer = Transformer::with_templates(&config.templates_dir)?;
        Ok(Self {
            files: FileAccessor::from_config(&config),
            classifier: Classifier::new(&config),
            lint: MarkdownLint::from_config(&config.lint),
            transformer,
            config,
            dry_run: false,
        })
    }

    /// Plan writes instead of performing them; the linter never runs.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Propagate `source` to `target` through `conversion`, unless the
    /// target already holds an equal-or-newer copy.
    pub async fn sync_pair(
        &self,
        source: &Document,
        target: &Path,
        conversion: Conversion,
    ) -> PairOutcome {
        let existing = self.read_existing(target).await;
        if let Some(existing) = &existing {
            if let Some(reason) = target_is_newer(source, existing, self.config.mtime_tolerance) {
                tracing::debug!(
                    source = %source.path.display(),
                    target = %target.display(),
                    ?reason,
                    "skipped: target is newer"
                );
                return PairOutcome::Skipped(reason);
            }
        }
        self.overwrite(source, target, conversion, existing.as_ref())
            .await
    }

    /// Convert and write without any recency check.
    pub(crate) async fn overwrite(
        &self,
        source: &Document,
        target: &Path,
        conversion: Conversion,
        existing: Option<&Document>,
    ) -> PairOutcome {
        let stamp = SyncStamp::now(&source.path);
        let merged = self.transformer.apply(
            conversion,
            &source.content,
            &stamp,
            existing.map(|doc| doc.content.as_str()),
        );
        if !merged.success {
            tracing::warn!(source = %source.path.display(), "skipped: conversion failed");
            return PairOutcome::Skipped(SkipReason::MergeFailed);
        }
        let written = write_target(&self.files, target, &merged.content, self.dry_run).await;
        self.settle(written, merged.content).await
    }

    /// Turn a write attempt into an outcome, linting what was written.
    pub(crate) async fn settle(
        &self,
        written: Result<WriteResult, SyncError>,
        content: String,
    ) -> PairOutcome {
        match written {
            Ok(WriteResult::Written { path }) => {
                self.lint.run_quietly(&path).await;
                PairOutcome::Written(path)
            }
            Ok(WriteResult::WouldWrite { path }) => PairOutcome::Planned(PlannedWrite { path, content }),
            Ok(WriteResult::Unchanged { .. }) => PairOutcome::Skipped(SkipReason::Unchanged),
            Err(e) => {
                tracing::warn!(error = %e, "skipped: write failed");
                PairOutcome::Skipped(SkipReason::WriteFailed)
            }
        }
    }

    /// The target as it stands, or `None` when there is nothing to conflict
    /// with (missing, blank, or unreadable).
    pub(crate) async fn read_existing(&self, path: &Path) -> Option<Document> {
        match self.classifier.read_document(path).await {
            Ok(doc) => Some(doc),
            Err(DetectError::Empty { .. }) | Err(DetectError::Access(AccessError::NotFound { .. })) => {
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "target unreadable, treating as absent");
                None
            }
        }
    }
}


/// `path` made absolute: joined onto `base` when given, else onto the
/// working directory. Classification compares against absolute roots, so
/// every entry point taking a user path resolves it first.
pub(crate) fn resolve(path: &Path, base: Option<&Path>) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match base {
        Some(base) if base.is_absolute() => base.join(path),
        Some(base) => resolve(&base.join(path), None),
        None => match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(e) => {
                tracing::warn!(error = %e, "no working directory, keeping relative path");
                path.to_path_buf()
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
    use rstest::rstest;
    use tandem_core::DocumentKind;

    fn doc(modified: DateTime<Utc>, stamp: Option<DateTime<Utc>>) -> Document {
        Document {
            path: PathBuf::from("/p/a.md"),
            content: "x".to_string(),
            modified,
            stamp: stamp.map(|t| SyncStamp::at(t, "/p/src.md")),
            kind: DocumentKind::Context,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[rstest]
    #[case(0, None)]
    #[case(3_000, None)]
    #[case(5_000, None)]
    #[case(5_001, Some(SkipReason::TargetModifiedLater))]
    #[case(6_000, Some(SkipReason::TargetModifiedLater))]
    #[case(-60_000, None)]
    fn mtime_tolerance(#[case] lead_ms: i64, #[case] expected: Option<SkipReason>) {
        let source = doc(t0(), None);
        let target = doc(t0() + ChronoDuration::milliseconds(lead_ms), None);
        assert_eq!(target_is_newer(&source, &target, Duration::from_secs(5)), expected);
    }

    #[rstest]
    #[case(1, Some(SkipReason::TargetStampNewer))]
    #[case(0, Some(SkipReason::TargetStampNewer))]
    #[case(-1, None)]
    fn stamps_override_mtimes(#[case] stamp_lead_s: i64, #[case] expected: Option<SkipReason>) {
        // mtimes point the other way on purpose: stamps win when both exist.
        let source = doc(t0() + ChronoDuration::hours(1), Some(t0()));
        let target = doc(t0(), Some(t0() + ChronoDuration::seconds(stamp_lead_s)));
        assert_eq!(target_is_newer(&source, &target, Duration::from_secs(5)), expected);
    }

    #[test]
    fn one_stamp_falls_back_to_mtime() {
        let source = doc(t0(), None);
        let target = doc(t0() + ChronoDuration::seconds(10), Some(t0() - ChronoDuration::days(1)));
        assert_eq!(
            target_is_newer(&source, &target, Duration::from_secs(5)),
            Some(SkipReason::TargetModifiedLater)
        );
    }

    #[test]
    fn record_routes_outcomes() {
        let mut result = SyncResult::noop();
        PairOutcome::Written(PathBuf::from("/t/a.md")).record(Path::new("/s/a.md"), &mut result);
        PairOutcome::Skipped(SkipReason::MergeFailed).record(Path::new("/s/b.md"), &mut result);
        PairOutcome::Planned(PlannedWrite {
            path: PathBuf::from("/t/c.md"),
            content: "c".to_string(),
        })
        .record(Path::new("/s/c.md"), &mut result);

        assert_eq!(result.files_updated, 2);
        assert_eq!(result.updated, vec![PathBuf::from("/t/a.md"), PathBuf::from("/t/c.md")]);
        assert_eq!(result.skipped, vec![PathBuf::from("/s/b.md")]);
        assert_eq!(result.planned.len(), 1);
    }

    #[test]
    fn resolve_makes_paths_absolute() {
        let base = Path::new("/work/app");
        let cwd = std::env::current_dir().expect("cwd");
        assert_eq!(resolve(Path::new("CLAUDE.md"), Some(base)), PathBuf::from("/work/app/CLAUDE.md"));
        assert_eq!(resolve(Path::new("/x/CLAUDE.md"), Some(base)), PathBuf::from("/x/CLAUDE.md"));
        assert_eq!(resolve(Path::new("CLAUDE.md"), None), cwd.join("CLAUDE.md"));
        assert_eq!(resolve(Path::new("./deploy.md"), Some(Path::new("app"))), cwd.join("app/./deploy.md"));
        assert!(resolve(Path::new("./deploy.md"), None).starts_with(&cwd));
    }
}
