//! Domain types shared by every tandem crate.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version string written into every sync stamp.
pub const SYNC_VERSION: &str = "1.0.0";

/// Repository boilerplate that is never treated as a context document, even
/// though the names match the uppercase-name heuristic.
pub const EXCLUDED_FILES: &[&str] = &[
    "ACKNOWLEDGMENTS.md",
    "AUTHORS.md",
    "CHANGELOG.md",
    "DEPLOY_CHANGELOG.md",
    "CODE_OF_CONDUCT.md",
    "CONTRIBUTING.md",
    "CREDITS.md",
    "FAQ.md",
    "HISTORY.md",
    "INSTALL.md",
    "LICENSE.md",
    "LOGS.md",
    "NODE-LICENSE.md",
    "NOTES.md",
    "README.md",
    "SECURITY.md",
    "SUPPORT.md",
    "TODO.md",
    "TROUBLESHOOTING.md",
    "UPGRADE.md",
];

/// Directory names pruned from every recursive scan.
pub const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".next",
    ".nuxt",
    "dist",
    "build",
    ".cache",
    "coverage",
    ".nyc_output",
    "tmp",
    "temp",
];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which store a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Project context file (`CLAUDE.md` and friends).
    Context,
    /// Project rule (`WINDSURF.md` or anything under the rules directory).
    Rule,
    /// Project command under the commands directory.
    Command,
    /// Project workflow under the workflows directory.
    Workflow,
    /// Global command template in the canonical source root.
    GlobalSource,
    /// Global command mirror, commands-style.
    GlobalCommand,
    /// Global command mirror, workflow-style.
    GlobalWorkflow,
    /// Repository boilerplate on the excluded-filename list.
    Excluded,
    Other,
}

/// Formatting conventions of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// No front-matter, `- ` bullets, backtick code spans.
    Context,
    /// Rule front-matter (`trigger`/`description`/`globs`), `* ` bullets, bold spans.
    Rule,
    /// Workflow front-matter (`description` only).
    Workflow,
}

impl DocumentKind {
    /// All variants in a stable order.
    pub fn all() -> &'static [DocumentKind] {
        &[
            DocumentKind::Context,
            DocumentKind::Rule,
            DocumentKind::Command,
            DocumentKind::Workflow,
            DocumentKind::GlobalSource,
            DocumentKind::GlobalCommand,
            DocumentKind::GlobalWorkflow,
            DocumentKind::Excluded,
            DocumentKind::Other,
        ]
    }

    /// The dialect a document of this kind is written in, if it takes part in sync.
    pub fn dialect(self) -> Option<Dialect> {
        match self {
            DocumentKind::Context
            | DocumentKind::Command
            | DocumentKind::GlobalSource
            | DocumentKind::GlobalCommand => Some(Dialect::Context),
            DocumentKind::Rule => Some(Dialect::Rule),
            DocumentKind::Workflow | DocumentKind::GlobalWorkflow => Some(Dialect::Workflow),
            DocumentKind::Excluded | DocumentKind::Other => None,
        }
    }

    /// One of the three global command locations.
    pub fn is_global(self) -> bool {
        matches!(
            self,
            DocumentKind::GlobalSource | DocumentKind::GlobalCommand | DocumentKind::GlobalWorkflow
        )
    }

    /// One of the two global mirrors (not the canonical source).
    pub fn is_global_mirror(self) -> bool {
        matches!(self, DocumentKind::GlobalCommand | DocumentKind::GlobalWorkflow)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentKind::Context => "context",
            DocumentKind::Rule => "rule",
            DocumentKind::Command => "command",
            DocumentKind::Workflow => "workflow",
            DocumentKind::GlobalSource => "global-source",
            DocumentKind::GlobalCommand => "global-command",
            DocumentKind::GlobalWorkflow => "global-workflow",
            DocumentKind::Excluded => "excluded",
            DocumentKind::Other => "other",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Provenance marker embedded in a synced document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStamp {
    pub last_sync_time: DateTime<Utc>,
    pub source_file: PathBuf,
    pub sync_version: String,
}

impl SyncStamp {
    /// A fresh stamp for `source_file`, truncated to millisecond precision so
    /// it survives a format/parse round-trip unchanged.
    pub fn now(source_file: impl Into<PathBuf>) -> Self {
        Self::at(Utc::now(), source_file)
    }

    pub fn at(time: DateTime<Utc>, source_file: impl Into<PathBuf>) -> Self {
        let millis = time.timestamp_millis();
        Self {
            last_sync_time: DateTime::from_timestamp_millis(millis).unwrap_or(time),
            source_file: source_file.into(),
            sync_version: SYNC_VERSION.to_string(),
        }
    }
}

/// A document read fresh from disk for one orchestration pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub content: String,
    pub modified: DateTime<Utc>,
    pub stamp: Option<SyncStamp>,
    pub kind: DocumentKind,
}

impl Document {
    /// File name as a display string (`deploy.md`).
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

/// File name of `path` as an owned string, empty when there is none.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Content that a dry run would have written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite {
    pub path: PathBuf,
    pub content: String,
}

/// Outcome of an orchestration entry point.
///
/// `success == false` means the run itself failed (for example the project
/// root could not be scanned); per-document failures land in `skipped`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncResult {
    pub files_processed: usize,
    pub files_updated: usize,
    pub success: bool,
    /// Target paths written (or planned, in dry-run mode).
    pub updated: Vec<PathBuf>,
    /// Source or group paths that did not produce a write.
    pub skipped: Vec<PathBuf>,
    /// Populated only in dry-run mode.
    pub planned: Vec<PlannedWrite>,
}

impl SyncResult {
    /// Nothing to do; still a success.
    pub fn noop() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }

    /// Fold `other` into `self`, keeping success only if both succeeded.
    pub fn absorb(&mut self, other: SyncResult) {
        self.files_processed += other.files_processed;
        self.files_updated += other.files_updated;
        self.success = self.success && other.success;
        self.updated.extend(other.updated);
        self.skipped.extend(other.skipped);
        self.planned.extend(other.planned);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
