//! Document classification for `tandem-detector`.
//!
//! `Classifier::classify(path)` decides which store a path belongs to. Checks
//! are ordered: canonical file names and the rules directory first, then the
//! three global command roots, then project command and workflow
//! directories. Nothing here writes to disk.

pub mod paths;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tandem_core::config::{ProjectLayout, Roots};
use tandem_core::types::file_name_of;
use tandem_core::{AccessError, Document, DocumentKind, FileAccessor, SyncConfig, SyncStamp};
use thiserror::Error;

pub use paths::GlobalRoot;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Why a path could not be turned into a [`Document`].
#[derive(Debug, Error)]
pub enum DetectError {
    #[error(transparent)]
    Access(#[from] AccessError),

    /// The file holds nothing but whitespace.
    #[error("empty document: {path}")]
    Empty { path: PathBuf },
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Repository boilerplate that is never a context document.
pub fn is_excluded(file_name: &str) -> bool {
    tandem_core::EXCLUDED_FILES.contains(&file_name)
}

static CONTEXT_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn context_name_re() -> &'static Regex {
    CONTEXT_NAME_RE
        .get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9_-]*\.md$").expect("context name pattern is valid"))
}

/// Uppercase `NAME.md` that is not on the excluded list.
pub fn is_context_name(file_name: &str) -> bool {
    context_name_re().is_match(file_name) && !is_excluded(file_name)
}

/// Parse the sync stamp embedded in `content`.
pub fn extract_sync_stamp(content: &str) -> Option<SyncStamp> {
    tandem_core::stamp::parse_stamp(content)
}

/// Render the three-line stamp marker.
pub fn format_sync_stamp(stamp: &SyncStamp) -> String {
    tandem_core::stamp::format_stamp(stamp)
}

fn is_markdown(file_name: &str) -> bool {
    file_name.ends_with(".md")
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Classifier {
    layout: ProjectLayout,
    commands: Roots,
    files: FileAccessor,
}

impl Classifier {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            layout: config.project.clone(),
            commands: config.commands.clone(),
            files: FileAccessor::from_config(config),
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn command_roots(&self) -> &Roots {
        &self.commands
    }

    /// Decide the kind of `path`; first match wins.
    ///
    /// A context-named file directly inside the rules directory is that
    /// context file's rule copy, so the rules directory is checked first.
    pub fn classify(&self, path: &Path) -> DocumentKind {
        let name = file_name_of(path);
        let in_rules_dir = paths::contains_segment(path, &self.layout.rules_dir);

        if name == self.layout.context_file && !in_rules_dir {
            return DocumentKind::Context;
        }
        if name == self.layout.rule_file || in_rules_dir {
            return DocumentKind::Rule;
        }
        if let Some(root) = self.global_root(path) {
            return root.kind();
        }
        if paths::contains_segment(path, &self.layout.commands_dir) {
            return DocumentKind::Command;
        }
        if paths::contains_segment(path, &self.layout.workflows_dir) {
            return DocumentKind::Workflow;
        }
        if is_excluded(&name) {
            return DocumentKind::Excluded;
        }
        DocumentKind::Other
    }

    /// The global command root `path` lies under, checked source first.
    pub fn global_root(&self, path: &Path) -> Option<GlobalRoot> {
        GlobalRoot::all()
            .iter()
            .copied()
            .find(|root| path.starts_with(root.dir(&self.commands)))
    }

    /// An edited file that forward-syncs into the rules directory.
    pub fn is_context_candidate(&self, path: &Path) -> bool {
        is_context_name(&file_name_of(path))
            && matches!(self.classify(path), DocumentKind::Context | DocumentKind::Other)
    }

    pub fn context_to_rule(&self, path: &Path) -> PathBuf {
        paths::context_to_rule(path, &self.layout)
    }

    pub fn rule_to_context(&self, path: &Path) -> Option<PathBuf> {
        paths::rule_to_context(path, &self.layout)
    }

    pub fn command_to_workflow(&self, path: &Path) -> Option<PathBuf> {
        paths::command_to_workflow(path, &self.layout)
    }

    pub fn workflow_to_command(&self, path: &Path) -> Option<PathBuf> {
        paths::workflow_to_command(path, &self.layout)
    }

    pub fn global_counterpart(
        &self,
        path: &Path,
        from: GlobalRoot,
        to: GlobalRoot,
    ) -> Option<PathBuf> {
        paths::global_counterpart(path, &self.commands, from, to)
    }

    // -----------------------------------------------------------------------
    // Reading
    // -----------------------------------------------------------------------

    /// Read `path` fresh from disk, classify it, and extract its stamp.
    pub async fn read_document(&self, path: &Path) -> Result<Document, DetectError> {
        let content = self.files.read(path).await?;
        if content.trim().is_empty() {
            return Err(DetectError::Empty {
                path: path.to_path_buf(),
            });
        }
        let modified = self.files.modified(path).await?;
        Ok(Document {
            path: path.to_path_buf(),
            stamp: extract_sync_stamp(&content),
            kind: self.classify(path),
            content,
            modified,
        })
    }

    /// Every sync-eligible document of the project at `root`.
    ///
    /// Three scans: context-named files anywhere under `root`, then the
    /// project commands and workflows directories. A missing `root` is an
    /// error; a missing commands or workflows directory is not. Unreadable
    /// and blank files are skipped. Paths are unique.
    pub async fn enumerate(&self, root: &Path) -> Result<Vec<Document>, DetectError> {
        let mut found = self.files.find(root, is_context_name).await?;
        for dir in [&self.layout.commands_dir, &self.layout.workflows_dir] {
            found.extend(self.find_optional(&root.join(dir), is_markdown).await);
        }
        Ok(self.read_all(found).await)
    }

    /// Every document in the three global command roots; missing roots are
    /// skipped.
    pub async fn enumerate_global(&self) -> Vec<Document> {
        let mut found = Vec::new();
        for root in GlobalRoot::all() {
            found.extend(self.find_optional(root.dir(&self.commands), is_markdown).await);
        }
        self.read_all(found).await
    }

    async fn find_optional<F>(&self, dir: &Path, matches: F) -> Vec<PathBuf>
    where
        F: Fn(&str) -> bool,
    {
        match self.files.find(dir, matches).await {
            Ok(paths) => paths,
            Err(e) => {
                tracing::debug!(error = %e, "directory not scanned");
                Vec::new()
            }
        }
    }

    async fn read_all(&self, paths: Vec<PathBuf>) -> Vec<Document> {
        let mut seen = HashSet::new();
        let mut documents = Vec::new();
        for path in paths {
            if !seen.insert(path.clone()) {
                continue;
            }
            match self.read_document(&path).await {
                Ok(document) => documents.push(document),
                Err(DetectError::Empty { path }) => {
                    tracing::debug!(path = %path.display(), "skipping empty document");
                }
                Err(e) => tracing::warn!(error = %e, "skipping unreadable document"),
            }
        }
        documents
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
