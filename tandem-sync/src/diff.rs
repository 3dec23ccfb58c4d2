//! Dry-run unified diff support for `tandem diff`.

use std::path::{Path, PathBuf};

use similar::TextDiff;

use tandem_core::{AccessError, FileAccessor, PlannedWrite, SyncConfig};

use crate::orchestrator::Orchestrator;
use crate::writer::same_modulo_stamp;
use crate::SyncError;

/// A single planned file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Plan a full session for `root` and compare it to what is on disk.
///
/// No files are written. Files whose planned content differs from disk only
/// in the sync stamp produce no diff.
pub async fn diff_session(config: SyncConfig, root: &Path) -> Result<Vec<FileDiff>, SyncError> {
    let files = FileAccessor::from_config(&config);
    let orchestrator = Orchestrator::new(config)?.with_dry_run(true);
    let planned = orchestrator.session_start(root).await.total().planned;
    diff_planned(&files, &planned, root).await
}

/// Unified diffs of `planned` against current content; paths under `base`
/// are shown relative to it.
pub async fn diff_planned(
    files: &FileAccessor,
    planned: &[PlannedWrite],
    base: &Path,
) -> Result<Vec<FileDiff>, SyncError> {
    let mut diffs = Vec::new();
    for write in planned {
        let rendered = normalize_line_endings(&write.content);
        let existing = read_existing_or_empty(files, &write.path).await?;
        if same_modulo_stamp(&existing, &rendered) {
            continue;
        }

        let relative = write.path.strip_prefix(base).unwrap_or(write.path.as_path());
        let shown = relative.to_string_lossy();
        let shown = shown.trim_start_matches('/');
        let old_header = format!("a/{shown}");
        let new_header = format!("b/{shown}");
        let unified = TextDiff::from_lines(&existing, &rendered)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        diffs.push(FileDiff {
            path: write.path.clone(),
            unified_diff: unified,
        });
    }
    Ok(diffs)
}

async fn read_existing_or_empty(files: &FileAccessor, path: &Path) -> Result<String, SyncError> {
    match files.read(path).await {
        Ok(content) => Ok(normalize_line_endings(&content)),
        Err(AccessError::NotFound { .. }) => Ok(String::new()),
        Err(err) => Err(err.into()),
    }
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}
