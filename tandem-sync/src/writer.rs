//! Target writes, honouring dry-run.

use std::path::{Path, PathBuf};

use tandem_core::stamp::strip_stamp_lines;
use tandem_core::FileAccessor;

use crate::error::SyncError;

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped: only the sync stamp would have changed.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

/// Write `content` to `path` through the atomic accessor.
pub(crate) async fn write_target(
    files: &FileAccessor,
    path: &Path,
    content: &str,
    dry_run: bool,
) -> Result<WriteResult, SyncError> {
    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }
    files.write(path, content).await?;
    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

/// Like [`write_target`], but leaves `path` alone when `current` differs
/// from `content` only in its stamp lines.
pub(crate) async fn write_if_changed(
    files: &FileAccessor,
    path: &Path,
    content: &str,
    current: Option<&str>,
    dry_run: bool,
) -> Result<WriteResult, SyncError> {
    if current.is_some_and(|current| same_modulo_stamp(current, content)) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }
    write_target(files, path, content, dry_run).await
}

/// Equal once stamp lines are dropped and line endings normalised.
pub(crate) fn same_modulo_stamp(a: &str, b: &str) -> bool {
    strip_stamp_lines(&a.replace("\r\n", "\n")) == strip_stamp_lines(&b.replace("\r\n", "\n"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
