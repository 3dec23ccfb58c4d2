//! Error types for tandem-sync.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use tandem_core::{AccessError, ConfigError};
use tandem_renderer::RenderError;

/// Errors that escape the per-document layer.
///
/// Per-document failures never show up here; they are logged and counted as
/// skipped in the [`SyncResult`](tandem_core::SyncResult).
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the template engine (user overrides failed to load).
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Access(#[from] AccessError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The lint command ran and reported problems.
    #[error("lint failed for {path}: {status}")]
    Lint { path: PathBuf, status: ExitStatus },

    /// Hook payload is not valid JSON.
    #[error("hook payload JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Hook payload names no file.
    #[error("hook payload carries no file path")]
    NoHookPath,
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
