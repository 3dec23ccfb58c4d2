//! Error types for tandem-core.

use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the [`FileAccessor`](crate::fs::FileAccessor).
///
/// Missing files and permission problems are ordinary outcomes here, not
/// panics; callers decide whether a failure skips a document or the batch.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The path does not exist.
    #[error("not found: {path}")]
    NotFound { path: PathBuf },

    /// Any other I/O failure, with the path that caused it.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AccessError {
    pub fn path(&self) -> &PathBuf {
        match self {
            AccessError::NotFound { path } | AccessError::Io { path, .. } => path,
        }
    }
}

/// Errors that can arise while loading [`SyncConfig`](crate::config::SyncConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on the override file, with its path.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Convenience constructor for [`AccessError`], mapping `NotFound` kinds.
pub(crate) fn access_err(path: impl Into<PathBuf>, source: std::io::Error) -> AccessError {
    let path = path.into();
    if source.kind() == std::io::ErrorKind::NotFound {
        AccessError::NotFound { path }
    } else {
        AccessError::Io { path, source }
    }
}
