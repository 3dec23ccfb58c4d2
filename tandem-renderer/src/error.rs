//! Error types for tandem-renderer.

use std::path::PathBuf;

use tandem_core::DocumentKind;
use thiserror::Error;

/// Failures inside a conversion.
///
/// These never cross the [`Transformer`](crate::Transformer) boundary: every
/// conversion maps them to a failed [`MergeResult`](crate::MergeResult).
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Filesystem error while loading user templates.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// No conversion exists between the two kinds.
    #[error("no conversion from {from} to {to}")]
    Unsupported { from: DocumentKind, to: DocumentKind },
}
