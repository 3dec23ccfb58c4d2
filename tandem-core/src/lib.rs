//! Tandem core library — domain types, configuration, file access, errors.
//!
//! - [`types`] — document kinds, documents, stamps, sync results
//! - [`config`] — [`SyncConfig`], resolved once and passed by reference
//! - [`stamp`] — the three-line sync stamp marker
//! - [`fs`] — [`FileAccessor`], async file I/O with tagged failures
//! - [`error`] — [`AccessError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod fs;
pub mod stamp;
pub mod types;

pub use config::SyncConfig;
pub use error::{AccessError, ConfigError};
pub use fs::FileAccessor;
pub use types::{
    Dialect, Document, DocumentKind, PlannedWrite, SyncResult, SyncStamp, EXCLUDED_DIRS,
    EXCLUDED_FILES, SYNC_VERSION,
};
