//! # tandem-sync
//!
//! Sync orchestrator: decides direction and recency, converts through the
//! renderer, and writes through the core file accessor.
//!
//! Build one [`Orchestrator`] per process and call an entry point:
//!
//! - [`Orchestrator::sync_project`] — rules and workflows back to context files and commands
//! - [`Orchestrator::sync_file`] — one edited context or command file forward
//! - [`Orchestrator::sync_global`] — three-way reconcile of global commands
//! - [`Orchestrator::sync_global_file`] — one edited mirror file back to the source root
//! - [`Orchestrator::build_global_context`] — rebuild both global context files
//! - [`Orchestrator::session_start`] — all of the above for a new session
//! - [`Orchestrator::dispatch`] — route an edited path to the right entry point
//!
//! Every entry point returns a [`SyncResult`](tandem_core::SyncResult);
//! per-document failures are counted as skipped, never returned as errors.

pub mod diff;
pub mod error;
pub mod global;
pub mod global_context;
pub mod hook;
pub mod lint;
pub mod orchestrator;
pub mod project;
pub mod session;
pub mod writer;

pub use diff::{diff_planned, diff_session, FileDiff};
pub use error::SyncError;
pub use hook::HookPayload;
pub use lint::MarkdownLint;
pub use orchestrator::{target_is_newer, Orchestrator, PairOutcome, SkipReason};
pub use session::SessionReport;
pub use writer::WriteResult;
