//! Watch mode: file watcher + sequential sync processor.
//!
//! Edits under the global command roots (and, optionally, one project) are
//! debounced per path, queued, and handed one at a time to
//! [`Orchestrator::dispatch`](tandem_sync::Orchestrator::dispatch). Files the
//! processor just wrote are ignored for a short window so a sync never
//! triggers itself.

mod error;
pub mod paths;
mod runtime;

pub use error::DaemonError;
pub use runtime::{init_tracing, run, start_blocking};
