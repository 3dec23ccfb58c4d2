//! Session start: everything a fresh editor session needs, in order.

use std::path::Path;

use tandem_core::SyncResult;

use crate::orchestrator::Orchestrator;

/// Per-step results of [`Orchestrator::session_start`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub global_context: SyncResult,
    pub global_commands: SyncResult,
    pub project: SyncResult,
}

impl SessionReport {
    /// All three steps folded into one summary.
    pub fn total(&self) -> SyncResult {
        let mut total = SyncResult::noop();
        for step in [&self.global_context, &self.global_commands, &self.project] {
            total.absorb(step.clone());
        }
        total
    }

    pub fn success(&self) -> bool {
        self.global_context.success && self.global_commands.success && self.project.success
    }
}

impl Orchestrator {
    /// Build the global context, reconcile global commands, then sync the
    /// project at `root`. A failing step does not stop the next one.
    pub async fn session_start(&self, root: &Path) -> SessionReport {
        tracing::info!(root = %root.display(), "session start");
        let global_context = self.build_global_context().await;
        let global_commands = self.sync_global().await;
        let project = self.sync_project(root).await;
        SessionReport {
            global_context,
            global_commands,
            project,
        }
    }
}
