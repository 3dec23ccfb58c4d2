//! Editor post-tool-use hook payloads and edit dispatch.
//!
//! ```json
//! {"tool_name": "Edit",
//!  "tool_input": {"file_path": "/work/app/CLAUDE.md"},
//!  "tool_response": {"filePath": "/work/app/CLAUDE.md", "success": true}}
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tandem_core::{DocumentKind, SyncResult};

use crate::error::SyncError;
use crate::orchestrator::{resolve, Orchestrator};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookPayload {
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<ToolInput>,
    #[serde(default)]
    pub tool_response: Option<ToolResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolResponse {
    #[serde(default, rename = "filePath")]
    pub file_path: Option<String>,
}

impl HookPayload {
    pub fn parse(raw: &str) -> Result<Self, SyncError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// The edited file: the response path, falling back to the input path.
    pub fn file_path(&self) -> Result<PathBuf, SyncError> {
        let response = self.tool_response.as_ref().and_then(|r| r.file_path.as_deref());
        let input = self.tool_input.as_ref().and_then(|i| i.file_path.as_deref());
        response
            .or(input)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .ok_or(SyncError::NoHookPath)
    }
}

impl Orchestrator {
    /// Route one edited file to the entry point that owns its kind.
    ///
    /// Mirror edits sync back to the source root, source edits reconcile all
    /// three roots, rule and workflow edits sync the project (when
    /// `project_root` is known), and everything else forward-syncs.
    pub async fn dispatch(&self, path: &Path, project_root: Option<&Path>) -> SyncResult {
        let path = &resolve(path, project_root);
        let kind = self.classifier.classify(path);
        tracing::debug!(path = %path.display(), %kind, "dispatching edit");
        match kind {
            DocumentKind::GlobalCommand | DocumentKind::GlobalWorkflow => {
                self.sync_global_file(path).await
            }
            DocumentKind::GlobalSource => self.sync_global().await,
            DocumentKind::Rule | DocumentKind::Workflow => match project_root {
                Some(root) => self.sync_project(root).await,
                None => SyncResult::noop(),
            },
            DocumentKind::Context | DocumentKind::Command | DocumentKind::Other => {
                self.sync_file(path, project_root).await
            }
            DocumentKind::Excluded => SyncResult::noop(),
        }
    }
}
