//! Global context build: the files directly under the context source root
//! are combined into one document and written to both global mirrors.

use std::path::Path;

use tandem_core::types::file_name_of;
use tandem_core::{AccessError, SyncResult, SyncStamp};
use tandem_renderer::ContextPart;

use crate::orchestrator::Orchestrator;
use crate::writer::write_if_changed;

/// Sort key for a source file, `None` when the extension is not included.
fn priority(path: &Path) -> Option<u8> {
    match path.extension()?.to_str()? {
        "json" => Some(1),
        "toml" => Some(2),
        "md" => Some(3),
        _ => None,
    }
}

fn part_for(path: &Path, content: String) -> ContextPart {
    let name = file_name_of(path);
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(lang @ ("json" | "toml")) => ContextPart::fenced(name, lang, content),
        _ => ContextPart::markdown(name, content),
    }
}

impl Orchestrator {
    /// Rebuild both global context files from the context source root.
    ///
    /// A missing source root is a successful no-op. A mirror whose content
    /// would only change in its stamp is left untouched.
    pub async fn build_global_context(&self) -> SyncResult {
        let root = &self.config.global_context.source;
        let mut paths = match self.files.list(root).await {
            Ok(paths) => paths,
            Err(AccessError::NotFound { .. }) => {
                tracing::debug!(root = %root.display(), "no global context source");
                return SyncResult::noop();
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot list global context source");
                return SyncResult::failed();
            }
        };
        paths.retain(|path| priority(path).is_some());
        paths.sort_by(|a, b| priority(a).cmp(&priority(b)).then_with(|| a.cmp(b)));

        let mut result = SyncResult::noop();
        let mut parts = Vec::new();
        for path in paths {
            result.files_processed += 1;
            match self.files.read(&path).await {
                Ok(content) => parts.push(part_for(&path, content)),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable context file");
                    result.skipped.push(path);
                }
            }
        }
        if parts.is_empty() {
            return result;
        }

        let merged = self.transformer.global_context(&parts, &SyncStamp::now(root));
        if !merged.success {
            result.success = false;
            return result;
        }

        let mirrors = [
            &self.config.global_context.claude,
            &self.config.global_context.windsurf,
        ];
        for target in mirrors {
            let current = self.files.read(target).await.ok();
            let written = write_if_changed(
                &self.files,
                target,
                &merged.content,
                current.as_deref(),
                self.dry_run,
            )
            .await;
            self.settle(written, merged.content.clone())
                .await
                .record(root, &mut result);
        }
        result
    }
}
