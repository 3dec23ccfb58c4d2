//! External markdown linter, run on every written file.
//!
//! Linting is advisory: [`MarkdownLint::run`] reports failures, but the
//! orchestrator only logs them at debug level.

use std::path::Path;
use std::process::Stdio;

use tandem_core::config::LintConfig;
use tokio::process::Command;

use crate::error::{io_err, SyncError};

#[derive(Debug, Clone)]
pub struct MarkdownLint {
    /// Program plus leading arguments; `None` when linting is off.
    command: Option<Vec<String>>,
}

impl MarkdownLint {
    pub fn from_config(config: &LintConfig) -> Self {
        let command = (config.enabled && !config.command.is_empty()).then(|| config.command.clone());
        Self { command }
    }

    pub fn disabled() -> Self {
        Self { command: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.command.is_some()
    }

    /// Run the linter on `path` and wait for it.
    pub async fn run(&self, path: &Path) -> Result<(), SyncError> {
        let Some((program, args)) = self.command.as_ref().and_then(|c| c.split_first()) else {
            return Ok(());
        };
        let status = Command::new(program)
            .args(args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| io_err(path, e))?;
        if status.success() {
            Ok(())
        } else {
            Err(SyncError::Lint {
                path: path.to_path_buf(),
                status,
            })
        }
    }

    /// [`run`](Self::run), with any failure logged and dropped.
    pub async fn run_quietly(&self, path: &Path) {
        if let Err(e) = self.run(path).await {
            tracing::debug!(error = %e, "lint failure ignored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lint_with(command: &[&str]) -> MarkdownLint {
        MarkdownLint::from_config(&LintConfig {
            enabled: true,
            command: command.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn disabled_config_means_no_command() {
        let lint = MarkdownLint::from_config(&LintConfig {
            enabled: false,
            ..LintConfig::default()
        });
        assert!(!lint.is_enabled());
        assert!(!lint_with(&[]).is_enabled());
    }

    #[tokio::test]
    async fn missing_program_is_an_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = lint_with(&["tandem-no-such-linter-binary"])
            .run(&tmp.path().join("a.md"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }), "got: {err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_reported_and_quiet_run_swallows_it() {
        let tmp = TempDir::new().unwrap();
        let lint = lint_with(&["false"]);
        let err = lint.run(&tmp.path().join("a.md")).await.unwrap_err();
        assert!(matches!(err, SyncError::Lint { .. }), "got: {err}");
        lint.run_quietly(&tmp.path().join("a.md")).await;
    }

    #[tokio::test]
    async fn disabled_lint_is_ok() {
        MarkdownLint::disabled().run(Path::new("/nope.md")).await.unwrap();
    }
}
