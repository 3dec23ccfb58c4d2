//! Subcommand implementations and the helpers they share.

pub mod diff;
pub mod file;
pub mod global;
pub mod hook;
pub mod project;
pub mod session;
pub mod watch;

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tandem_core::types::file_name_of;
use tandem_core::{SyncConfig, SyncResult};
use tandem_sync::Orchestrator;

pub(crate) fn load_config() -> Result<SyncConfig> {
    SyncConfig::load().context("failed to load tandem config")
}

pub(crate) fn orchestrator(dry_run: bool) -> Result<Orchestrator> {
    let orchestrator = Orchestrator::new(load_config()?).context("failed to load templates")?;
    Ok(orchestrator.with_dry_run(dry_run))
}

/// Run one async entry point to completion on a fresh runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

/// `ROOT` argument, defaulting to the working directory.
pub(crate) fn root_or_cwd(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(root) => Ok(root),
        None => std::env::current_dir().context("could not determine working directory"),
    }
}

/// Print the updated/skipped summary on stderr.
pub(crate) fn print_summary(result: &SyncResult, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    if !result.updated.is_empty() {
        let names: Vec<String> = result.updated.iter().map(|p| file_name_of(p)).collect();
        let verb = if dry_run { "Would update" } else { "Updated" };
        eprintln!("{prefix}{} {verb}: {}", "✓".green().bold(), names.join(", "));
        for write in &result.planned {
            eprintln!("  ~  {}", write.path.display());
        }
    }
    if !result.skipped.is_empty() {
        eprintln!(
            "{prefix}{} Skipped: {} files",
            "→".yellow().bold(),
            result.skipped.len()
        );
    }
    if result.success && result.files_updated == 0 {
        eprintln!("{prefix}{} No files needed updating", "→".yellow().bold());
    }
}

/// Summary, then a non-zero exit when the run failed.
pub(crate) fn finish(label: &str, result: &SyncResult, dry_run: bool) -> Result<()> {
    print_summary(result, dry_run);
    if !result.success {
        eprintln!("{} {label} failed", "✗".red().bold());
        bail!("{label} failed");
    }
    eprintln!("{} {label} complete", "✓".green().bold());
    Ok(())
}

pub(crate) fn display(path: &Path) -> String {
    path.display().to_string()
}
