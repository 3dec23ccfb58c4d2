//! `tandem watch` — foreground watcher; Ctrl-C to stop.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::load_config;

/// Arguments for `tandem watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Project root to watch alongside the global command roots.
    #[arg(long)]
    pub project: Option<PathBuf>,
}

impl WatchArgs {
    pub fn run(self) -> Result<()> {
        let config = load_config()?;
        tandem_daemon::start_blocking(config, self.project).context("watch mode failed")
    }
}
