//! `tandem global [PATH]` — reconcile global command templates.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::{block_on, display, finish, orchestrator};

/// Arguments for `tandem global`.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Edited mirror file to sync back to the source root; omit to
    /// reconcile all three roots.
    pub path: Option<PathBuf>,

    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl GlobalArgs {
    pub fn run(self) -> Result<()> {
        let orchestrator = orchestrator(self.dry_run)?;
        match self.path {
            Some(path) => {
                eprintln!("Syncing modified global workflow back to source: {}", display(&path));
                let result = block_on(orchestrator.sync_global_file(&path))?;
                finish("Global workflow reverse sync", &result, self.dry_run)
            }
            None => {
                eprintln!("Syncing global workflows between source and destinations...");
                let result = block_on(orchestrator.sync_global())?;
                finish("Global workflow sync", &result, self.dry_run)
            }
        }
    }
}
