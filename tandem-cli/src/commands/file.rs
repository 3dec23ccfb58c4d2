//! `tandem file <PATH>` — forward-sync one edited file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::{block_on, finish, orchestrator, root_or_cwd};

/// Arguments for `tandem file`.
#[derive(Args, Debug)]
pub struct FileArgs {
    /// Edited context (`NAME.md`) or command file.
    pub path: PathBuf,

    /// Directory a relative PATH is resolved against (defaults to the current directory).
    #[arg(long)]
    pub project_root: Option<PathBuf>,

    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl FileArgs {
    pub fn run(self) -> Result<()> {
        let base = root_or_cwd(self.project_root)?;
        let orchestrator = orchestrator(self.dry_run)?;
        let result = block_on(orchestrator.sync_file(&self.path, Some(&base)))?;
        finish("File sync", &result, self.dry_run)
    }
}
