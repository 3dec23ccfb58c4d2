//! `tandem project [ROOT]` — rules and workflows back to context files and commands.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::{block_on, finish, orchestrator, root_or_cwd};

/// Arguments for `tandem project`.
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Project root (defaults to the current directory).
    pub root: Option<PathBuf>,

    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl ProjectArgs {
    pub fn run(self) -> Result<()> {
        let root = root_or_cwd(self.root)?;
        let orchestrator = orchestrator(self.dry_run)?;
        let result = block_on(orchestrator.sync_project(&root))?;
        finish("Project sync", &result, self.dry_run)
    }
}
