//! `tandem diff [ROOT]` — show unified diffs for what a session sync would write.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tandem_sync::diff_session;

use super::{block_on, display, load_config, root_or_cwd};

/// Arguments for `tandem diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Project root (defaults to the current directory).
    pub root: Option<PathBuf>,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let root = root_or_cwd(self.root)?;
        let config = load_config()?;

        let diffs = block_on(diff_session(config, &root))?
            .with_context(|| format!("diff failed for '{}'", display(&root)))?;

        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        Ok(())
    }
}
