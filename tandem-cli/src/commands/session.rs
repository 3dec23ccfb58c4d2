//! `tandem session-start [ROOT]` — the three steps run when an editor session opens.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use super::{block_on, orchestrator, print_summary, root_or_cwd};

/// Arguments for `tandem session-start`.
#[derive(Args, Debug)]
pub struct SessionStartArgs {
    /// Project root (defaults to the current directory).
    pub root: Option<PathBuf>,
}

impl SessionStartArgs {
    pub fn run(self) -> Result<()> {
        let root = root_or_cwd(self.root)?;
        let orchestrator = orchestrator(false)?;
        let report = block_on(orchestrator.session_start(&root))?;

        let steps = [
            ("Global context", &report.global_context),
            ("Global commands", &report.global_commands),
            ("Project", &report.project),
        ];
        for (label, result) in steps {
            let mark = if result.success {
                "✓".green().bold()
            } else {
                "✗".red().bold()
            };
            eprintln!("{mark} {label}");
            print_summary(result, false);
        }

        if !report.success() {
            bail!("session start finished with errors");
        }
        Ok(())
    }
}
