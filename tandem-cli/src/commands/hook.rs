//! `tandem hook [JSON]` — route an editor post-tool-use payload.

use std::io::Read;

use anyhow::{Context, Result};
use clap::Args;

use tandem_sync::HookPayload;

use super::{block_on, finish, orchestrator};

/// Arguments for `tandem hook`.
#[derive(Args, Debug)]
pub struct HookArgs {
    /// Hook payload; read from stdin when omitted.
    pub json: Option<String>,
}

impl HookArgs {
    pub fn run(self) -> Result<()> {
        let raw = match self.json {
            Some(json) => json,
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read hook payload from stdin")?;
                buf
            }
        };
        let payload = HookPayload::parse(&raw).context("invalid hook payload")?;
        let path = payload.file_path().context("hook payload names no file")?;
        let cwd = std::env::current_dir().context("could not determine working directory")?;

        tracing::debug!(tool = ?payload.tool_name, path = %path.display(), "hook");
        let orchestrator = orchestrator(false)?;
        let result = block_on(orchestrator.dispatch(&path, Some(&cwd)))?;
        finish("Hook sync", &result, false)
    }
}
