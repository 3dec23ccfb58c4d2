//! Tandem — keep context files, rules, workflows and global command
//! templates in sync.
//!
//! # Usage
//!
//! ```text
//! tandem project [ROOT] [--dry-run]
//! tandem file <PATH> [--project-root DIR] [--dry-run]
//! tandem global [PATH] [--dry-run]
//! tandem session-start [ROOT]
//! tandem hook [JSON]
//! tandem diff [ROOT]
//! tandem watch [--project DIR]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    diff::DiffArgs, file::FileArgs, global::GlobalArgs, hook::HookArgs, project::ProjectArgs,
    session::SessionStartArgs, watch::WatchArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tandem",
    version,
    about = "Sync AI assistant context files, rules and command templates",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync project rules and workflows back to context files and commands.
    Project(ProjectArgs),

    /// Sync one edited context or command file to its rule or workflow.
    File(FileArgs),

    /// Reconcile global command templates, or sync one mirror file back.
    Global(GlobalArgs),

    /// Build global context, reconcile global commands, then sync the project.
    SessionStart(SessionStartArgs),

    /// Handle an editor post-tool-use hook payload (argument or stdin).
    Hook(HookArgs),

    /// Show unified diff of what a session sync would write.
    Diff(DiffArgs),

    /// Watch global command roots (and a project) and sync on change.
    Watch(WatchArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = match cli.command {
        Commands::Watch(_) => "info",
        _ => "warn",
    };
    tandem_daemon::init_tracing(default_level);

    match cli.command {
        Commands::Project(args) => args.run(),
        Commands::File(args) => args.run(),
        Commands::Global(args) => args.run(),
        Commands::SessionStart(args) => args.run(),
        Commands::Hook(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Watch(args) => args.run(),
    }
}
