//! SyncAI: keep AI coding-agent files consistent across agents.
//!
//! # Usage
//!
//! ```text
//! syncai [--config <path>] [--workdir <dir>] sync [--dry-run]
//! syncai [--config <path>] [--workdir <dir>] watch [--interval <secs>] [--events] [--skip-initial]
//! syncai [--config <path>] [--workdir <dir>] diff
//! syncai [--config <path>] [--workdir <dir>] status [--json]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    diff::DiffArgs, status::StatusArgs, sync::SyncArgs, watch::WatchArgs, GlobalArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "syncai",
    version,
    about = "Synchronise rules, commands, context and ignore files between AI coding agents",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile every artifact once from its newest copy.
    Sync(SyncArgs),

    /// Reconcile, then keep propagating changes until ctrl-c.
    Watch(WatchArgs),

    /// Show unified diffs of what `sync` would write.
    Diff(DiffArgs),

    /// List managed files by agent, kind and stem.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    syncai_daemon::init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(&cli.global),
        Commands::Watch(args) => args.run(&cli.global),
        Commands::Diff(args) => args.run(&cli.global),
        Commands::Status(args) => args.run(&cli.global),
    }
}
