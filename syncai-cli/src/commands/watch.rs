//! `syncai watch`: keep agents in sync until interrupted.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use syncai_daemon::{start_blocking, WatchOptions};

use super::GlobalArgs;

/// Arguments for `syncai watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between scans; overrides the config file.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Also scan on filesystem notifications.
    #[arg(long)]
    pub events: bool,

    /// Do not reconcile existing files before watching.
    #[arg(long)]
    pub skip_initial: bool,
}

impl WatchArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let config = global.load_config()?;
        let mut options = WatchOptions::from_config(&config);
        if let Some(secs) = self.interval.filter(|secs| *secs > 0) {
            options.interval = Duration::from_secs(secs);
        }
        options.events = self.events;
        options.skip_initial = self.skip_initial;

        start_blocking(config, options).context("watch exited with error")
    }
}
