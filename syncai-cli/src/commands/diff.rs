//! `syncai diff`: show unified diffs for what sync would write.

use anyhow::{Context, Result};
use clap::Args;

use syncai_sync::{diff_pending, SyncEngine};

use super::GlobalArgs;

/// Arguments for `syncai diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {}

impl DiffArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let config = global.load_config()?;
        let workdir = config.workdir.clone();
        let engine = SyncEngine::new(config.agents);

        let diffs = diff_pending(&engine, &workdir).context("diff failed")?;
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
