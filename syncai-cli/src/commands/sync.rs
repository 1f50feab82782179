//! `syncai sync`: reconcile every artifact once.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use syncai_sync::{ScanReport, Scanner, SyncEngine};

use super::{display_path, GlobalArgs};

/// Arguments for `syncai sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let config = global.load_config()?;
        let workdir = config.workdir.clone();
        let engine = SyncEngine::new(config.agents).dry_run(self.dry_run);
        let mut scanner = Scanner::new(engine);
        let report = scanner.initial_sync().context("sync failed")?;

        print_report(&report, &workdir, self.dry_run);
        if report.failures > 0 {
            bail!("{} sync pass(es) failed; see the log above", report.failures);
        }
        Ok(())
    }
}

fn print_report(report: &ScanReport, workdir: &std::path::Path, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    if report.written.is_empty() {
        println!(
            "{prefix}{} {} artifact(s) checked, nothing to do",
            "✓".green().bold(),
            report.synced.len()
        );
        return;
    }

    let verb = if dry_run { "would write" } else { "wrote" };
    println!(
        "{prefix}{} {} artifact(s) checked, {verb} {} file(s)",
        "✓".green().bold(),
        report.synced.len(),
        report.written.len()
    );
    let marker = if dry_run { "~" } else { "✎" };
    for path in &report.written {
        println!("  {marker}  {}", display_path(path, workdir));
    }
}
