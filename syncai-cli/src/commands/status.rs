//! `syncai status`: managed files by agent, kind and stem.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use syncai_core::Config;
use syncai_sync::{discover, identify};

use super::{display_path, GlobalArgs};

/// Arguments for `syncai status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let config = global.load_config()?;
        let rows = build_rows(&config)?;
        if self.json {
            return print_json(&config, rows);
        }
        print_table(&config, rows);
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
struct FileStatus {
    agent: String,
    kind: String,
    stem: String,
    path: String,
    modified: DateTime<Local>,
}

#[derive(Serialize)]
struct StatusReportJson {
    workdir: String,
    agents: usize,
    files: Vec<FileStatus>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "agent")]
    agent: String,
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "stem")]
    stem: String,
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "modified")]
    modified: String,
}

fn build_rows(config: &Config) -> Result<Vec<FileStatus>> {
    let paths = discover(&config.agents).context("failed to discover managed files")?;
    let mut rows = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(identity) = identify(&config.agents, &path) else {
            continue;
        };
        let modified = std::fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .with_context(|| format!("failed to stat {}", path.display()))?;
        rows.push(FileStatus {
            agent: identity.agent.name.to_string(),
            kind: identity.kind.to_string(),
            stem: identity.stem,
            path: display_path(&path, &config.workdir),
            modified: DateTime::<Local>::from(modified),
        });
    }
    Ok(rows)
}

fn print_json(config: &Config, files: Vec<FileStatus>) -> Result<()> {
    let payload = StatusReportJson {
        workdir: config.workdir.display().to_string(),
        agents: config.agents.len(),
        files,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(config: &Config, rows: Vec<FileStatus>) {
    let artifacts = rows
        .iter()
        .map(|row| (row.kind.clone(), row.stem.clone()))
        .collect::<BTreeSet<_>>()
        .len();
    println!(
        "SyncAI v{} | {} agents | {} files | {} artifacts",
        env!("CARGO_PKG_VERSION"),
        config.agents.len(),
        rows.len(),
        artifacts,
    );
    println!("{}", workdir_line(&config.workdir).bright_black());

    if rows.is_empty() {
        println!("No managed files found.");
        return;
    }

    let table_rows: Vec<StatusTableRow> = rows
        .into_iter()
        .map(|row| StatusTableRow {
            agent: row.agent,
            kind: row.kind,
            stem: if row.stem.is_empty() { "-".to_string() } else { row.stem },
            path: row.path,
            modified: row.modified.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn workdir_line(workdir: &Path) -> String {
    format!("workdir: {}", workdir.display())
}
