pub mod diff;
pub mod status;
pub mod sync;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use syncai_core::{config, Config, DEFAULT_CONFIG_FILE};

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Configuration file (JSON, or YAML by extension).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory agent paths are resolved against.
    #[arg(long, global = true)]
    pub workdir: Option<PathBuf>,
}

impl GlobalArgs {
    pub fn load_config(&self) -> Result<Config> {
        config::load_at(&self.config, self.workdir.as_deref())
            .with_context(|| format!("failed to load {}", self.config.display()))
    }
}

/// `path` relative to `root` when it lies beneath it.
pub fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
