//! Agent configuration file.
//!
//! # File layout
//!
//! ```json
//! {
//!   "config": { "interval": 5, "workdir": "." },
//!   "agents": [
//!     { "name": "cursor",
//!       "rules":   { "pattern": ".cursor/rules/*.mdc" },
//!       "context": { "path": "AGENTS.md" },
//!       "ignore":  { "path": ".cursorignore" } }
//!   ]
//! }
//! ```
//!
//! JSON is the default format; a `.yaml`/`.yml` file is read as YAML.
//! `guidelines` is accepted in place of `context`.
//!
//! # API pattern
//!
//! - `load_at(config_path, workdir)`: explicit working-directory override
//! - `load(config_path)`: working directory from the file, delegates to `_at`

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::types::{Agent, AgentName, Dialect, FilePattern, Kind};

/// Config file looked up when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "syncai.json";

/// Poll interval used when the file leaves it unset or zero.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// 1. On-disk schema
// ---------------------------------------------------------------------------

/// Raw, unvalidated configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, rename = "config")]
    pub meta: Meta,
    #[serde(default)]
    pub agents: Vec<AgentEntry>,
}

/// The `config` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Seconds between polls; `0` selects [`DEFAULT_INTERVAL`].
    #[serde(default)]
    pub interval: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<PatternSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<PatternSection>,
    #[serde(default, alias = "guidelines", skip_serializing_if = "Option::is_none")]
    pub context: Option<PathSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<PathSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSection {
    #[serde(default)]
    pub pattern: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSection {
    #[serde(default)]
    pub path: String,
}

/// Serialisation format of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Format implied by the file extension; anything but YAML is JSON.
    pub fn from_path(path: &Path) -> Format {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Format::Yaml
            }
            _ => Format::Json,
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Validated configuration
// ---------------------------------------------------------------------------

/// Loaded configuration. Agent paths are rooted at `workdir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// File the configuration was read from.
    pub source: PathBuf,
    pub workdir: PathBuf,
    pub interval: Duration,
    /// Agents in file order; order breaks ties when classifying paths.
    pub agents: Vec<Agent>,
}

impl ConfigFile {
    /// Parse a document in the given format. `path` is only used in errors.
    pub fn parse(contents: &str, format: Format, path: &Path) -> Result<Self, ConfigError> {
        match format {
            Format::Json => serde_json::from_str(contents).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            }),
            Format::Yaml => serde_yaml::from_str(contents).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Validate the raw document and root every agent at `workdir`.
    pub fn into_config(self, source: &Path, workdir: PathBuf) -> Result<Config, ConfigError> {
        if self.agents.is_empty() {
            return Err(ConfigError::NoAgents {
                path: source.to_path_buf(),
            });
        }

        let mut seen = HashSet::new();
        let mut agents = Vec::with_capacity(self.agents.len());
        for (index, entry) in self.agents.into_iter().enumerate() {
            let agent = entry.into_agent(index)?;
            if !seen.insert(agent.name.0.to_ascii_lowercase()) {
                return Err(ConfigError::DuplicateAgent {
                    name: agent.name.0,
                });
            }
            agents.push(agent.rooted_at(&workdir));
        }

        let interval = match self.meta.interval {
            0 => DEFAULT_INTERVAL,
            secs => Duration::from_secs(secs),
        };

        Ok(Config {
            source: source.to_path_buf(),
            workdir,
            interval,
            agents,
        })
    }
}

impl AgentEntry {
    fn into_agent(self, index: usize) -> Result<Agent, ConfigError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ConfigError::BlankAgentName { index });
        }

        let mut agent = Agent::new(AgentName::from(name));
        agent.context = non_blank(self.context.map(|s| s.path)).map(PathBuf::from);
        agent.ignore = non_blank(self.ignore.map(|s| s.path)).map(PathBuf::from);
        agent.rules = parse_pattern(name, Kind::Rules, self.rules)?;
        agent.commands = parse_pattern(name, Kind::Commands, self.commands)?;
        if let Some(dialect) = self.dialect {
            agent.dialect = dialect;
        }
        Ok(agent)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_pattern(
    agent: &str,
    kind: Kind,
    section: Option<PatternSection>,
) -> Result<Option<FilePattern>, ConfigError> {
    let Some(pattern) = non_blank(section.map(|s| s.pattern)) else {
        return Ok(None);
    };
    FilePattern::parse(&pattern)
        .map(Some)
        .map_err(|source| ConfigError::InvalidPattern {
            agent: agent.to_string(),
            kind: kind.as_str(),
            pattern,
            source,
        })
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Load and validate the configuration at `config_path`.
///
/// Working directory precedence: `workdir` argument, then `config.workdir`
/// (relative to the config file's directory), then the config file's
/// directory.
pub fn load_at(config_path: &Path, workdir: Option<&Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(config_path).map_err(|e| io_err(config_path, e))?;
    let file = ConfigFile::parse(&contents, Format::from_path(config_path), config_path)?;

    let base = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let workdir = match (workdir, file.meta.workdir.as_ref()) {
        (Some(dir), _) => dir.to_path_buf(),
        (None, Some(dir)) if !dir.as_os_str().is_empty() => base.join(dir),
        (None, _) => base.to_path_buf(),
    };
    validate_workdir(&workdir)?;

    file.into_config(config_path, workdir)
}

/// `load_at` convenience wrapper.
pub fn load(config_path: &Path) -> Result<Config, ConfigError> {
    load_at(config_path, None)
}

fn validate_workdir(path: &Path) -> Result<(), ConfigError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ConfigError::NotADirectory {
            path: path.to_path_buf(),
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(ConfigError::WorkdirNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(err) => Err(io_err(path, err)),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
