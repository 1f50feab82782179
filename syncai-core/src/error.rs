//! Error types for syncai-core.

use std::path::PathBuf;

use thiserror::Error;

/// Why a rules/commands pattern was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern has no file name component")]
    MissingFileName,

    #[error("pattern may contain at most one '*'")]
    MultipleWildcards,

    #[error("'*' is only allowed in the file name, not the directory")]
    WildcardInDirectory,
}

/// All errors that can arise while loading the agent configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, with the path that caused it.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parse error on load.
    #[error("failed to parse config at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parse error on load; includes line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config at {path} has no agents defined")]
    NoAgents { path: PathBuf },

    #[error("agent #{index} has a blank name")]
    BlankAgentName { index: usize },

    #[error("agent name '{name}' is configured more than once (names are case-insensitive)")]
    DuplicateAgent { name: String },

    #[error("invalid {kind} pattern '{pattern}' for agent '{agent}': {source}")]
    InvalidPattern {
        agent: String,
        kind: &'static str,
        pattern: String,
        #[source]
        source: PatternError,
    },

    #[error("working directory {path} does not exist")]
    WorkdirNotFound { path: PathBuf },

    #[error("working directory {path} is not a directory")]
    NotADirectory { path: PathBuf },
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
