//! SyncAI core library: agent types and configuration loading.
//!
//! - [`types`]: [`Agent`], [`Kind`], [`Dialect`], [`FilePattern`]
//! - [`config`]: load / validate `syncai.json`
//! - [`paths`]: lexical path normalisation shared by matcher and config
//! - [`error`]: [`ConfigError`], [`PatternError`]

pub mod config;
pub mod error;
pub mod paths;
pub mod types;

pub use config::{Config, DEFAULT_CONFIG_FILE, DEFAULT_INTERVAL};
pub use error::{ConfigError, PatternError};
pub use types::{Agent, AgentName, Dialect, FilePattern, Kind};
