//! Domain types for SyncAI agent configuration.
//!
//! All path fields use `PathBuf`; an agent section that is not configured is
//! `None`, never an empty path.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PatternError;
use crate::paths::clean;

/// Token that stands for the stem inside a [`FilePattern`] file name.
pub const WILDCARD: char = '*';

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Name of a configured agent. Unique per configuration, compared
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentName(pub String);

impl AgentName {
    /// Case-insensitive comparison against another name.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for AgentName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AgentName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Logical category of an agent artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Rule files, one per stem, located through a [`FilePattern`].
    Rules,
    /// Command/prompt files; same pattern semantics as `Rules`.
    Commands,
    /// The single project-context ("guidelines") file of an agent.
    Context,
    /// The single ignore file of an agent.
    Ignore,
}

impl Kind {
    /// All kinds in matching order.
    pub fn all() -> &'static [Kind] {
        &[Kind::Context, Kind::Ignore, Kind::Rules, Kind::Commands]
    }

    /// `true` for kinds that map many files per agent through a pattern.
    pub fn is_pattern(&self) -> bool {
        matches!(self, Kind::Rules | Kind::Commands)
    }

    /// Whether removing one agent's file removes its siblings too.
    ///
    /// Single-file kinds never propagate deletion.
    pub fn propagates_deletion(&self) -> bool {
        self.is_pattern()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Rules => "rules",
            Kind::Commands => "commands",
            Kind::Context => "context",
            Kind::Ignore => "ignore",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Front-matter schema an agent expects on its rule files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// `description` / `alwaysApply` / `globs` (Cursor `.mdc`).
    AlwaysApply,
    /// `description` / `applyTo` (Copilot instructions).
    ApplyTo,
    /// No header; the body is written as is.
    #[default]
    Passthrough,
}

impl Dialect {
    /// Dialect implied by a well-known agent name.
    pub fn for_agent_name(name: &str) -> Dialect {
        match name.trim().to_ascii_lowercase().as_str() {
            "cursor" => Dialect::AlwaysApply,
            "copilot" => Dialect::ApplyTo,
            _ => Dialect::Passthrough,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::AlwaysApply => write!(f, "always-apply"),
            Dialect::ApplyTo => write!(f, "apply-to"),
            Dialect::Passthrough => write!(f, "passthrough"),
        }
    }
}

// ---------------------------------------------------------------------------
// FilePattern
// ---------------------------------------------------------------------------

/// A directory plus a file-name template holding at most one [`WILDCARD`].
///
/// `.cursor/rules/*.mdc` parses to dir `.cursor/rules`, prefix `""`,
/// suffix `".mdc"`. A template without wildcard (`rules/AGENTS.md`) names a
/// single file whose stem is the name minus its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePattern {
    dir: PathBuf,
    file_name: String,
    wildcard: Option<(String, String)>,
}

impl FilePattern {
    pub fn parse(pattern: impl AsRef<Path>) -> Result<Self, PatternError> {
        let pattern = pattern.as_ref();
        let file_name = pattern
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or(PatternError::MissingFileName)?
            .to_string();
        let dir = clean(pattern.parent().unwrap_or_else(|| Path::new("")));
        if dir.to_string_lossy().contains(WILDCARD) {
            return Err(PatternError::WildcardInDirectory);
        }

        let wildcard = match file_name.matches(WILDCARD).count() {
            0 => None,
            1 => file_name
                .split_once(WILDCARD)
                .map(|(prefix, suffix)| (prefix.to_string(), suffix.to_string())),
            _ => return Err(PatternError::MultipleWildcards),
        };

        Ok(Self {
            dir,
            file_name,
            wildcard,
        })
    }

    /// Normalised parent directory of every file this pattern names.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The raw file-name template.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Literal `(prefix, suffix)` around the wildcard, if there is one.
    pub fn wildcard(&self) -> Option<(&str, &str)> {
        self.wildcard
            .as_ref()
            .map(|(prefix, suffix)| (prefix.as_str(), suffix.as_str()))
    }

    /// Full pattern path, suitable for glob expansion.
    pub fn to_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// The same pattern with a relative directory joined onto `root`.
    pub fn rooted_at(&self, root: &Path) -> Self {
        Self {
            dir: clean(&root.join(&self.dir)),
            file_name: self.file_name.clone(),
            wildcard: self.wildcard.clone(),
        }
    }
}

impl fmt::Display for FilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path().display())
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// One configured assistant with its file naming convention.
///
/// Immutable once the configuration is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub name: AgentName,
    pub context: Option<PathBuf>,
    pub ignore: Option<PathBuf>,
    pub rules: Option<FilePattern>,
    pub commands: Option<FilePattern>,
    pub dialect: Dialect,
}

impl Agent {
    /// An agent with nothing configured and the dialect implied by its name.
    pub fn new(name: impl Into<AgentName>) -> Self {
        let name = name.into();
        let dialect = Dialect::for_agent_name(&name.0);
        Self {
            name,
            context: None,
            ignore: None,
            rules: None,
            commands: None,
            dialect,
        }
    }

    pub fn with_context(mut self, path: impl Into<PathBuf>) -> Self {
        self.context = Some(path.into());
        self
    }

    pub fn with_ignore(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore = Some(path.into());
        self
    }

    pub fn with_rules(mut self, pattern: impl AsRef<Path>) -> Result<Self, PatternError> {
        self.rules = Some(FilePattern::parse(pattern)?);
        Ok(self)
    }

    pub fn with_commands(mut self, pattern: impl AsRef<Path>) -> Result<Self, PatternError> {
        self.commands = Some(FilePattern::parse(pattern)?);
        Ok(self)
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Fixed path for a single-file kind.
    pub fn path(&self, kind: Kind) -> Option<&Path> {
        match kind {
            Kind::Context => self.context.as_deref(),
            Kind::Ignore => self.ignore.as_deref(),
            Kind::Rules | Kind::Commands => None,
        }
    }

    /// Pattern for a pattern-based kind.
    pub fn pattern(&self, kind: Kind) -> Option<&FilePattern> {
        match kind {
            Kind::Rules => self.rules.as_ref(),
            Kind::Commands => self.commands.as_ref(),
            Kind::Context | Kind::Ignore => None,
        }
    }

    /// Resolve every relative path and pattern against `root`.
    pub fn rooted_at(&self, root: &Path) -> Self {
        Self {
            name: self.name.clone(),
            context: self.context.as_ref().map(|p| clean(&root.join(p))),
            ignore: self.ignore.as_ref().map(|p| clean(&root.join(p))),
            rules: self.rules.as_ref().map(|p| p.rooted_at(root)),
            commands: self.commands.as_ref().map(|p| p.rooted_at(root)),
            dialect: self.dialect,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
