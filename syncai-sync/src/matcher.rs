//! Path classification and generation.
//!
//! [`identify`] maps a concrete path to the agent, kind and stem it belongs
//! to; [`generate_path`] is its inverse for a given agent.

use std::path::{Path, PathBuf};

use syncai_core::paths::clean;
use syncai_core::{Agent, FilePattern, Kind};

/// The logical artifact a path belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity<'a> {
    pub agent: &'a Agent,
    pub kind: Kind,
    /// Empty for single-file kinds.
    pub stem: String,
}

impl Identity<'_> {
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey {
            kind: self.kind,
            stem: self.stem.clone(),
        }
    }
}

/// Agent-independent identity of a logical artifact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactKey {
    pub kind: Kind,
    pub stem: String,
}

/// Classify `path` against `agents`.
///
/// Agents are tried in configuration order and, per agent, kinds in
/// [`Kind::all`] order; the first match wins. Paths are compared after
/// lexical normalisation.
pub fn identify<'a>(agents: &'a [Agent], path: &Path) -> Option<Identity<'a>> {
    let path = clean(path);
    agents.iter().find_map(|agent| {
        Kind::all().iter().find_map(|&kind| {
            match_kind(agent, kind, &path).map(|stem| Identity { agent, kind, stem })
        })
    })
}

fn match_kind(agent: &Agent, kind: Kind, path: &Path) -> Option<String> {
    if let Some(fixed) = agent.path(kind) {
        return (clean(fixed) == path).then(String::new);
    }
    stem_of(agent.pattern(kind)?, path)
}

/// Stem of `path` under `pattern`, or `None` when it does not match.
///
/// With a wildcard the stem is whatever the wildcard covers and must be
/// non-empty. Without one the file name must equal the template exactly and
/// the stem is that name minus its extension.
pub fn stem_of(pattern: &FilePattern, path: &Path) -> Option<String> {
    let parent = clean(path.parent()?);
    if parent != pattern.dir() {
        return None;
    }
    let file_name = path.file_name()?.to_str()?;
    match pattern.wildcard() {
        Some((prefix, suffix)) => {
            let stem = file_name.strip_prefix(prefix)?.strip_suffix(suffix)?;
            (!stem.is_empty()).then(|| stem.to_string())
        }
        None if file_name == pattern.file_name() => Path::new(file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string),
        None => None,
    }
}

/// Path `agent` keeps for the artifact `(kind, stem)`.
///
/// `None` when the agent does not configure `kind`. `stem` is ignored for
/// single-file kinds.
pub fn generate_path(agent: &Agent, kind: Kind, stem: &str) -> Option<PathBuf> {
    if let Some(fixed) = agent.path(kind) {
        return Some(clean(fixed));
    }
    let pattern = agent.pattern(kind)?;
    Some(pattern.dir().join(file_name_for(pattern, stem)))
}

fn file_name_for(pattern: &FilePattern, stem: &str) -> String {
    match pattern.wildcard() {
        Some((prefix, suffix)) => format!("{prefix}{stem}{suffix}"),
        None => match Path::new(pattern.file_name())
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem.to_string(),
        },
    }
}
