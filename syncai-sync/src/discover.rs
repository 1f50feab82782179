//! Enumerate the managed files that currently exist.

use std::collections::HashSet;
use std::path::{PathBuf, MAIN_SEPARATOR};

use glob::Pattern;

use syncai_core::types::WILDCARD;
use syncai_core::{Agent, FilePattern, Kind};

use crate::error::SyncError;
use crate::matcher::stem_of;

/// Every existing file any agent manages, in configuration order.
///
/// Pattern expansions are sorted by glob; each path appears once.
pub fn discover(agents: &[Agent]) -> Result<Vec<PathBuf>, SyncError> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for agent in agents {
        for &kind in Kind::all() {
            let candidates = match (agent.path(kind), agent.pattern(kind)) {
                (Some(path), _) => vec![path.to_path_buf()],
                (None, Some(pattern)) => expand(pattern)?,
                (None, None) => continue,
            };
            for path in candidates {
                if path.is_file() && seen.insert(path.clone()) {
                    found.push(path);
                }
            }
        }
    }
    tracing::debug!("discovered {} managed file(s)", found.len());
    Ok(found)
}

/// Files in the pattern's directory that the pattern matches.
fn expand(pattern: &FilePattern) -> Result<Vec<PathBuf>, SyncError> {
    let wildcard = WILDCARD.to_string();
    let glob_text = format!(
        "{}{MAIN_SEPARATOR}{}",
        Pattern::escape(&pattern.dir().to_string_lossy()),
        pattern
            .file_name()
            .split(WILDCARD)
            .map(Pattern::escape)
            .collect::<Vec<_>>()
            .join(wildcard.as_str())
    );
    let entries = glob::glob(&glob_text).map_err(|source| SyncError::Glob {
        pattern: glob_text.clone(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if stem_of(pattern, &path).is_some() => paths.push(path),
            Ok(_) => {}
            Err(err) => tracing::warn!("skipping unreadable entry: {err}"),
        }
    }
    Ok(paths)
}
