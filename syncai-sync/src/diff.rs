//! Dry-run unified diff support for `syncai diff`.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use crate::engine::SyncEngine;
use crate::error::{io_err, SyncError};
use crate::scan::newest_sources;

/// A single pending destination diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    /// Newest copy the destination would be rendered from.
    pub source: PathBuf,
    pub unified_diff: String,
}

/// Render what an initial sync would write and compare it to the current
/// on-disk content. Headers are shown relative to `root`.
///
/// No files are written.
pub fn diff_pending(engine: &SyncEngine, root: &Path) -> Result<Vec<FileDiff>, SyncError> {
    let mut diffs = Vec::new();
    let mut seen = HashSet::new();
    for source in newest_sources(engine)? {
        for planned in engine.plan(&source)? {
            if !seen.insert(planned.path.clone()) {
                continue;
            }
            let existing = read_existing_or_empty(&planned.path)?;
            let rendered = String::from_utf8_lossy(&planned.content);

            let relative = planned.path.strip_prefix(root).unwrap_or(planned.path.as_path());
            let old_header = format!("a/{}", relative.display());
            let new_header = format!("b/{}", relative.display());
            let unified = TextDiff::from_lines(existing.as_str(), &*rendered)
                .unified_diff()
                .header(&old_header, &new_header)
                .context_radius(3)
                .to_string();

            diffs.push(FileDiff {
                path: planned.path,
                source: source.clone(),
                unified_diff: unified,
            });
        }
    }
    Ok(diffs)
}

fn read_existing_or_empty(path: &Path) -> Result<String, SyncError> {
    match std::fs::read(path) {
        Ok(content) => Ok(String::from_utf8_lossy(&content).into_owned()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncai_core::Agent;
    use tempfile::TempDir;

    #[test]
    fn reports_missing_destination_as_additions() {
        let tmp = TempDir::new().expect("tmp");
        let root = tmp.path();
        std::fs::write(root.join("AGENTS.md"), "shared context\n").expect("write");
        let engine = SyncEngine::new(vec![
            Agent::new("a").with_context("AGENTS.md").rooted_at(root),
            Agent::new("b").with_context("CLAUDE.md").rooted_at(root),
        ]);

        let diffs = diff_pending(&engine, root).expect("diff");
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path, root.join("CLAUDE.md"));
        assert!(diffs[0].unified_diff.contains("+++ b/CLAUDE.md"));
        assert!(diffs[0].unified_diff.contains("+shared context"));
        assert!(!root.join("CLAUDE.md").exists(), "diff never writes");
    }

    #[test]
    fn in_sync_tree_has_no_diffs() {
        let tmp = TempDir::new().expect("tmp");
        let root = tmp.path();
        std::fs::write(root.join("AGENTS.md"), "same\n").expect("write");
        std::fs::write(root.join("CLAUDE.md"), "same\n").expect("write");
        let engine = SyncEngine::new(vec![
            Agent::new("a").with_context("AGENTS.md").rooted_at(root),
            Agent::new("b").with_context("CLAUDE.md").rooted_at(root),
        ]);
        assert!(diff_pending(&engine, root).expect("diff").is_empty());
    }
}
