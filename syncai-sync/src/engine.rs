//! Sync and delete orchestration.
//!
//! A sync pass runs in two phases. The read phase identifies the changed
//! file, loads every agent's copy of the same artifact into a
//! [`DocumentStack`] and renders one output per destination. The write phase
//! commits those outputs through [`atomic_write`]. Nothing is written when the
//! read phase fails.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use syncai_core::paths::clean;
use syncai_core::Agent;
use syncai_renderer::Document;

use crate::error::{PassError, SyncError};
use crate::matcher::{generate_path, identify, Identity};
use crate::stack::DocumentStack;
use crate::writer::{atomic_write, remove_if_present, WriteResult};

/// A rendered destination that differs from what is on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite {
    pub path: PathBuf,
    pub content: Vec<u8>,
}

/// Propagates changes between the copies each agent keeps of an artifact.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    agents: Vec<Agent>,
    dry_run: bool,
}

impl SyncEngine {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self {
            agents,
            dry_run: false,
        }
    }

    /// Report writes and removals instead of performing them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn identify(&self, path: &Path) -> Option<Identity<'_>> {
        identify(&self.agents, path)
    }

    // -----------------------------------------------------------------------
    // Sync
    // -----------------------------------------------------------------------

    /// Propagate `changed` to every other agent.
    ///
    /// Returns the destinations whose bytes changed (or would change, in
    /// dry-run mode). Unrecognised paths yield an empty list.
    pub fn sync(&self, changed: &Path) -> Result<Vec<PathBuf>, PassError> {
        let results = self.sync_detailed(changed)?;
        Ok(results
            .into_iter()
            .filter(WriteResult::is_change)
            .map(|r| r.path().to_path_buf())
            .collect())
    }

    /// Like [`SyncEngine::sync`] but reports every destination, unchanged
    /// ones included.
    pub fn sync_detailed(&self, changed: &Path) -> Result<Vec<WriteResult>, PassError> {
        let outputs = self.render_pass(changed)?;

        let mut results = Vec::with_capacity(outputs.len());
        let mut touched = Vec::new();
        for (path, content) in outputs {
            match atomic_write(&path, &content, self.dry_run) {
                Ok(result) => {
                    if result.is_change() {
                        touched.push(path);
                    }
                    results.push(result);
                }
                Err(source) => return Err(PassError { touched, source }),
            }
        }
        Ok(results)
    }

    /// Destinations a sync of `changed` would rewrite, with their new bytes.
    ///
    /// Never writes.
    pub fn plan(&self, changed: &Path) -> Result<Vec<PlannedWrite>, SyncError> {
        let outputs = self.render_pass(changed)?;
        Ok(outputs
            .into_iter()
            .filter(|(path, content)| std::fs::read(path).map_or(true, |on_disk| on_disk != *content))
            .map(|(path, content)| PlannedWrite { path, content })
            .collect())
    }

    /// Read phase: one rendered output per destination.
    fn render_pass(&self, changed: &Path) -> Result<Vec<(PathBuf, Vec<u8>)>, SyncError> {
        let Some(identity) = self.identify(changed) else {
            tracing::debug!("{} is not a managed file; skipping", changed.display());
            return Ok(Vec::new());
        };
        tracing::info!(
            "syncing {} {} '{}' from {}",
            identity.agent.name,
            identity.kind,
            identity.stem,
            changed.display()
        );

        let stack = self.build_stack(&identity, changed)?;
        let mut outputs = Vec::new();
        for (agent, path) in self.destinations(&identity, changed) {
            if let Some(content) = stack.render(agent.dialect) {
                outputs.push((path, content));
            }
        }
        Ok(outputs)
    }

    fn build_stack(&self, identity: &Identity<'_>, changed: &Path) -> Result<DocumentStack, SyncError> {
        let mut stack = DocumentStack::new(identity.kind, changed);
        let source = Document::load(changed).map_err(|source| SyncError::SourceRead {
            path: changed.to_path_buf(),
            source,
        })?;
        stack.push(source);

        let changed = clean(changed);
        let mut seen = HashSet::from([changed.clone()]);
        for agent in &self.agents {
            let Some(path) = generate_path(agent, identity.kind, &identity.stem) else {
                continue;
            };
            if !seen.insert(path.clone()) {
                continue;
            }
            match Document::load(&path) {
                Ok(document) => stack.push(document),
                Err(err) if err.is_not_found() => {}
                Err(err) => tracing::warn!("skipping unreadable sibling: {err}"),
            }
        }
        Ok(stack)
    }

    /// Every other agent's path for the artifact, without duplicates and
    /// never the changed path itself.
    fn destinations<'a>(&'a self, identity: &Identity<'_>, changed: &Path) -> Vec<(&'a Agent, PathBuf)> {
        let mut seen = HashSet::from([clean(changed)]);
        self.agents
            .iter()
            .filter(|agent| !agent.name.matches(&identity.agent.name.0))
            .filter_map(|agent| {
                generate_path(agent, identity.kind, &identity.stem).map(|path| (agent, path))
            })
            .filter(|(_, path)| seen.insert(path.clone()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Propagate the removal of `path`.
    ///
    /// Returns `path` followed by every sibling actually removed. Only
    /// pattern kinds propagate; context and ignore files are left alone.
    /// Unrecognised paths yield an empty list.
    pub fn delete(&self, path: &Path) -> Result<Vec<PathBuf>, PassError> {
        let Some(identity) = self.identify(path) else {
            return Ok(Vec::new());
        };
        let mut removed = vec![path.to_path_buf()];
        if !identity.kind.propagates_deletion() {
            tracing::info!(
                "{} removed; {} files do not propagate deletion",
                path.display(),
                identity.kind
            );
            return Ok(removed);
        }

        for (agent, sibling) in self.destinations(&identity, path) {
            if self.dry_run {
                if sibling.exists() {
                    tracing::info!("[dry-run] would remove: {}", sibling.display());
                    removed.push(sibling);
                }
                continue;
            }
            match remove_if_present(&sibling) {
                Ok(true) => {
                    tracing::info!("removed {} copy: {}", agent.name, sibling.display());
                    removed.push(sibling);
                }
                Ok(false) => tracing::debug!("already absent: {}", sibling.display()),
                Err(source) => {
                    return Err(PassError {
                        touched: removed,
                        source: SyncError::Remove {
                            path: sibling,
                            source,
                        },
                    })
                }
            }
        }
        Ok(removed)
    }
}
