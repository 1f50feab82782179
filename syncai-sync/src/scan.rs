//! Initial reconciliation and change detection by content hash.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use crate::discover::discover;
use crate::engine::SyncEngine;
use crate::error::{PassError, SyncError};
use crate::matcher::ArtifactKey;
use crate::state::{hash_file, FileState};

/// What one initial sync or scan did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Files a sync pass was run from.
    pub synced: Vec<PathBuf>,
    /// Destinations written by those passes.
    pub written: Vec<PathBuf>,
    /// Files whose removal was observed or propagated.
    pub deleted: Vec<PathBuf>,
    /// Passes that failed; their partial progress is still listed.
    pub failures: usize,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.synced.is_empty() && self.deleted.is_empty() && self.failures == 0
    }
}

/// The newest existing file of every artifact, ordered by kind then stem.
///
/// Ties on modification time keep the first file discovered.
pub fn newest_sources(engine: &SyncEngine) -> Result<Vec<PathBuf>, SyncError> {
    let mut newest: BTreeMap<ArtifactKey, (PathBuf, SystemTime)> = BTreeMap::new();
    for path in discover(engine.agents())? {
        let Some(identity) = engine.identify(&path) else {
            continue;
        };
        let modified = match std::fs::metadata(&path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(err) => {
                tracing::warn!("skipping {}: {err}", path.display());
                continue;
            }
        };
        match newest.get(&identity.key()) {
            Some((_, current)) if *current >= modified => {}
            _ => {
                newest.insert(identity.key(), (path, modified));
            }
        }
    }
    Ok(newest.into_values().map(|(path, _)| path).collect())
}

/// Keeps a [`FileState`] in step with the filesystem and runs sync or
/// delete passes for whatever changed.
#[derive(Debug)]
pub struct Scanner {
    engine: SyncEngine,
    state: FileState,
}

impl Scanner {
    pub fn new(engine: SyncEngine) -> Self {
        Self {
            engine,
            state: FileState::new(),
        }
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn state(&self) -> &FileState {
        &self.state
    }

    /// Sync from the newest copy of every artifact, then record the hash of
    /// every managed file.
    pub fn initial_sync(&mut self) -> Result<ScanReport, SyncError> {
        let mut report = ScanReport::default();
        for source in newest_sources(&self.engine)? {
            let outcome = self.engine.sync(&source);
            report.synced.push(source);
            Self::record_pass(&mut report, outcome);
        }
        self.seed()?;
        tracing::info!(
            "initial sync: {} source(s), {} written, {} failed",
            report.synced.len(),
            report.written.len(),
            report.failures
        );
        Ok(report)
    }

    /// Record the current hash of every managed file without syncing.
    pub fn seed(&mut self) -> Result<(), SyncError> {
        self.state = FileState::new();
        for path in discover(self.engine.agents())? {
            if let Err(err) = self.state.refresh(&path) {
                tracing::warn!("cannot hash {}: {err}", path.display());
            }
        }
        Ok(())
    }

    /// Compare the filesystem with the recorded hashes and propagate every
    /// difference.
    ///
    /// New or modified files trigger a sync pass; files that disappeared
    /// trigger a delete pass. Destinations touched by a pass are re-hashed
    /// so they do not count as changes next time.
    pub fn scan(&mut self) -> Result<ScanReport, SyncError> {
        let mut report = ScanReport::default();
        let mut present: HashSet<PathBuf> = HashSet::new();

        for path in discover(self.engine.agents())? {
            let digest = match hash_file(&path) {
                Ok(digest) => digest,
                Err(err) => {
                    tracing::warn!("cannot hash {}: {err}", path.display());
                    continue;
                }
            };
            present.insert(path.clone());
            match self.state.insert(path.clone(), digest.clone()) {
                Some(previous) if previous == digest => continue,
                Some(_) => tracing::info!("detected change in {}", path.display()),
                None => tracing::info!("detected new file {}", path.display()),
            }

            let outcome = self.engine.sync(&path);
            report.synced.push(path);
            for touched in Self::record_pass(&mut report, outcome) {
                self.rehash(&touched);
                present.insert(touched);
            }
        }

        for path in self.state.paths() {
            if present.contains(&path) {
                continue;
            }
            self.state.remove(&path);
            tracing::info!("detected removal of {}", path.display());
            let outcome = self.engine.delete(&path);
            for removed in Self::record_deletion(&mut report, &path, outcome) {
                self.state.remove(&removed);
            }
        }
        Ok(report)
    }

    fn rehash(&mut self, path: &Path) {
        if let Err(err) = self.state.refresh(path) {
            tracing::warn!("cannot hash {}: {err}", path.display());
        }
    }

    /// Fold a sync outcome into `report`, returning the touched paths.
    fn record_pass(report: &mut ScanReport, outcome: Result<Vec<PathBuf>, PassError>) -> Vec<PathBuf> {
        let touched = match outcome {
            Ok(touched) => touched,
            Err(err) => {
                tracing::error!("{err}");
                report.failures += 1;
                err.touched
            }
        };
        report.written.extend(touched.iter().cloned());
        touched
    }

    /// Fold a delete outcome into `report`, returning the removed paths.
    fn record_deletion(
        report: &mut ScanReport,
        path: &Path,
        outcome: Result<Vec<PathBuf>, PassError>,
    ) -> Vec<PathBuf> {
        let removed = match outcome {
            Ok(removed) if removed.is_empty() => vec![path.to_path_buf()],
            Ok(removed) => removed,
            Err(err) => {
                tracing::error!("{err}");
                report.failures += 1;
                err.touched
            }
        };
        report.deleted.extend(removed.iter().cloned());
        removed
    }
}
