//! Content-hash table used to detect changes between scans.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{io_err, SyncError};

/// Hex-encoded SHA-256 of `data`.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Hex-encoded SHA-256 of the file at `path`.
pub fn hash_file(path: &Path) -> Result<String, SyncError> {
    let data = std::fs::read(path).map_err(|e| io_err(path, e))?;
    Ok(hash_bytes(&data))
}

/// Last known digest of every managed file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileState {
    files: HashMap<PathBuf, String>,
}

impl FileState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Record `digest` for `path`, returning the previous digest.
    pub fn insert(&mut self, path: PathBuf, digest: String) -> Option<String> {
        self.files.insert(path, digest)
    }

    pub fn remove(&mut self, path: &Path) -> Option<String> {
        self.files.remove(path)
    }

    /// Re-hash `path` from disk.
    pub fn refresh(&mut self, path: &Path) -> Result<(), SyncError> {
        let digest = hash_file(path)?;
        self.files.insert(path.to_path_buf(), digest);
        Ok(())
    }

    /// Tracked paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
