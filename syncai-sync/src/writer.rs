//! Atomic destination writes.
//!
//! ## `atomic_write` protocol
//!
//! 1. Compare with the bytes on disk; skip if identical.
//! 2. Create a temporary file (`.syncai-*`) in the destination directory.
//! 3. Write, flush and fsync the temporary file.
//! 4. Set permissions to `0644`.
//! 5. Rename over the destination (atomic on POSIX).
//! 6. Fsync the directory so the rename is durable.
//!
//! Any failure before step 5 drops the temporary file, which removes it.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{write_err, SyncError};

/// Prefix of temporary files created next to destinations.
pub const TMP_PREFIX: &str = ".syncai-";

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped; the bytes on disk already match.
    Unchanged { path: PathBuf },
    /// Dry-run mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }

    /// `true` unless the destination was already up to date.
    pub fn is_change(&self) -> bool {
        !matches!(self, WriteResult::Unchanged { .. })
    }
}

/// Replace the contents of `path` with `content`, atomically.
///
/// Writing bytes identical to what is on disk is a no-op. Missing parent
/// directories are created.
pub fn atomic_write(path: &Path, content: &[u8], dry_run: bool) -> Result<WriteResult, SyncError> {
    if is_unchanged(path, content) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| write_err(dir, e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(TMP_PREFIX)
        .tempfile_in(dir)
        .map_err(|e| write_err(path, e))?;
    tmp.write_all(content).map_err(|e| write_err(path, e))?;
    tmp.as_file().sync_all().map_err(|e| write_err(path, e))?;
    set_file_mode(tmp.path()).map_err(|e| write_err(path, e))?;
    tmp.persist(path).map_err(|e| write_err(path, e.error))?;
    sync_dir(dir);

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

/// Remove `path`. Returns `false` when it was already absent.
pub fn remove_if_present(path: &Path) -> std::io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

fn is_unchanged(path: &Path, content: &[u8]) -> bool {
    match std::fs::read(path) {
        Ok(existing) => existing == content,
        Err(err) if err.kind() == ErrorKind::NotFound => false,
        Err(err) => {
            tracing::debug!("cannot compare {}: {err}; rewriting", path.display());
            false
        }
    }
}

#[cfg(unix)]
fn set_file_mode(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_file_mode(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(err) = std::fs::File::open(dir).and_then(|d| d.sync_all()) {
        tracing::debug!("fsync of {} failed: {err}", dir.display());
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn leftovers(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .expect("read_dir")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with(TMP_PREFIX))
            .collect()
    }

    #[test]
    fn writes_new_file_and_creates_parents() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("nested/dir/rule.md");
        let result = atomic_write(&path, b"hello", false).expect("write");
        assert_eq!(result, WriteResult::Written { path: path.clone() });
        assert_eq!(std::fs::read(&path).expect("read"), b"hello");
        assert!(leftovers(path.parent().expect("parent")).is_empty());
    }

    #[test]
    fn identical_bytes_are_not_rewritten() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("rule.md");
        std::fs::write(&path, b"same").expect("seed");
        let before = std::fs::metadata(&path).expect("meta").modified().expect("mtime");
        let result = atomic_write(&path, b"same", false).expect("write");
        assert!(!result.is_change());
        let after = std::fs::metadata(&path).expect("meta").modified().expect("mtime");
        assert_eq!(before, after);
    }

    #[test]
    fn dry_run_reports_without_writing() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("rule.md");
        let result = atomic_write(&path, b"x", true).expect("write");
        assert_eq!(result, WriteResult::WouldWrite { path: path.clone() });
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn written_files_are_world_readable() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("rule.md");
        atomic_write(&path, b"x", false).expect("write");
        let mode = std::fs::metadata(&path).expect("meta").permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn failed_rename_leaves_no_temporary_file() {
        let tmp = TempDir::new().expect("tmp");
        // A non-empty directory cannot be replaced by a file.
        let path = tmp.path().join("taken");
        std::fs::create_dir_all(path.join("child")).expect("dir");
        let err = atomic_write(&path, b"x", false).unwrap_err();
        assert!(matches!(err, SyncError::Write { .. }));
        assert!(leftovers(tmp.path()).is_empty());
    }

    #[test]
    fn remove_reports_absence() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("gone.md");
        assert!(!remove_if_present(&path).expect("remove"));
        std::fs::write(&path, b"x").expect("seed");
        assert!(remove_if_present(&path).expect("remove"));
        assert!(!path.exists());
    }
}
