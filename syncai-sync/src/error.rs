//! Error types for syncai-sync.

use std::path::PathBuf;

use thiserror::Error;

use syncai_renderer::RenderError;

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The file that triggered the pass could not be read.
    #[error("failed to read changed file {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: RenderError,
    },

    /// A destination could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A destination could not be removed.
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rules/commands pattern could not be expanded.
    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A failed sync or delete pass, with the paths it already touched.
///
/// Passes are not transactional: writes and removals committed before the
/// failure stay on disk and are listed in `touched`.
#[derive(Debug, Error)]
#[error("pass failed after touching {} path(s): {source}", .touched.len())]
pub struct PassError {
    pub touched: Vec<PathBuf>,
    #[source]
    pub source: SyncError,
}

impl From<SyncError> for PassError {
    fn from(source: SyncError) -> Self {
        Self {
            touched: Vec::new(),
            source,
        }
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn write_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Write {
        path: path.into(),
        source,
    }
}
