//! Error types for syncai-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from reading or rendering documents.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Filesystem error while loading a document.
    #[error("document io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    /// `true` when the document simply does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            RenderError::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
        }
    }
}

/// Front matter was delimited but could not be used as metadata.
#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("front matter is not valid UTF-8")]
    NotUtf8,

    #[error("front matter is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("front matter is not a mapping")]
    NotAMapping,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}
