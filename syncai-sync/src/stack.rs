//! Per-artifact document stacks.

use std::path::{Path, PathBuf};

use syncai_core::paths::clean;
use syncai_core::{Dialect, Kind};
use syncai_renderer::{render_artifact, Document, RulesMetadata};

/// Every agent's copy of one logical artifact, oldest first.
///
/// The copy at the changed path always sorts last so that it is the newest
/// regardless of its timestamp; the rest are ordered by modification time.
/// Ties keep insertion order.
#[derive(Debug, Clone)]
pub struct DocumentStack {
    kind: Kind,
    changed_path: PathBuf,
    documents: Vec<Document>,
}

impl DocumentStack {
    pub fn new(kind: Kind, changed_path: &Path) -> Self {
        Self {
            kind,
            changed_path: clean(changed_path),
            documents: Vec::new(),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
        let changed = &self.changed_path;
        self.documents
            .sort_by_key(|doc| (clean(&doc.path) == *changed, doc.modified));
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The copy whose body wins.
    pub fn newest(&self) -> Option<&Document> {
        self.documents.last()
    }

    /// Metadata merged across the whole stack.
    pub fn metadata(&self) -> RulesMetadata {
        RulesMetadata::merge(&self.documents)
    }

    /// Bytes an agent speaking `dialect` should hold.
    pub fn render(&self, dialect: Dialect) -> Option<Vec<u8>> {
        let newest = self.newest()?;
        Some(render_artifact(
            dialect,
            self.kind,
            &self.metadata(),
            &newest.body,
        ))
    }
}
