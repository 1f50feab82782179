//! # syncai-renderer
//!
//! Reads agent files into [`Document`]s, merges their front matter into
//! [`RulesMetadata`], and renders that metadata back out in each agent's
//! [`Dialect`](syncai_core::Dialect).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use syncai_core::{Dialect, Kind};
//! use syncai_renderer::{render_artifact, Document, RulesMetadata};
//!
//! fn regenerate(path: &Path) -> Option<Vec<u8>> {
//!     let doc = Document::load(path).ok()?;
//!     let metadata = RulesMetadata::merge([&doc]);
//!     Some(render_artifact(Dialect::ApplyTo, Kind::Rules, &metadata, &doc.body))
//! }
//! ```

pub mod dialect;
pub mod document;
pub mod error;
pub mod metadata;

pub use dialect::{quote_scalar, render_artifact, FrontMatterGenerator};
pub use document::{split_front_matter, Document, Metadata};
pub use error::{FrontMatterError, RenderError};
pub use metadata::RulesMetadata;
