//! # syncai-sync
//!
//! Keeps every agent's copy of an artifact consistent.
//!
//! - [`matcher`]: classify a path ([`identify`]) and compute sibling paths
//!   ([`generate_path`])
//! - [`engine`]: [`SyncEngine::sync`] and [`SyncEngine::delete`] passes
//! - [`writer`]: atomic, idempotent destination writes
//! - [`scan`]: initial reconciliation and hash-based change detection
//! - [`diff`]: pending changes as unified diffs
//!
//! ```no_run
//! use std::path::Path;
//! use syncai_sync::SyncEngine;
//!
//! let config = syncai_core::config::load(Path::new("syncai.json"))?;
//! let engine = SyncEngine::new(config.agents);
//! let touched = engine.sync(Path::new(".cursor/rules/style.mdc"))?;
//! println!("updated {} file(s)", touched.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod diff;
pub mod discover;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod scan;
pub mod stack;
pub mod state;
pub mod writer;

pub use diff::{diff_pending, FileDiff};
pub use discover::discover;
pub use engine::{PlannedWrite, SyncEngine};
pub use error::{PassError, SyncError};
pub use matcher::{generate_path, identify, ArtifactKey, Identity};
pub use scan::{newest_sources, ScanReport, Scanner};
pub use stack::DocumentStack;
pub use state::FileState;
pub use writer::{atomic_write, WriteResult};
