//! Watch runtime: periodic scans, optional filesystem events, ctrl-c.

mod error;
pub mod paths;
mod runtime;

pub use error::DaemonError;
pub use runtime::{init_tracing, run, start_blocking, WatchOptions};
