use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use syncai_core::{Agent, Kind};
use syncai_sync::writer::TMP_PREFIX;

pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Existing directories holding managed files, sorted and deduplicated.
///
/// Directories created later are not watched; the periodic scan still
/// covers them.
pub fn watch_dirs(agents: &[Agent]) -> Vec<PathBuf> {
    let mut dirs = BTreeSet::new();
    for agent in agents {
        for &kind in Kind::all() {
            let dir = match (agent.path(kind), agent.pattern(kind)) {
                (Some(path), _) => path.parent().map(Path::to_path_buf),
                (None, Some(pattern)) => Some(pattern.dir().to_path_buf()),
                (None, None) => None,
            };
            if let Some(dir) = dir.filter(|d| d.is_dir()) {
                dirs.insert(dir);
            }
        }
    }
    dirs.into_iter().collect()
}

/// Temporary files created by the atomic writer.
pub fn is_own_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(TMP_PREFIX))
}
