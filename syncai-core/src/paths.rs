//! Lexical path normalisation.
//!
//! Paths are compared after [`clean`], never after canonicalisation: the
//! files they name do not have to exist.

use std::path::{Component, Path, PathBuf};

/// Lexically normalise `path`: drop `.` segments, fold `name/..` pairs and
/// collapse repeated separators. An empty result becomes `.`.
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`.
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}
