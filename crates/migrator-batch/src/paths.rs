use crate::error::BatchError;
use std::path::{Component, Path, PathBuf};

/// Resolve `relative` against the project root. The result must stay inside
/// the root after `.`/`..` are folded away; absolute inputs are held to the
/// same rule.
pub fn resolve_within_root(root: &Path, relative: &str) -> Result<PathBuf, BatchError> {
    let root = normalize_path(root);
    let candidate = normalize_path(&root.join(relative));
    let escapes = candidate.components().any(|c| c == Component::ParentDir);
    if candidate.starts_with(&root) && candidate != root && !escapes {
        Ok(candidate)
    } else {
        Err(BatchError::PathTraversal(PathBuf::from(relative)))
    }
}

/// Fold `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(Component::ParentDir),
            },
            Component::CurDir => {}
            other => components.push(other),
        }
    }
    components.iter().collect()
}

/// Root-relative path with `/` separators on every platform.
pub fn to_relative_string(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}
