//! Find the Java sources of a project.

use crate::error::BatchError;
use crate::paths::to_relative_string;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Build output and dependency directories that never hold sources to migrate.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &["target", "build", "out", "node_modules"];

/// Every `*.java` file under `root`, as sorted root-relative paths.
///
/// Hidden entries (leading `.`) and directories named in `ignored_dirs` are
/// not descended into.
pub fn find_sources(root: &Path, ignored_dirs: &[&str]) -> Result<Vec<String>, BatchError> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_ignored(entry, ignored_dirs));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| BatchError::DiscoveryError {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() || !is_java(entry.path()) {
            continue;
        }
        if let Some(relative) = to_relative_string(root, entry.path()) {
            files.push(relative);
        }
    }

    files.sort();
    tracing::debug!(root = %root.display(), count = files.len(), "discovered sources");
    Ok(files)
}

pub fn is_java(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("java")
}

fn is_ignored(entry: &DirEntry, ignored_dirs: &[&str]) -> bool {
    let Some(name) = entry.file_name().to_str() else {
        return false;
    };
    name.starts_with('.') || (entry.file_type().is_dir() && ignored_dirs.contains(&name))
}
