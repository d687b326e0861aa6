use crate::discover::is_java;
use crate::error::BatchError;
use crate::paths::resolve_within_root;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A file accepted into a run, with its resolved absolute path.
#[derive(Debug, Clone)]
pub struct ValidatedFile {
    pub absolute_path: PathBuf,
    pub relative_path: String,
}

/// Check every requested file before anything is read: inside the root,
/// existing, a `.java` source, and listed once.
pub fn validate_files(
    project_root: &Path,
    files: &[String],
) -> Result<Vec<ValidatedFile>, BatchError> {
    if files.is_empty() {
        return Err(BatchError::EmptyTransaction);
    }

    let mut seen = HashSet::new();
    let mut validated = Vec::with_capacity(files.len());
    for relative in files {
        let absolute_path = resolve_within_root(project_root, relative)?;
        if !is_java(&absolute_path) {
            return Err(BatchError::NotJavaSource(relative.clone()));
        }
        if !absolute_path.is_file() {
            return Err(BatchError::FileNotFound(absolute_path));
        }
        if !seen.insert(absolute_path.clone()) {
            return Err(BatchError::DuplicatePath(relative.clone()));
        }
        validated.push(ValidatedFile {
            absolute_path,
            relative_path: relative.clone(),
        });
    }
    Ok(validated)
}
