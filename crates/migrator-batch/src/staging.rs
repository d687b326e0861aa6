use crate::error::BatchError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory mirroring the project layout. Migrated files land
/// here first so the working tree is only touched once every file has been
/// migrated and verified.
pub struct StagingArea {
    temp_dir: TempDir,
    staged_files: Vec<StagedFile>,
}

#[derive(Debug)]
pub struct StagedFile {
    pub relative_path: String,
    pub staged_path: PathBuf,
    pub content: String,
}

impl StagingArea {
    pub fn new() -> Result<Self, BatchError> {
        let temp_dir = TempDir::new().map_err(BatchError::StagingError)?;
        Ok(Self {
            temp_dir,
            staged_files: Vec::new(),
        })
    }

    /// Record the migrated content of `relative_path`.
    pub fn stage(&mut self, relative_path: &str, content: &str) -> Result<(), BatchError> {
        let staged_path = self.temp_dir.path().join(relative_path);
        if let Some(parent) = staged_path.parent() {
            fs::create_dir_all(parent).map_err(BatchError::StagingError)?;
        }
        fs::write(&staged_path, content).map_err(BatchError::StagingError)?;

        self.staged_files.push(StagedFile {
            relative_path: relative_path.to_string(),
            staged_path,
            content: content.to_string(),
        });
        Ok(())
    }

    pub fn read_staged(&self, relative_path: &str) -> Option<&str> {
        self.staged_files
            .iter()
            .find(|f| f.relative_path == relative_path)
            .map(|f| f.content.as_str())
    }

    pub fn staged_files(&self) -> &[StagedFile] {
        &self.staged_files
    }

    pub fn is_empty(&self) -> bool {
        self.staged_files.is_empty()
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}
