use crate::error::BatchError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Replace `target` with `content` via a temp file in the same directory
/// and a rename. The original file's permissions carry over.
pub fn atomic_write(target: &Path, content: &[u8]) -> Result<(), BatchError> {
    let write_error = |source| BatchError::WriteError {
        path: target.to_path_buf(),
        source,
    };

    let parent = target.parent().ok_or_else(|| {
        write_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "no parent directory",
        ))
    })?;

    let mut temp_file = NamedTempFile::new_in(parent).map_err(write_error)?;
    temp_file.write_all(content).map_err(write_error)?;
    temp_file.as_file().sync_all().map_err(write_error)?;

    if let Ok(metadata) = fs::metadata(target) {
        temp_file
            .as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_error)?;
    }

    temp_file.persist(target).map_err(|e| BatchError::RenameError {
        path: target.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}

/// Copies of every file a run is about to overwrite.
pub struct FileBackupSet {
    backup_dir: tempfile::TempDir,
    backups: Vec<FileBackup>,
}

struct FileBackup {
    original_path: PathBuf,
    backup_path: PathBuf,
}

impl FileBackupSet {
    pub fn new() -> Result<Self, BatchError> {
        let backup_dir = tempfile::tempdir().map_err(BatchError::StagingError)?;
        Ok(Self {
            backup_dir,
            backups: Vec::new(),
        })
    }

    pub fn backup_file(&mut self, path: &Path) -> Result<(), BatchError> {
        let backup_path = self
            .backup_dir
            .path()
            .join(format!("backup_{}", self.backups.len()));

        fs::copy(path, &backup_path).map_err(|e| BatchError::BackupError {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.backups.push(FileBackup {
            original_path: path.to_path_buf(),
            backup_path,
        });
        Ok(())
    }

    /// Put every backed-up file back, most recent first. Stops at the first
    /// file that cannot be restored.
    pub fn restore_all(&self) -> Result<(), BatchError> {
        for backup in self.backups.iter().rev() {
            fs::copy(&backup.backup_path, &backup.original_path).map_err(|e| {
                BatchError::RollbackError {
                    path: backup.original_path.clone(),
                    source: e,
                }
            })?;
        }
        tracing::info!(files = self.backups.len(), "restored backups");
        Ok(())
    }

    /// Drop the backups after a successful run.
    pub fn discard(self) {
        tracing::debug!(files = self.backups.len(), "discarding backups");
    }

    pub fn backed_up_paths(&self) -> Vec<&Path> {
        self.backups
            .iter()
            .map(|b| b.original_path.as_path())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("LoginTest.java");
        fs::write(&target, "class Old {}").unwrap();
        atomic_write(&target, b"class New {}").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "class New {}");
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("A.java");
        fs::write(&target, "a").unwrap();
        atomic_write(&target, b"b").unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    #[cfg(unix)]
    fn test_atomic_write_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("A.java");
        fs::write(&target, "a").unwrap();
        fs::set_permissions(&target, fs::Permissions::from_mode(0o644)).unwrap();

        atomic_write(&target, b"b").unwrap();
        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_backup_and_restore_multiple_files() {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<_> = (0..4)
            .map(|i| {
                let path = dir.path().join(format!("File{i}Test.java"));
                fs::write(&path, format!("original_{i}")).unwrap();
                path
            })
            .collect();

        let mut backups = FileBackupSet::new().unwrap();
        for f in &files {
            backups.backup_file(f).unwrap();
        }
        assert_eq!(backups.backed_up_paths().len(), 4);

        for (i, f) in files.iter().enumerate() {
            fs::write(f, format!("modified_{i}")).unwrap();
        }

        backups.restore_all().unwrap();
        for (i, f) in files.iter().enumerate() {
            assert_eq!(fs::read_to_string(f).unwrap(), format!("original_{i}"));
        }
    }

    #[test]
    fn test_backup_of_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut backups = FileBackupSet::new().unwrap();
        let err = backups.backup_file(&dir.path().join("Gone.java")).unwrap_err();
        assert!(matches!(err, BatchError::BackupError { .. }));
    }

    #[test]
    fn test_discard_cleans_up_backup_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("A.java");
        fs::write(&file, "content").unwrap();

        let mut backups = FileBackupSet::new().unwrap();
        let backup_dir_path = backups.backup_dir.path().to_path_buf();
        backups.backup_file(&file).unwrap();

        assert!(backup_dir_path.exists());
        backups.discard();
        assert!(!backup_dir_path.exists());
    }
}
