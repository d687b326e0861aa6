use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    // Validation errors
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Not a Java source file: {0}")]
    NotJavaSource(String),

    #[error("Path escapes project root: {0}")]
    PathTraversal(PathBuf),

    #[error("Duplicate file in run: {0}")]
    DuplicatePath(String),

    #[error("No files to migrate")]
    EmptyTransaction,

    // Discovery
    #[error("Failed while walking {root}: {source}")]
    DiscoveryError {
        root: PathBuf,
        source: walkdir::Error,
    },

    // File system errors
    #[error("Failed to read file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to backup file {path}: {source}")]
    BackupError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Atomic rename failed for {path}: {source}")]
    RenameError {
        path: PathBuf,
        source: std::io::Error,
    },

    // Staging errors
    #[error("Staging area creation failed: {0}")]
    StagingError(std::io::Error),

    #[error("Staged content missing for {0}")]
    StagedContentMissing(String),

    // Rollback errors
    #[error("CRITICAL: Rollback failed for {path}: {source}. Manual intervention required.")]
    RollbackError {
        path: PathBuf,
        source: std::io::Error,
    },
}
