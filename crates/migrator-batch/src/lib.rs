//! Project-wide migration runs.
//!
//! A run is one undoable unit: every file is migrated in memory and staged,
//! then written with backups held until the run commits.

pub mod discover;
pub mod error;
pub mod file_ops;
pub mod file_set;
pub mod paths;
pub mod staging;
pub mod transaction;
pub mod types;

pub use error::BatchError;
pub use transaction::Transaction;
pub use types::{FileReport, MigrateInput, MigrateResult, MigrateStatus};

use discover::{find_sources, DEFAULT_IGNORED_DIRS};
use std::path::Path;
use types::MigrateErrorDetail;

/// Migrate `input.files`, or every discovered Java source under `root`.
///
/// Validation and discovery problems are errors. Per-file migration
/// failures and a rolled-back write are reported in the result.
pub fn run(root: &Path, input: &MigrateInput) -> Result<MigrateResult, BatchError> {
    let files = match &input.files {
        Some(files) => files.clone(),
        None => find_sources(root, DEFAULT_IGNORED_DIRS)?,
    };
    if files.is_empty() {
        tracing::info!(root = %root.display(), "no Java sources found");
        return Ok(MigrateResult::empty(input.dry_run()));
    }

    let staged = Transaction::new(root.to_path_buf(), &files, input)?.stage()?;

    if staged.has_failures() && staged.rollback_on_failure() {
        tracing::warn!(
            failed = staged.errors().len(),
            "aborting run; nothing written"
        );
        return Ok(staged.into_result(MigrateStatus::Aborted));
    }

    if input.dry_run() || !staged.has_changes() {
        let status = if staged.has_failures() {
            MigrateStatus::Partial
        } else if staged.has_changes() {
            MigrateStatus::Success
        } else {
            MigrateStatus::NoChanges
        };
        return Ok(staged.into_result(status));
    }

    let reports = staged.reports().to_vec();
    let mut errors = staged.errors().to_vec();
    let files_scanned = files.len();

    match staged.apply() {
        Ok(applied) => {
            for path in applied.affected_files() {
                tracing::debug!(path = %path.display(), "written");
            }
            Ok(applied.commit().into_result())
        }
        Err(e @ BatchError::RollbackError { .. }) => Err(e),
        Err(e) => {
            errors.push(MigrateErrorDetail::new(None, "apply", e.to_string()));
            Ok(MigrateResult {
                status: MigrateStatus::RolledBack,
                dry_run: false,
                files_scanned,
                files_modified: Vec::new(),
                files: reports,
                errors,
                rolled_back: true,
            })
        }
    }
}
