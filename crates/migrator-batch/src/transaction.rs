use crate::error::BatchError;
use crate::file_ops::{atomic_write, FileBackupSet};
use crate::file_set::{validate_files, ValidatedFile};
use crate::staging::StagingArea;
use crate::types::{FileReport, MigrateErrorDetail, MigrateInput, MigrateResult, MigrateStatus};
use migrator_core::Registry;
use migrator_java::{migrate_source, JavaError, Scope};
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

// ── Typestate markers ──────────────────────────────────────────────

/// Files validated, nothing read yet.
pub struct Pending;

/// Every file migrated in memory; changed ones written to the staging area.
pub struct Staged;

/// Staged files written to the working tree, backups held.
pub struct Applied;

/// Backups discarded.
pub struct Committed;

/// Working tree restored from backups.
pub struct RolledBack;

// ── Transaction ────────────────────────────────────────────────────

pub struct Transaction<State = Pending> {
    project_root: PathBuf,
    files: Vec<ValidatedFile>,
    registry: Registry,
    scope: Scope,
    dry_run: bool,
    rollback_on_failure: bool,
    reports: Vec<FileReport>,
    errors: Vec<MigrateErrorDetail>,
    staging: Option<StagingArea>,
    backups: Option<FileBackupSet>,
    _state: PhantomData<State>,
}

impl<State> Transaction<State> {
    fn into_state<Next>(
        self,
        staging: Option<StagingArea>,
        backups: Option<FileBackupSet>,
    ) -> Transaction<Next> {
        Transaction {
            project_root: self.project_root,
            files: self.files,
            registry: self.registry,
            scope: self.scope,
            dry_run: self.dry_run,
            rollback_on_failure: self.rollback_on_failure,
            reports: self.reports,
            errors: self.errors,
            staging,
            backups,
            _state: PhantomData,
        }
    }

    fn build_result(self, status: MigrateStatus, written: bool) -> MigrateResult {
        let mut files_modified = Vec::new();
        let files: Vec<FileReport> = self
            .reports
            .into_iter()
            .map(|mut report| {
                report.written = written && report.migration.changed;
                if report.written {
                    files_modified.push(report.migration.file.clone());
                }
                report
            })
            .collect();

        MigrateResult {
            status,
            dry_run: self.dry_run,
            files_scanned: self.files.len(),
            files_modified,
            files,
            errors: self.errors,
            rolled_back: status == MigrateStatus::RolledBack,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn reports(&self) -> &[FileReport] {
        &self.reports
    }

    pub fn errors(&self) -> &[MigrateErrorDetail] {
        &self.errors
    }

    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn rollback_on_failure(&self) -> bool {
        self.rollback_on_failure
    }
}

// ── Pending → Staged ───────────────────────────────────────────────

impl Transaction<Pending> {
    /// Validate `files` (root-relative) and capture the run options.
    pub fn new(
        project_root: PathBuf,
        files: &[String],
        input: &MigrateInput,
    ) -> Result<Self, BatchError> {
        let files = validate_files(&project_root, files)?;
        Ok(Transaction {
            project_root,
            files,
            registry: input.registry(),
            scope: input.scope(),
            dry_run: input.dry_run(),
            rollback_on_failure: input.rollback_on_failure(),
            reports: Vec::new(),
            errors: Vec::new(),
            staging: None,
            backups: None,
            _state: PhantomData,
        })
    }

    /// Migrate every file in memory. Changed files are staged; files that
    /// fail to migrate are recorded as errors and left out.
    pub fn stage(mut self) -> Result<Transaction<Staged>, BatchError> {
        let mut staging = StagingArea::new()?;
        let mut class_found = false;

        for file in &self.files {
            let source =
                fs::read_to_string(&file.absolute_path).map_err(|e| BatchError::ReadError {
                    path: file.absolute_path.clone(),
                    source: e,
                })?;

            match migrate_source(&source, &file.relative_path, &self.registry, &self.scope) {
                Ok(migration) => {
                    class_found = true;
                    if migration.changed {
                        staging.stage(&file.relative_path, &migration.content)?;
                    }
                    self.reports.push(FileReport {
                        migration,
                        written: false,
                    });
                }
                // With several files, a missing class is only an error if no file has it.
                Err(JavaError::ClassNotFound { .. }) if self.files.len() > 1 => {
                    tracing::debug!(file = %file.relative_path, "class not in file");
                }
                Err(e) => {
                    tracing::warn!(file = %file.relative_path, "migration failed: {e}");
                    self.errors.push(MigrateErrorDetail::new(
                        Some(&file.relative_path),
                        "migrate",
                        e.to_string(),
                    ));
                }
            }
        }

        if let Scope::Class(name) = &self.scope {
            if !class_found && self.files.len() > 1 {
                self.errors.push(MigrateErrorDetail::new(
                    None,
                    "migrate",
                    format!("no class named '{name}' in any file"),
                ));
            }
        }

        tracing::info!(
            files = self.files.len(),
            staged = staging.staged_files().len(),
            failed = self.errors.len(),
            "staged migration"
        );
        Ok(self.into_state(Some(staging), None))
    }
}

// ── Staged → Applied ───────────────────────────────────────────────

impl Transaction<Staged> {
    pub fn has_changes(&self) -> bool {
        self.staging.as_ref().is_some_and(|staging| !staging.is_empty())
    }

    /// Write staged files to the working tree. Every target is backed up
    /// first; if any write fails the backups are restored before returning.
    pub fn apply(mut self) -> Result<Transaction<Applied>, BatchError> {
        let mut backups = FileBackupSet::new()?;
        let staging_area = self
            .staging
            .as_ref()
            .ok_or_else(|| BatchError::StagedContentMissing("<staging area>".to_string()))?;

        let targets: Vec<(&ValidatedFile, &str)> = self
            .files
            .iter()
            .filter_map(|file| {
                staging_area
                    .read_staged(&file.relative_path)
                    .map(|content| (file, content))
            })
            .collect();

        for (file, _) in &targets {
            backups.backup_file(&file.absolute_path)?;
        }

        for (file, content) in &targets {
            if let Err(e) = atomic_write(&file.absolute_path, content.as_bytes()) {
                tracing::error!("Write failed for {}, initiating rollback: {e}", file.relative_path);
                if let Err(restore) = backups.restore_all() {
                    tracing::error!("{restore}");
                    return Err(restore);
                }
                return Err(e);
            }
            tracing::debug!(file = %file.relative_path, "written");
        }

        let staging = self.staging.take();
        Ok(self.into_state(staging, Some(backups)))
    }

    /// Report without touching the working tree.
    pub fn into_result(self, status: MigrateStatus) -> MigrateResult {
        self.build_result(status, false)
    }
}

// ── Applied → Committed | RolledBack ───────────────────────────────

impl Transaction<Applied> {
    /// Absolute paths of every file written.
    pub fn affected_files(&self) -> Vec<PathBuf> {
        let Some(staging) = &self.staging else {
            return Vec::new();
        };
        self.files
            .iter()
            .filter(|file| staging.read_staged(&file.relative_path).is_some())
            .map(|file| file.absolute_path.clone())
            .collect()
    }

    pub fn commit(mut self) -> Transaction<Committed> {
        if let Some(backups) = self.backups.take() {
            backups.discard();
        }
        self.into_state(None, None)
    }

    pub fn rollback(mut self) -> Result<Transaction<RolledBack>, BatchError> {
        if let Some(backups) = self.backups.take() {
            backups.restore_all()?;
        }
        Ok(self.into_state(None, None))
    }
}

// ── Result builders ────────────────────────────────────────────────

impl Transaction<Committed> {
    pub fn into_result(self) -> MigrateResult {
        let status = if self.has_failures() {
            MigrateStatus::Partial
        } else {
            MigrateStatus::Success
        };
        self.build_result(status, true)
    }
}

impl Transaction<RolledBack> {
    pub fn into_result(self) -> MigrateResult {
        self.build_result(MigrateStatus::RolledBack, false)
    }
}
