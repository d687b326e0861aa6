use migrator_core::{NameStyle, Profile, Registry};
use migrator_java::{FileMigration, Scope};
use serde::{Deserialize, Serialize};

/// Suffix that marks a test class when no explicit class is given.
pub const DEFAULT_CLASS_SUFFIX: &str = "Test";

/// Options for one migration run. Every field is optional so a config file
/// and command-line flags can be layered with [`MigrateInput::overlay`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MigrateInput {
    /// Files to migrate, relative to the project root. `None` discovers every
    /// Java source under the root.
    pub files: Option<Vec<String>>,

    /// Which migrations to run. Default: all.
    pub profile: Option<Profile>,

    /// Migrate only the class with this simple name.
    pub class: Option<String>,

    /// Migrate classes whose name ends with this suffix. Default: "Test" when
    /// files are discovered, every class when files are listed.
    pub class_suffix: Option<String>,

    /// Short or fully-qualified names in generated annotations. Default: short.
    pub name_style: Option<NameStyle>,

    /// Report what would change without writing. Default: false.
    pub dry_run: Option<bool>,

    /// Abort the whole run if any file fails to migrate. Default: true.
    pub rollback_on_failure: Option<bool>,
}

impl MigrateInput {
    pub fn profile(&self) -> Profile {
        self.profile.unwrap_or_default()
    }

    pub fn name_style(&self) -> NameStyle {
        self.name_style.unwrap_or_default()
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run.unwrap_or(false)
    }

    pub fn rollback_on_failure(&self) -> bool {
        self.rollback_on_failure.unwrap_or(true)
    }

    pub fn registry(&self) -> Registry {
        Registry::new(self.profile(), self.name_style())
    }

    pub fn scope(&self) -> Scope {
        match (&self.class, &self.class_suffix, &self.files) {
            (Some(class), _, _) => Scope::Class(class.clone()),
            (None, Some(suffix), _) => Scope::ClassSuffix(suffix.clone()),
            (None, None, Some(_)) => Scope::All,
            (None, None, None) => Scope::ClassSuffix(DEFAULT_CLASS_SUFFIX.to_string()),
        }
    }

    /// `other`'s set fields win over `self`'s.
    pub fn overlay(self, other: MigrateInput) -> MigrateInput {
        MigrateInput {
            files: other.files.or(self.files),
            profile: other.profile.or(self.profile),
            class: other.class.or(self.class),
            class_suffix: other.class_suffix.or(self.class_suffix),
            name_style: other.name_style.or(self.name_style),
            dry_run: other.dry_run.or(self.dry_run),
            rollback_on_failure: other.rollback_on_failure.or(self.rollback_on_failure),
        }
    }
}

/// Per-file outcome.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    #[serde(flatten)]
    pub migration: FileMigration,
    /// Whether the new content reached the working tree.
    pub written: bool,
}

/// Result of one run.
#[derive(Debug, Serialize)]
pub struct MigrateResult {
    pub status: MigrateStatus,
    pub dry_run: bool,
    pub files_scanned: usize,
    pub files_modified: Vec<String>,
    pub files: Vec<FileReport>,
    pub errors: Vec<MigrateErrorDetail>,
    pub rolled_back: bool,
}

impl MigrateResult {
    pub fn empty(dry_run: bool) -> Self {
        Self {
            status: MigrateStatus::NoChanges,
            dry_run,
            files_scanned: 0,
            files_modified: Vec::new(),
            files: Vec::new(),
            errors: Vec::new(),
            rolled_back: false,
        }
    }

    pub fn skipped_annotations(&self) -> usize {
        self.files.iter().map(|f| f.migration.skipped.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrateStatus {
    /// Every changed file was written (or would be, on a dry run).
    Success,
    /// Nothing needed migrating.
    NoChanges,
    /// Some files failed; the others were written.
    Partial,
    /// Some files failed and nothing was written.
    Aborted,
    /// A write failed and every written file was restored.
    RolledBack,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrateErrorDetail {
    pub file: Option<String>,
    pub phase: String,
    pub message: String,
}

impl MigrateErrorDetail {
    pub fn new(file: Option<&str>, phase: &str, message: impl Into<String>) -> Self {
        Self {
            file: file.map(str::to_string),
            phase: phase.to_string(),
            message: message.into(),
        }
    }
}
