use crate::SharedOptions;
use migrator_batch::paths::to_relative_string;
use migrator_batch::{run, MigrateInput, MigrateResult, MigrateStatus};
use migrator_core::{migrate, Declaration, Registry};
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::io::Read;
use std::path::Path;

/// What a command prints, and whether the process should fail afterwards.
pub struct Report {
    pub json: Value,
    pub failure: Option<String>,
}

impl Report {
    fn from_result(result: &MigrateResult) -> Result<Self, Box<dyn Error>> {
        let failure = match result.status {
            MigrateStatus::Aborted => Some("migration aborted; no files were written".to_string()),
            MigrateStatus::RolledBack => Some("write failed; all files were restored".to_string()),
            MigrateStatus::Partial => Some(format!("{} file(s) failed to migrate", result.errors.len())),
            MigrateStatus::Success | MigrateStatus::NoChanges => None,
        };
        tracing::info!(
            status = ?result.status,
            modified = result.files_modified.len(),
            skipped_annotations = result.skipped_annotations(),
            "done"
        );
        Ok(Self {
            json: serde_json::to_value(result)?,
            failure,
        })
    }
}

/// Config-file defaults with the command-line flags laid over them.
pub fn load_input(options: &SharedOptions, flags: MigrateInput) -> Result<MigrateInput, Box<dyn Error>> {
    let base = match &options.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
            serde_json::from_str(&text)
                .map_err(|e| format!("invalid config {}: {e}", path.display()))?
        }
        None => MigrateInput::default(),
    };

    let shared = MigrateInput {
        profile: options.profile,
        name_style: options.style,
        dry_run: options.dry_run.then_some(true),
        ..Default::default()
    };
    Ok(base.overlay(shared).overlay(flags))
}

pub fn migrate_file(
    options: &SharedOptions,
    file: &Path,
    class: Option<String>,
    root: Option<&Path>,
) -> Result<Report, Box<dyn Error>> {
    let file = file.canonicalize()?;
    let root = match root {
        Some(root) => root.canonicalize()?,
        None => file
            .parent()
            .ok_or("file has no parent directory")?
            .to_path_buf(),
    };
    let relative = to_relative_string(&root, &file)
        .ok_or_else(|| format!("{} is outside {}", file.display(), root.display()))?;

    let input = load_input(
        options,
        MigrateInput {
            files: Some(vec![relative]),
            class,
            ..Default::default()
        },
    )?;
    tracing::debug!(root = %root.display(), ?input, "migrating file");
    Report::from_result(&run(&root, &input)?)
}

pub fn migrate_project(
    options: &SharedOptions,
    root: &Path,
    suffix: Option<String>,
) -> Result<Report, Box<dyn Error>> {
    let root = root.canonicalize()?;
    let input = load_input(
        options,
        MigrateInput {
            class_suffix: suffix,
            ..Default::default()
        },
    )?;
    tracing::info!(root = %root.display(), "migrating project");
    Report::from_result(&run(&root, &input)?)
}

/// Run the core directly on serialized declarations.
pub fn plan(options: &SharedOptions, declarations: &Path) -> Result<Report, Box<dyn Error>> {
    let text = if declarations == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        fs::read_to_string(declarations)?
    };
    let declarations: Vec<Declaration> = serde_json::from_str(&text)?;

    let input = load_input(options, MigrateInput::default())?;
    let registry = Registry::new(input.profile(), input.name_style());
    let plan = migrate(&registry, &declarations);
    Ok(Report {
        json: serde_json::to_value(&plan)?,
        failure: None,
    })
}
