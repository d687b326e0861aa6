//! Migrate one Java compilation unit.
//!
//! Pipeline: parse, resolve annotation names through the import section,
//! run the core driver, then turn the plan into one set of byte edits
//! (annotations replaced in place, legacy imports dropped, target imports
//! added) computed against the original text. The result must reparse
//! cleanly or nothing is returned.

use crate::edit::{line_column, EditSet, TextEdit};
use crate::extract::{extract_classes, ClassDecl};
use crate::imports::{import_edits, referenced_names, ImportTable};
use crate::validate::{parse_best_effort, syntax_errors, verify_parse, ValidationError};
use crate::JavaError;
use migrator_core::{migrate, AnnotationId, Declaration, NameStyle, Registry, Skipped, SourceSpan};
use serde::Serialize;
use std::collections::BTreeSet;

/// Which classes of a file to migrate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every type declaration.
    All,
    /// Type declarations with exactly this simple name.
    Class(String),
    /// Type declarations whose simple name ends with the suffix (`Test`).
    ClassSuffix(String),
}

impl Scope {
    fn selects(&self, class: &ClassDecl) -> bool {
        match self {
            Scope::All => true,
            Scope::Class(name) => &class.name == name,
            Scope::ClassSuffix(suffix) => class.name.ends_with(suffix.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Annotation,
    ImportAdded,
    ImportRemoved,
}

/// One change, located in the ORIGINAL source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeDescription {
    pub kind: ChangeKind,
    pub line: usize,
    pub column: usize,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileMigration {
    pub file: String,
    #[serde(skip)]
    pub content: String,
    pub changed: bool,
    pub classes: Vec<String>,
    pub changes: Vec<ChangeDescription>,
    pub skipped: Vec<Skipped>,
    pub imports_added: Vec<AnnotationId>,
    pub imports_removed: Vec<AnnotationId>,
    pub warnings: Vec<String>,
}

impl FileMigration {
    fn unchanged(source: &str, file: &str, classes: Vec<String>, skipped: Vec<Skipped>) -> Self {
        Self {
            file: file.to_string(),
            content: source.to_string(),
            changed: false,
            classes,
            changes: Vec::new(),
            skipped,
            imports_added: Vec::new(),
            imports_removed: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Migrate the annotations of the classes selected by `scope`.
///
/// Sources with syntax errors are refused. A file with nothing to migrate
/// comes back byte-identical with `changed == false`.
pub fn migrate_source(
    source: &str,
    file: &str,
    registry: &Registry,
    scope: &Scope,
) -> Result<FileMigration, JavaError> {
    let tree = parse_best_effort(source).map_err(|_| JavaError::ParseFailed)?;
    let errors = syntax_errors(&tree, source);
    if !errors.is_empty() {
        return Err(JavaError::SourceHasErrors { errors });
    }

    let table = ImportTable::from_tree(source, &tree);
    let known: BTreeSet<&AnnotationId> = registry
        .legacy_ids()
        .chain(registry.target_ids())
        .collect();
    let resolve = |written: &str| table.resolve(written, |id| known.contains(id));

    let classes: Vec<ClassDecl> = extract_classes(source, &tree, file, &resolve)
        .into_iter()
        .filter(|class| scope.selects(class))
        .collect();
    if let Scope::Class(name) = scope {
        if classes.is_empty() {
            return Err(JavaError::ClassNotFound { name: name.clone() });
        }
    }

    let class_names = classes.iter().map(|class| class.name.clone()).collect();
    let declarations: Vec<Declaration> = classes
        .into_iter()
        .flat_map(|class| class.methods)
        .collect();
    let plan = migrate(registry, &declarations);
    if plan.is_empty() {
        tracing::debug!(file, skipped = plan.skipped.len(), "nothing to migrate");
        return Ok(FileMigration::unchanged(source, file, class_names, plan.skipped));
    }

    // A legacy import goes once every use of its name sits inside a replaced annotation.
    let replaced: Vec<SourceSpan> = plan.entries.iter().map(|e| e.delete.span).collect();
    let still_used = referenced_names(source, &tree, &replaced);
    let remove: BTreeSet<AnnotationId> = plan
        .migrated_ids_for(file)
        .into_iter()
        .filter(|id| !still_used.contains(id.simple_name()))
        .collect();

    let mut warnings = Vec::new();
    let blocked = match registry.style() {
        NameStyle::Short => unimportable(&plan.imports_for(file), &table, &still_used, &remove),
        NameStyle::Qualified => BTreeSet::new(),
    };
    for id in &blocked {
        warnings.push(format!(
            "{id} written fully qualified: '{}' still names another type in this file",
            id.simple_name()
        ));
    }
    let qualified = if blocked.is_empty() {
        None
    } else {
        Some(migrate(&registry.with_style(NameStyle::Qualified), &declarations))
    };

    let mut edits = Vec::with_capacity(plan.entries.len() + 2);
    let mut changes = Vec::new();
    let mut add = BTreeSet::new();
    for entry in &plan.entries {
        let span = entry.delete.span;
        let requalified = qualified
            .as_ref()
            .filter(|_| !entry.imports.is_disjoint(&blocked))
            .and_then(|q| q.entries.iter().find(|e| e.delete.span == span));
        let insert_text = match requalified {
            Some(q) => q.insert_text.clone(),
            None => {
                if registry.style() == NameStyle::Short {
                    add.extend(entry.imports.iter().cloned());
                }
                entry.insert_text.clone()
            }
        };
        let (line, column) = line_column(source, span.start);
        changes.push(ChangeDescription {
            kind: ChangeKind::Annotation,
            line,
            column,
            summary: format!("{} -> {}", entry.delete.text, insert_text),
        });
        edits.push(TextEdit::replace(
            span,
            insert_text,
            format!("migrate {} on {}", entry.legacy().simple_name(), entry.declaration),
        ));
    }

    let import_changes = import_edits(source, &table, &add, &remove);
    warnings.extend(import_changes.warnings.iter().cloned());
    for edit in &import_changes.edits {
        let (line, column) = line_column(source, edit.start);
        let kind = if edit.replacement.is_empty() {
            ChangeKind::ImportRemoved
        } else {
            ChangeKind::ImportAdded
        };
        changes.push(ChangeDescription {
            kind,
            line,
            column,
            summary: edit.label.clone(),
        });
    }
    for warning in &warnings {
        tracing::warn!(file, "{warning}");
    }
    edits.extend(import_changes.edits);

    let content = EditSet::new(edits, source)?.apply(source);
    verify_parse(&content).map_err(|err| match err {
        ValidationError::ParseFailed => JavaError::ParseFailed,
        ValidationError::SyntaxErrors { errors, .. } => JavaError::InvalidResult { errors },
    })?;

    changes.sort_by_key(|change| (change.line, change.column));
    tracing::info!(
        file,
        annotations = plan.entries.len(),
        imports_added = import_changes.added.len(),
        imports_removed = import_changes.removed.len(),
        skipped = plan.skipped.len(),
        "migrated"
    );

    Ok(FileMigration {
        file: file.to_string(),
        changed: content != source,
        content,
        classes: class_names,
        changes,
        skipped: plan.skipped,
        imports_added: import_changes.added,
        imports_removed: import_changes.removed,
        warnings,
    })
}

/// Target ids that cannot be brought in by a single-type import without
/// changing what some name in the file refers to.
///
/// That is the case when the simple name is still used outside the replaced
/// annotations (a skipped or out-of-scope legacy annotation, a wildcard
/// resolution the new import would shadow), or when another single-type
/// import that stays claims the name.
fn unimportable(
    targets: &BTreeSet<AnnotationId>,
    table: &ImportTable,
    still_used: &BTreeSet<String>,
    remove: &BTreeSet<AnnotationId>,
) -> BTreeSet<AnnotationId> {
    targets
        .iter()
        .filter(|id| !table.covers(id))
        .filter(|id| {
            still_used.contains(id.simple_name())
                || table
                    .clash(id)
                    .is_some_and(|existing| !remove.iter().any(|r| r.as_str() == existing.path))
        })
        .cloned()
        .collect()
}
