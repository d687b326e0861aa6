//! Migration driver: match annotations against the registry and build the
//! edit script.
//!
//! Every entry is computed from the ORIGINAL annotation list of its
//! declaration. Nothing produced here is fed back into the registry, so an
//! annotation is never rewritten twice in one run.

use crate::annotation::{AnnotationId, AnnotationInstance, Declaration, SourceSpan};
use crate::registry::Registry;
use crate::rules::RuleSkip;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Replace one legacy annotation with its migrated form.
///
/// The host deletes `delete` and inserts `insert_text` at `insert_after`
/// (the deleted annotation's own position), then adds `imports`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditEntry {
    pub declaration: String,
    pub file: String,
    pub delete: AnnotationInstance,
    pub insert_after: SourceSpan,
    pub insert_text: String,
    pub imports: BTreeSet<AnnotationId>,
}

impl EditEntry {
    pub fn legacy(&self) -> &AnnotationId {
        &self.delete.id
    }
}

pub type EditScript = Vec<EditEntry>;

/// A registered annotation that could not be migrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub declaration: String,
    pub file: String,
    pub annotation: AnnotationId,
    pub span: SourceSpan,
    pub reason: RuleSkip,
}

/// Output of one migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationPlan {
    pub entries: EditScript,
    pub skipped: Vec<Skipped>,
}

impl MigrationPlan {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Union of required imports, per file.
    pub fn imports_by_file(&self) -> BTreeMap<&str, BTreeSet<AnnotationId>> {
        let mut by_file: BTreeMap<&str, BTreeSet<AnnotationId>> = BTreeMap::new();
        for entry in &self.entries {
            by_file
                .entry(entry.file.as_str())
                .or_default()
                .extend(entry.imports.iter().cloned());
        }
        by_file
    }

    pub fn imports_for(&self, file: &str) -> BTreeSet<AnnotationId> {
        self.entries
            .iter()
            .filter(|entry| entry.file == file)
            .flat_map(|entry| entry.imports.iter().cloned())
            .collect()
    }

    /// Legacy ids that were replaced at least once in `file`.
    pub fn migrated_ids_for(&self, file: &str) -> BTreeSet<AnnotationId> {
        self.entries
            .iter()
            .filter(|entry| entry.file == file)
            .map(|entry| entry.legacy().clone())
            .collect()
    }

    /// Names of declarations with at least one skipped annotation.
    pub fn partially_migrated(&self) -> BTreeSet<&str> {
        self.skipped
            .iter()
            .map(|skip| skip.declaration.as_str())
            .collect()
    }

    fn extend(&mut self, other: MigrationPlan) {
        self.entries.extend(other.entries);
        self.skipped.extend(other.skipped);
    }
}

/// Migrate every declaration. Declarations are independent of each other.
pub fn migrate(registry: &Registry, declarations: &[Declaration]) -> MigrationPlan {
    let mut plan = MigrationPlan::default();
    for decl in declarations {
        plan.extend(migrate_declaration(registry, decl));
    }
    tracing::debug!(
        declarations = declarations.len(),
        entries = plan.entries.len(),
        skipped = plan.skipped.len(),
        "migration planned"
    );
    plan
}

/// Migrate the annotations of a single declaration, in source order.
pub fn migrate_declaration(registry: &Registry, decl: &Declaration) -> MigrationPlan {
    let mut plan = MigrationPlan::default();

    for annotation in &decl.annotations {
        let Some(rule) = registry.lookup(&annotation.id) else {
            continue;
        };

        match rule.apply(annotation, decl) {
            Ok(result) => {
                tracing::debug!(
                    method = %decl.name,
                    from = %annotation.id,
                    to = %result.text,
                    "rewrote annotation"
                );
                plan.entries.push(EditEntry {
                    declaration: decl.name.clone(),
                    file: decl.file.clone(),
                    delete: annotation.clone(),
                    insert_after: annotation.span,
                    insert_text: result.text,
                    imports: result.imports,
                });
            }
            Err(reason) => {
                tracing::info!(
                    method = %decl.name,
                    annotation = %annotation.id,
                    %reason,
                    "not fully migrated"
                );
                plan.skipped.push(Skipped {
                    declaration: decl.name.clone(),
                    file: decl.file.clone(),
                    annotation: annotation.id.clone(),
                    span: annotation.span,
                    reason,
                });
            }
        }
    }

    plan
}

/// The annotation list of `decl` as it reads after applying `entries`.
///
/// Entries that belong to other declarations are ignored.
pub fn preview(decl: &Declaration, entries: &[EditEntry]) -> Vec<String> {
    decl.annotations
        .iter()
        .map(|annotation| {
            entries
                .iter()
                .find(|entry| {
                    entry.declaration == decl.name
                        && entry.file == decl.file
                        && &entry.delete == annotation
                })
                .map(|entry| entry.insert_text.clone())
                .unwrap_or_else(|| display_text(annotation))
        })
        .collect()
}

fn display_text(annotation: &AnnotationInstance) -> String {
    if annotation.text.is_empty() {
        format!("@{}", annotation.id.simple_name())
    } else {
        annotation.text.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AttributeValue;
    use crate::registry::{ids, NameStyle, Profile};

    fn string(text: &str) -> AttributeValue {
        AttributeValue::StringLiteral(text.to_string())
    }

    fn tags(values: &[&str]) -> AnnotationInstance {
        let text = format!("@WithTagValuesOf({{{}}})", values.join(", "));
        AnnotationInstance::new(ids::SERENITY_WITH_TAG_VALUES_OF)
            .with_attribute(
                "value",
                AttributeValue::array(values.iter().map(|v| string(v)).collect()),
            )
            .with_text(text)
            .with_span(SourceSpan::new(10, 40))
    }

    fn title(value: &str) -> AnnotationInstance {
        AnnotationInstance::new(ids::SERENITY_TITLE)
            .with_attribute("value", string(value))
            .with_text(format!("@Title({value})"))
            .with_span(SourceSpan::new(41, 60))
    }

    fn unrelated() -> AnnotationInstance {
        AnnotationInstance::new(AnnotationId::new("org.junit.jupiter.api.Test"))
            .with_text("@Test")
            .with_span(SourceSpan::new(0, 5))
    }

    #[test]
    fn test_order_preserved_around_unrelated_annotation() {
        let decl = Declaration::new("login")
            .with_annotation(unrelated())
            .with_annotation(tags(&["\"smoke\""]))
            .with_annotation(title("\"Login works\""))
            .in_file("LoginTest.java");
        let plan = migrate(&Registry::builtin(), std::slice::from_ref(&decl));

        assert_eq!(plan.entries.len(), 2);
        assert_eq!(
            preview(&decl, &plan.entries),
            vec![
                "@Test".to_string(),
                "@Tags({@Tag(\"smoke\")})".to_string(),
                "@DisplayName(\"Login works\")".to_string(),
            ]
        );
    }

    #[test]
    fn test_entries_anchor_on_the_replaced_annotation() {
        let decl = Declaration::new("login").with_annotation(title("\"x\""));
        let plan = migrate_declaration(&Registry::builtin(), &decl);
        let entry = &plan.entries[0];
        assert_eq!(entry.insert_after, entry.delete.span);
        assert_eq!(entry.legacy(), &ids::SERENITY_TITLE);
    }

    #[test]
    fn test_no_match_declaration_is_untouched() {
        let decl = Declaration::new("plain").with_annotation(unrelated());
        let plan = migrate(&Registry::builtin(), &[decl]);
        assert!(plan.is_empty());
        assert!(plan.skipped.is_empty());
    }

    #[test]
    fn test_already_migrated_annotations_are_ignored() {
        let migrated = AnnotationInstance::new(ids::JUNIT5_TAGS).with_attribute(
            "value",
            AttributeValue::array(vec![AttributeValue::RawExpression("@Tag(\"a\")".into())]),
        );
        let decl = Declaration::new("m").with_annotation(migrated);
        assert!(migrate(&Registry::builtin(), &[decl]).is_empty());
    }

    #[test]
    fn test_imports_are_accumulated_without_duplicates() {
        let decl = Declaration::new("login")
            .with_annotation(tags(&["\"a\"", "\"b\""]))
            .with_annotation(title("\"t\""))
            .in_file("A.java");
        let other = Declaration::new("logout")
            .with_annotation(tags(&["\"c\""]))
            .in_file("A.java");
        let plan = migrate(&Registry::builtin(), &[decl, other]);

        let imports: Vec<_> = plan.imports_for("A.java").into_iter().collect();
        assert_eq!(
            imports,
            vec![ids::JUNIT5_DISPLAY_NAME, ids::JUNIT5_TAG, ids::JUNIT5_TAGS]
        );
        assert_eq!(plan.imports_by_file()["A.java"].len(), 3);
    }

    #[test]
    fn test_skip_is_recorded_and_other_annotations_continue() {
        let broken_title = AnnotationInstance::new(ids::SERENITY_TITLE).with_text("@Title");
        let decl = Declaration::new("login")
            .with_annotation(broken_title)
            .with_annotation(tags(&["\"a\""]));
        let plan = migrate_declaration(&Registry::builtin(), &decl);

        assert_eq!(plan.entries.len(), 1);
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].annotation, ids::SERENITY_TITLE);
        assert!(plan.partially_migrated().contains("login"));
    }

    #[test]
    fn test_profile_limits_the_rules() {
        let step = AnnotationInstance::new(ids::ALLURE1_STEP).with_attribute("value", string("\"s\""));
        let decl = Declaration::new("s").with_annotation(step);
        let junit_only = Registry::new(Profile::Junit5, NameStyle::Short);
        assert!(migrate(&junit_only, std::slice::from_ref(&decl)).is_empty());
        assert_eq!(migrate(&Registry::builtin(), &[decl]).entries.len(), 1);
    }

    #[test]
    fn test_migrated_ids_for_file() {
        let decl = Declaration::new("m")
            .with_annotation(title("\"t\""))
            .in_file("B.java");
        let plan = migrate(&Registry::builtin(), &[decl]);
        assert!(plan.migrated_ids_for("B.java").contains(&ids::SERENITY_TITLE));
        assert!(plan.migrated_ids_for("C.java").is_empty());
    }
}
