//! Java import handling: name resolution for annotations and the import
//! additions/removals that follow a migration.

use crate::edit::TextEdit;
use migrator_core::{AnnotationId, SourceSpan};
use std::collections::BTreeSet;
use tree_sitter::{Node, Tree};

/// One `import` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// `a.b.C` for `import a.b.C;`, `a.b` for `import a.b.*;`.
    pub path: String,
    pub wildcard: bool,
    pub is_static: bool,
    pub start: usize,
    pub end: usize,
}

/// The package and import section of one compilation unit.
#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    pub package: Option<String>,
    package_end: Option<usize>,
    pub imports: Vec<ImportDecl>,
}

impl ImportTable {
    pub fn from_tree(source: &str, tree: &Tree) -> Self {
        let root = tree.root_node();
        let mut table = ImportTable::default();

        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "package_declaration" => {
                    table.package = name_child(&node).map(|n| text(&n, source).to_string());
                    table.package_end = Some(node.end_byte());
                }
                "import_declaration" => {
                    if let Some(import) = import_decl(&node, source) {
                        table.imports.push(import);
                    }
                }
                _ => {}
            }
        }

        table
    }

    /// Resolve an annotation name as written (`Title`, `annotations.Title`,
    /// `net.thucydides.core.annotations.Title`) to a fully-qualified id.
    ///
    /// `is_known` decides which on-demand candidates are worth taking.
    /// Unresolvable names come back unchanged.
    pub fn resolve(&self, written: &str, is_known: impl Fn(&AnnotationId) -> bool) -> AnnotationId {
        if written.contains('.') {
            return AnnotationId::new(written);
        }

        if let Some(single) = self
            .type_imports()
            .find(|import| !import.wildcard && simple_name(&import.path) == written)
        {
            return AnnotationId::new(single.path.clone());
        }

        let same_package = self.package.iter();
        let on_demand = self
            .type_imports()
            .filter(|import| import.wildcard)
            .map(|import| &import.path);
        for package in on_demand.chain(same_package) {
            let candidate = AnnotationId::new(format!("{package}.{written}"));
            if is_known(&candidate) {
                return candidate;
            }
        }

        AnnotationId::new(written)
    }

    /// Whether `id` is usable by its simple name without a new import.
    pub fn covers(&self, id: &AnnotationId) -> bool {
        let package = id.package();
        self.package.as_deref() == package
            || self.type_imports().any(|import| {
                if import.wildcard {
                    Some(import.path.as_str()) == package
                } else {
                    import.path == id.as_str()
                }
            })
    }

    /// A single-type import that claims `id`'s simple name for another type.
    pub fn clash(&self, id: &AnnotationId) -> Option<&ImportDecl> {
        self.type_imports().find(|import| {
            !import.wildcard
                && simple_name(&import.path) == id.simple_name()
                && import.path != id.as_str()
        })
    }

    pub fn single_import(&self, id: &AnnotationId) -> Option<&ImportDecl> {
        self.type_imports()
            .find(|import| !import.wildcard && import.path == id.as_str())
    }

    /// Where new import lines go: after the line holding the last import,
    /// else after the package declaration's line, else at the top of the file.
    pub fn insertion_point(&self, source: &str) -> usize {
        match (self.imports.last(), self.package_end) {
            (Some(last), _) => next_line(source, last.end),
            (None, Some(package_end)) => next_line(source, package_end),
            (None, None) => 0,
        }
    }

    fn type_imports(&self) -> impl Iterator<Item = &ImportDecl> {
        self.imports.iter().filter(|import| !import.is_static)
    }
}

/// Import edits computed for one file.
#[derive(Debug, Clone, Default)]
pub struct ImportChanges {
    pub edits: Vec<TextEdit>,
    pub added: Vec<AnnotationId>,
    pub removed: Vec<AnnotationId>,
    pub warnings: Vec<String>,
}

/// Compute the edits that add `add` and drop the single-type imports of
/// `remove`.
///
/// Ids already covered by an import (or the file's own package) are not
/// added again. An id whose simple name is taken by a different import
/// that is not being removed is reported as a warning instead.
pub fn import_edits(
    source: &str,
    table: &ImportTable,
    add: &BTreeSet<AnnotationId>,
    remove: &BTreeSet<AnnotationId>,
) -> ImportChanges {
    let mut changes = ImportChanges::default();

    for id in remove {
        if let Some(import) = table.single_import(id) {
            let end = line_end(source, import.end);
            changes
                .edits
                .push(TextEdit::delete(import.start, end, format!("remove import {id}")));
            changes.removed.push(id.clone());
        }
    }

    let mut lines = Vec::new();
    for id in add {
        if table.covers(id) {
            continue;
        }
        let clash = table
            .clash(id)
            .filter(|existing| !changes.removed.iter().any(|r| r.as_str() == existing.path));
        if let Some(existing) = clash {
            changes.warnings.push(format!(
                "cannot import {id}: '{}' is already imported as {}",
                id.simple_name(),
                existing.path
            ));
            continue;
        }
        lines.push(format!("import {id};\n"));
        changes.added.push(id.clone());
    }

    if !lines.is_empty() {
        let at = table.insertion_point(source);
        let mut block = lines.concat();
        if table.imports.is_empty() && at > 0 {
            // First import after the package line: keep a blank line between.
            block.insert(0, '\n');
        } else if at == 0 && !source.is_empty() {
            block.push('\n');
        }
        if at > 0 && !source[..at].ends_with('\n') {
            block.insert(0, '\n');
        }
        let label = format!("add {} import(s)", changes.added.len());
        changes.edits.push(TextEdit::insert(at, block, label));
    }

    changes
}

/// Names used outside the package and import section and outside every
/// span in `excluding`.
pub fn referenced_names(source: &str, tree: &Tree, excluding: &[SourceSpan]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    collect_names(&tree.root_node(), source, excluding, &mut names);
    names
}

fn collect_names(
    node: &Node,
    source: &str,
    excluding: &[SourceSpan],
    names: &mut BTreeSet<String>,
) {
    let start = node.start_byte();
    let end = node.end_byte();
    if excluding
        .iter()
        .any(|span| span.start <= start && end <= span.end)
    {
        return;
    }
    match node.kind() {
        "package_declaration" | "import_declaration" => return,
        "identifier" | "type_identifier" => {
            names.insert(text(node, source).to_string());
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_names(&child, source, excluding, names);
    }
}

fn import_decl(node: &Node, source: &str) -> Option<ImportDecl> {
    let mut path = None;
    let mut wildcard = false;
    let mut is_static = false;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "static" => is_static = true,
            "asterisk" => wildcard = true,
            "identifier" | "scoped_identifier" => path = Some(text(&child, source).to_string()),
            _ => {}
        }
    }

    Some(ImportDecl {
        path: path?,
        wildcard,
        is_static,
        start: node.start_byte(),
        end: node.end_byte(),
    })
}

fn name_child<'a>(node: &Node<'a>) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| matches!(child.kind(), "identifier" | "scoped_identifier"));
    found
}

fn text<'s>(node: &Node, source: &'s str) -> &'s str {
    &source[node.start_byte()..node.end_byte()]
}

fn simple_name(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Offset just past the newline that ends the line containing `offset`,
/// provided only whitespace sits between them.
fn line_end(source: &str, offset: usize) -> usize {
    let rest = &source[offset..];
    let line = rest.split('\n').next().unwrap_or(rest);
    if line.trim().is_empty() && line.len() < rest.len() {
        offset + line.len() + 1
    } else {
        offset
    }
}

/// Start of the line after the one containing `offset`, or the end of the
/// source on the last line. Trailing comments stay with their line.
fn next_line(source: &str, offset: usize) -> usize {
    source[offset..]
        .find('\n')
        .map_or(source.len(), |newline| offset + newline + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::EditSet;
    use crate::parser;
    use migrator_core::ids;

    fn table(source: &str) -> (ImportTable, Tree) {
        let tree = parser().parse(source, None).unwrap();
        (ImportTable::from_tree(source, &tree), tree)
    }

    fn set(ids: &[AnnotationId]) -> BTreeSet<AnnotationId> {
        ids.iter().cloned().collect()
    }

    fn apply(source: &str, changes: &ImportChanges) -> String {
        EditSet::new(changes.edits.clone(), source)
            .unwrap()
            .apply(source)
    }

    const HEADER: &str = "package com.example;\n\nimport net.thucydides.core.annotations.Title;\nimport static org.junit.Assert.assertTrue;\nimport ru.yandex.qatools.allure.annotations.*;\n\nclass LoginTest {}\n";

    #[test]
    fn test_table_reads_package_and_imports() {
        let (table, _) = table(HEADER);
        assert_eq!(table.package.as_deref(), Some("com.example"));
        assert_eq!(table.imports.len(), 3);
        assert_eq!(table.imports[0].path, "net.thucydides.core.annotations.Title");
        assert!(table.imports[1].is_static);
        assert!(table.imports[2].wildcard);
        assert_eq!(table.imports[2].path, "ru.yandex.qatools.allure.annotations");
    }

    #[test]
    fn test_resolve_single_wildcard_and_qualified() {
        let (table, _) = table(HEADER);
        let known = |id: &AnnotationId| id == &ids::ALLURE1_STEP;

        assert_eq!(table.resolve("Title", known), ids::SERENITY_TITLE);
        assert_eq!(table.resolve("Step", known), ids::ALLURE1_STEP);
        assert_eq!(
            table.resolve("net.thucydides.core.annotations.Issue", known),
            ids::SERENITY_ISSUE
        );
        assert_eq!(table.resolve("Test", known), AnnotationId::new("Test"));
    }

    #[test]
    fn test_static_imports_do_not_resolve_annotations() {
        let source = "import static a.b.Title;\nclass A {}";
        let (table, _) = table(source);
        assert_eq!(table.resolve("Title", |_| true), AnnotationId::new("Title"));
    }

    #[test]
    fn test_add_after_last_import_and_remove_legacy() {
        let (table, _) = table(HEADER);
        let changes = import_edits(
            HEADER,
            &table,
            &set(&[ids::JUNIT5_DISPLAY_NAME]),
            &set(&[ids::SERENITY_TITLE]),
        );
        assert_eq!(changes.added, vec![ids::JUNIT5_DISPLAY_NAME]);
        assert_eq!(changes.removed, vec![ids::SERENITY_TITLE]);

        let result = apply(HEADER, &changes);
        assert_eq!(
            result,
            "package com.example;\n\nimport static org.junit.Assert.assertTrue;\nimport ru.yandex.qatools.allure.annotations.*;\nimport org.junit.jupiter.api.DisplayName;\n\nclass LoginTest {}\n"
        );
    }

    #[test]
    fn test_covered_ids_are_not_added() {
        let source = "import org.junit.jupiter.api.*;\nimport io.qameta.allure.Step;\nclass A {}";
        let (table, _) = table(source);
        let changes = import_edits(
            source,
            &table,
            &set(&[ids::JUNIT5_TAG, ids::JUNIT5_TAGS, ids::ALLURE2_STEP]),
            &BTreeSet::new(),
        );
        assert!(changes.edits.is_empty());
        assert!(changes.added.is_empty());
    }

    #[test]
    fn test_clash_becomes_warning() {
        let source = "import io.qameta.allure.Step;\nclass A {}";
        let (table, _) = table(source);
        let clashing = AnnotationId::new("com.other.Step");
        let changes = import_edits(source, &table, &set(&[clashing]), &BTreeSet::new());
        assert!(changes.edits.is_empty());
        assert_eq!(changes.warnings.len(), 1);
    }

    #[test]
    fn test_trailing_comment_stays_on_last_import_line() {
        let source = "import org.junit.jupiter.api.Test; // runner\n\nclass A {}\n";
        let (table, _) = table(source);
        let changes = import_edits(source, &table, &set(&[ids::JUNIT5_TAG]), &BTreeSet::new());
        assert_eq!(
            apply(source, &changes),
            "import org.junit.jupiter.api.Test; // runner\nimport org.junit.jupiter.api.Tag;\n\nclass A {}\n"
        );
    }

    #[test]
    fn test_first_import_after_package() {
        let source = "package a;\n\nclass A {}\n";
        let (table, _) = table(source);
        let changes = import_edits(source, &table, &set(&[ids::JUNIT5_TAG]), &BTreeSet::new());
        assert_eq!(
            apply(source, &changes),
            "package a;\n\nimport org.junit.jupiter.api.Tag;\n\nclass A {}\n"
        );
    }

    #[test]
    fn test_first_import_in_bare_file() {
        let source = "class A {}\n";
        let (table, _) = table(source);
        let changes = import_edits(
            source,
            &table,
            &set(&[ids::JUNIT5_TAGS, ids::JUNIT5_TAG]),
            &BTreeSet::new(),
        );
        assert_eq!(
            apply(source, &changes),
            "import org.junit.jupiter.api.Tag;\nimport org.junit.jupiter.api.Tags;\n\nclass A {}\n"
        );
    }

    #[test]
    fn test_referenced_names_skip_imports() {
        let source = "import a.b.Title;\nclass A {\n  @DisplayName(\"x\")\n  void m() {}\n}";
        let (_, tree) = table(source);
        let names = referenced_names(source, &tree, &[]);
        assert!(names.contains("DisplayName"));
        assert!(names.contains("A"));
        assert!(!names.contains("Title"));
    }

    #[test]
    fn test_referenced_names_skip_excluded_spans() {
        let source = "class A {\n  @Step(\"x\") void m() {}\n  @Title(\"y\") void n() {}\n}";
        let (_, tree) = table(source);
        let start = source.find("@Step").unwrap();
        let span = SourceSpan::new(start, start + "@Step(\"x\")".len());
        let names = referenced_names(source, &tree, &[span]);
        assert!(!names.contains("Step"));
        assert!(names.contains("Title"));
        assert!(names.contains("m"));
    }

    #[test]
    fn test_removed_import_does_not_clash() {
        let source = "import ru.yandex.qatools.allure.annotations.Step;\nclass A {}\n";
        let (table, _) = table(source);
        let changes = import_edits(
            source,
            &table,
            &set(&[ids::ALLURE2_STEP]),
            &set(&[ids::ALLURE1_STEP]),
        );
        assert!(changes.warnings.is_empty());
        assert_eq!(
            apply(source, &changes),
            "import io.qameta.allure.Step;\nclass A {}\n"
        );
    }
}
