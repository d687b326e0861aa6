use migrator_batch::{run, MigrateInput, Transaction};
use proptest::prelude::*;
use std::fs;

/// A test class whose titles come from `titles`, one method each.
fn test_class(name: &str, titles: &[String]) -> String {
    let mut source = String::from("import net.thucydides.core.annotations.Title;\n\n");
    source.push_str(&format!("class {name} {{\n"));
    for (i, title) in titles.iter().enumerate() {
        source.push_str(&format!("    @Title(\"{title}\")\n    void m{i}() {{}}\n"));
    }
    source.push_str("}\n");
    source
}

proptest! {
    /// After rollback, every file matches its original content byte-for-byte.
    #[test]
    fn prop_rollback_always_restores_original_state(
        classes in prop::collection::vec(
            prop::collection::vec("[a-zA-Z0-9 ]{0,20}", 1..4),
            1..5,
        ),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut names = Vec::new();
        let mut originals = Vec::new();
        for (i, titles) in classes.iter().enumerate() {
            let name = format!("C{i}Test");
            let source = test_class(&name, titles);
            fs::write(dir.path().join(format!("{name}.java")), &source).unwrap();
            names.push(format!("{name}.java"));
            originals.push(source);
        }

        let txn = Transaction::new(dir.path().to_path_buf(), &names, &MigrateInput::default()).unwrap();
        let applied = txn.stage().unwrap().apply().unwrap();
        let _rolled_back = applied.rollback().unwrap();

        for (name, original) in names.iter().zip(&originals) {
            let actual = fs::read_to_string(dir.path().join(name)).unwrap();
            prop_assert_eq!(&actual, original, "{} differs after rollback", name);
        }
    }

    /// A dry run never changes a byte of the working tree.
    #[test]
    fn prop_dry_run_never_writes(
        titles in prop::collection::vec("[a-zA-Z0-9 {}]{0,20}", 1..5),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let source = test_class("DryTest", &titles);
        fs::write(dir.path().join("DryTest.java"), &source).unwrap();

        let input = MigrateInput { dry_run: Some(true), ..Default::default() };
        let result = run(dir.path(), &input).unwrap();

        prop_assert!(result.files_modified.is_empty());
        prop_assert_eq!(fs::read_to_string(dir.path().join("DryTest.java")).unwrap(), source);
    }

    /// Committed content is exactly what the migration staged.
    #[test]
    fn prop_committed_titles_survive(
        titles in prop::collection::vec("[a-zA-Z0-9 ]{0,20}", 1..5),
    ) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("KeepTest.java"), test_class("KeepTest", &titles)).unwrap();

        run(dir.path(), &MigrateInput::default()).unwrap();
        let migrated = fs::read_to_string(dir.path().join("KeepTest.java")).unwrap();
        for title in &titles {
            let expected = format!("@DisplayName(\"{}\")", title);
            prop_assert!(migrated.contains(&expected));
        }
        prop_assert!(!migrated.contains("@Title("));
    }
}
