use migrator_batch::{MigrateInput, Transaction};
use std::fs;

const TITLED: &str = "import net.thucydides.core.annotations.Title;\n\n// Special chars: é à ü ñ\nclass ATest {\n    @Title(\"a\")\n    void a() {}\n}\n\n";

fn files(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn test_rollback_preserves_original_content_exactly() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ATest.java"), TITLED).unwrap();

    let txn = Transaction::new(
        dir.path().to_path_buf(),
        &files(&["ATest.java"]),
        &MigrateInput::default(),
    )
    .unwrap();
    let applied = txn.stage().unwrap().apply().unwrap();
    assert_ne!(fs::read_to_string(dir.path().join("ATest.java")).unwrap(), TITLED);

    let _rolled_back = applied.rollback().unwrap();
    assert_eq!(fs::read_to_string(dir.path().join("ATest.java")).unwrap(), TITLED);
}

#[test]
#[cfg(unix)]
fn test_rollback_after_partial_apply_failure() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ATest.java"), TITLED).unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("BTest.java"), TITLED.replace("ATest", "BTest")).unwrap();

    let txn = Transaction::new(
        dir.path().to_path_buf(),
        &files(&["ATest.java", "locked/BTest.java"]),
        &MigrateInput::default(),
    )
    .unwrap();
    let staged = txn.stage().unwrap();

    // Read+execute only: the file can be backed up but no temp file can be created beside it.
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
    if fs::write(locked.join("probe"), "").is_ok() {
        // Permissions are not enforced for this user (root); nothing to test.
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = staged.apply();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(result.is_err(), "expected apply to fail");
    assert_eq!(fs::read_to_string(dir.path().join("ATest.java")).unwrap(), TITLED);
    assert_eq!(
        fs::read_to_string(locked.join("BTest.java")).unwrap(),
        TITLED.replace("ATest", "BTest")
    );
}

#[test]
fn test_commit_keeps_new_content() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ATest.java"), TITLED).unwrap();

    let txn = Transaction::new(
        dir.path().to_path_buf(),
        &files(&["ATest.java"]),
        &MigrateInput::default(),
    )
    .unwrap();
    let result = txn.stage().unwrap().apply().unwrap().commit().into_result();

    assert!(!result.rolled_back);
    let content = fs::read_to_string(dir.path().join("ATest.java")).unwrap();
    assert!(content.contains("// Special chars: é à ü ñ"));
    assert!(content.contains("@DisplayName(\"a\")"));
    assert!(content.ends_with("}\n\n"));
}
