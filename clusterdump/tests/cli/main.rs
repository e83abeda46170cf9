//! Command line tests that need no running cluster: everything here fails or finishes before a
//! connection is attempted.

use assert_cmd::Command as AssertCmd;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

/// The binary, run from an empty directory with none of its environment variables set.
fn clusterdump(cwd: &TempDir) -> AssertCmd {
    let mut cmd = AssertCmd::cargo_bin("clusterdump").unwrap();
    cmd.current_dir(cwd.path())
        .env_remove("MONGODB_URI")
        .env_remove("CLUSTERDUMP_ARCHIVE_ROOT")
        .env_remove("CLUSTERDUMP_JSON_FORMAT")
        .env_remove("LOG_FILTER")
        .timeout(std::time::Duration::from_secs(30));
    cmd
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// An archive root holding two backups, the later one with a single collection.
fn archive_with_backups(cwd: &TempDir) {
    let exports = cwd.path().join("exports");
    fs::create_dir_all(exports.join("alice@c0_2024-01-01_00-00-00")).unwrap();
    let shop = exports.join("alice@c0_2024-01-02_03-04-05").join("shop");
    fs::create_dir_all(&shop).unwrap();
    fs::write(shop.join("orders.json"), r#"[{"_id": 1}]"#).unwrap();
}

#[test_log::test]
fn help_lists_commands() {
    let cwd = TempDir::new().unwrap();
    let output = clusterdump(&cwd).arg("--help").assert().success().get_output().clone();
    let help = stdout(&output);
    for command in ["backup", "restore", "list"] {
        assert!(help.contains(command), "{help}");
    }
}

#[test_log::test]
fn list_without_archive_root() {
    let cwd = TempDir::new().unwrap();
    let output = clusterdump(&cwd).arg("list").assert().success().get_output().clone();
    assert!(stdout(&output).contains("No backups found in exports"), "{output:?}");
}

#[test_log::test]
fn list_backups() {
    let cwd = TempDir::new().unwrap();
    archive_with_backups(&cwd);

    let output = clusterdump(&cwd)
        .args(["list", "--log-filter", "off"])
        .assert()
        .success()
        .get_output()
        .clone();
    assert_eq!(
        stdout(&output),
        "1: alice@c0_2024-01-01_00-00-00 (0 databases, 0 collections)\n\
         2: alice@c0_2024-01-02_03-04-05 (1 databases, 1 collections)\n"
    );
}

#[test_log::test]
fn restore_without_backups_fails() {
    let cwd = TempDir::new().unwrap();
    let output = clusterdump(&cwd)
        .args(["restore", "--uri", "mongodb://localhost:1"])
        .assert()
        .failure()
        .code(1)
        .get_output()
        .clone();
    assert!(
        stderr(&output).contains("Restore command failed: no backups found"),
        "{output:?}"
    );
}

#[test_log::test]
fn restore_rejects_out_of_range_selection() {
    let cwd = TempDir::new().unwrap();
    archive_with_backups(&cwd);

    let output = clusterdump(&cwd)
        .args(["restore", "--uri", "mongodb://localhost:1", "--log-filter", "off"])
        .write_stdin("3\n")
        .assert()
        .failure()
        .code(1)
        .get_output()
        .clone();

    assert_eq!(
        stdout(&output),
        "Available backup folders:\n\
         1: alice@c0_2024-01-01_00-00-00\n\
         2: alice@c0_2024-01-02_03-04-05\n\
         Enter folder number to restore: "
    );
    assert!(stderr(&output).contains("invalid selection \"3\""), "{output:?}");
}

#[test_log::test]
fn restore_rejects_unknown_mode() {
    let cwd = TempDir::new().unwrap();
    archive_with_backups(&cwd);

    let output = clusterdump(&cwd)
        .args(["restore", "--uri", "mongodb://localhost:1"])
        .write_stdin("2\n3\n")
        .assert()
        .failure()
        .code(1)
        .get_output()
        .clone();
    assert!(stderr(&output).contains("invalid restore mode \"3\""), "{output:?}");
}

#[test_log::test]
fn restore_rejects_unknown_instance_flag() {
    let cwd = TempDir::new().unwrap();
    archive_with_backups(&cwd);

    let output = clusterdump(&cwd)
        .args([
            "restore",
            "--uri",
            "mongodb://localhost:1",
            "--instance",
            "bob@c1_2020-01-01_00-00-00",
            "--mode",
            "append",
        ])
        .assert()
        .failure()
        .code(1)
        .get_output()
        .clone();
    assert!(
        stderr(&output).contains("unknown backup instance \"bob@c1_2020-01-01_00-00-00\""),
        "{output:?}"
    );
}

#[test_log::test]
fn backup_requires_uri() {
    let cwd = TempDir::new().unwrap();
    let output = clusterdump(&cwd).arg("backup").assert().failure().get_output().clone();
    assert!(stderr(&output).contains("--uri"), "{output:?}");
    assert!(!cwd.path().join("exports").exists());
}

#[test_log::test]
fn invalid_json_format() {
    let cwd = TempDir::new().unwrap();
    let output = clusterdump(&cwd)
        .args(["backup", "--uri", "mongodb://localhost:1", "--json-format", "bson"])
        .assert()
        .failure()
        .get_output()
        .clone();
    assert!(stderr(&output).contains("relaxed and canonical"), "{output:?}");
}
