use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const GRANTED: &str = r#"{
    "service": "hdfs_dev",
    "name": "tmp access",
    "resources": {"path": {"values": ["/tmp"]}},
    "policyItems": [{"groups": ["analysts"], "accesses": [{"type": "read"}]}]
}"#;

const USER_WITHOUT_PERMISSION: &str = r#"{
    "service": "hdfs_dev",
    "name": "half done",
    "policyItems": [{"users": ["alice"]}]
}"#;

fn write_doc(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn bastion(store_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bastion").unwrap();
    cmd.env("RUST_LOG", "warn").arg("--store-dir").arg(store_dir);
    cmd
}

fn save(dir: &TempDir, doc: &Path) -> assert_cmd::assert::Assert {
    bastion(&dir.path().join("store"))
        .arg("save")
        .arg(doc)
        .args(["--service-id", "4"])
        .assert()
}

#[test]
fn test_validate_accepts_complete_policy() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "p.json", GRANTED);

    bastion(dir.path())
        .arg("validate")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("Policy can be saved"))
        .stdout(predicate::str::contains("allow"));
}

#[test]
fn test_validate_reports_first_problem() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "p.json", USER_WITHOUT_PERMISSION);

    bastion(dir.path())
        .arg("validate")
        .arg(&doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Blocked (allow)"))
        .stderr(predicate::str::contains(
            "Please add a permission for the selected user.",
        ));
}

#[test]
fn test_validate_json_output() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "p.json", USER_WITHOUT_PERMISSION);

    bastion(dir.path())
        .args(["validate", "--json"])
        .arg(&doc)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"proceed\": false"))
        .stdout(predicate::str::contains("AddUserPermission"));
}

#[test]
fn test_save_then_list() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "p.json", GRANTED);

    save(&dir, &doc)
        .success()
        .stdout(predicate::str::contains("Policy created successfully"))
        .stdout(predicate::str::contains("Stored policy 1"));

    assert!(dir.path().join("store").join("1.json").exists());

    bastion(&dir.path().join("store"))
        .args(["list", "--service", "hdfs_dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tmp access"))
        .stdout(predicate::str::contains("enabled"));
}

#[test]
fn test_save_duplicate_name_shows_store_description() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "p.json", GRANTED);

    save(&dir, &doc).success();
    save(&dir, &doc)
        .failure()
        .stderr(predicate::str::contains("Another policy already exists"));
}

#[test]
fn test_save_blocked_policy_is_not_stored() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "p.json", USER_WITHOUT_PERMISSION);

    save(&dir, &doc)
        .failure()
        .stderr(predicate::str::contains(
            "Please add a permission for the selected user.",
        ));

    assert!(!dir.path().join("store").exists());
}

#[test]
fn test_save_requires_service_name() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "p.json", r#"{"name": "orphan"}"#);

    save(&dir, &doc)
        .failure()
        .stderr(predicate::str::contains("--service"));
}

#[test]
fn test_delete_with_confirmation_flag() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "p.json", GRANTED);
    save(&dir, &doc).success();

    bastion(&dir.path().join("store"))
        .args(["delete", "1", "--service-id", "4", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Policy deleted successfully"));

    assert!(!dir.path().join("store").join("1.json").exists());
}

#[test]
fn test_delete_declined_keeps_policy() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, "p.json", GRANTED);
    save(&dir, &doc).success();

    bastion(&dir.path().join("store"))
        .args(["delete", "1", "--service-id", "4"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Are you sure want to delete ?"))
        .stdout(predicate::str::contains("Nothing deleted"));

    assert!(dir.path().join("store").join("1.json").exists());
}

#[test]
fn test_delete_unknown_policy_fails() {
    let dir = TempDir::new().unwrap();

    bastion(dir.path())
        .args(["delete", "9", "--service-id", "4", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot load policy 9"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = write_doc(&dir, "bastion.toml", "policy_list_route = \"/policies\"\n");
    let doc = write_doc(&dir, "p.json", GRANTED);

    bastion(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("validate")
        .arg(&doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("policy_list_route"));
}
