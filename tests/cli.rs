// ABOUTME: Integration tests for the lookout CLI commands.
// ABOUTME: Validates --help output, offline compat reporting and init behavior.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn lookout_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("lookout"))
}

#[test]
fn help_shows_commands() {
    lookout_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("image-ids"))
        .stdout(predicate::str::contains("compat"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn check_rejects_container_with_images() {
    lookout_cmd()
        .args(["check", "nginx", "--container", "web"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn compat_reports_mac_address_unsupported_before_1_44() {
    lookout_cmd()
        .args(["compat", "--api-version", "1.43"])
        .assert()
        .success()
        .stdout(predicate::str::contains("API version: 1.43"))
        .stdout(predicate::str::contains(
            "endpoint-mac-address (requires 1.44): unsupported",
        ));
}

#[test]
fn compat_reports_mac_address_supported_from_1_44() {
    lookout_cmd()
        .args(["compat", "--api-version", "v1.44"])
        .assert()
        .success()
        .stdout(predicate::str::contains("API version: 1.44"))
        .stdout(predicate::str::contains(
            "endpoint-mac-address (requires 1.44): supported",
        ));
}

#[test]
fn compat_treats_garbage_version_as_unsupported() {
    lookout_cmd()
        .args(["compat", "--api-version", "banana"])
        .assert()
        .success()
        .stdout(predicate::str::contains("API version: banana"))
        .stdout(predicate::str::contains(": unsupported"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("lookout.yml");

    lookout_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "ghcr.io/org/app:v1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote lookout.yml"));

    assert!(config_path.exists(), "lookout.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("images:"), "config should list images");
    assert!(content.contains("ghcr.io/org/app:v1"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("lookout.yml");

    fs::write(&config_path, "images: []").unwrap();

    lookout_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(fs::read_to_string(&config_path).unwrap(), "images: []");
}

#[test]
fn init_force_overwrites_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("lookout.yml");

    fs::write(&config_path, "images: []").unwrap();

    lookout_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--force"])
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("nginx:latest"));
}
