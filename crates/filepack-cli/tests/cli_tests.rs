//! Integration tests for filepack-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

fn filepack_cmd() -> Command {
    cargo_bin_cmd!("filepack")
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("failed to write fixture");
    path
}

fn add(archive: &Path, file: &Path) {
    filepack_cmd()
        .arg("add")
        .arg(archive)
        .arg(file)
        .assert()
        .success();
}

#[test]
fn test_version_flag() {
    filepack_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("filepack"));
}

#[test]
fn test_help_lists_commands() {
    filepack_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compress"))
        .stdout(predicate::str::contains("extract"));
}

#[test]
fn test_add_list_extract_remove() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("bundle.zip");
    let file = write(temp.path(), "new_file.txt", "New File");

    filepack_cmd()
        .arg("add")
        .arg(&archive)
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added new_file.txt"));

    filepack_cmd()
        .arg("list")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("| new_file.txt"))
        .stdout(predicate::str::contains("Total: 1 members"));

    let out = temp.path().join("out");
    filepack_cmd()
        .arg("extract")
        .arg(&archive)
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Extraction complete"));
    assert_eq!(fs::read_to_string(out.join("new_file.txt")).unwrap(), "New File");

    filepack_cmd()
        .arg("remove")
        .arg(&archive)
        .arg("new_file.txt")
        .assert()
        .success();

    filepack_cmd()
        .arg("list")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("is empty"));
}

#[test]
fn test_add_with_name_to_compressed_tar() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("site.tar.gz");
    let file = write(temp.path(), "index.html", "<html/>");

    filepack_cmd()
        .arg("add")
        .arg(&archive)
        .arg(&file)
        .args(["--name", "public/index.html"])
        .assert()
        .success();

    let out = temp.path().join("out");
    filepack_cmd()
        .arg("extract")
        .arg(&archive)
        .arg(&out)
        .args(["--member", "public/index.html"])
        .assert()
        .success();
    assert!(out.join("public/index.html").exists());
}

#[test]
fn test_duplicate_add_fails_with_hint() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("a.tar");
    let file = write(temp.path(), "a.txt", "a");
    add(&archive, &file);

    filepack_cmd()
        .arg("add")
        .arg(&archive)
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already contains a member"))
        .stderr(predicate::str::contains("HINT"));
}

#[test]
fn test_remove_missing_member_fails() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("a.7z");
    add(&archive, &write(temp.path(), "a.txt", "a"));

    filepack_cmd()
        .arg("remove")
        .arg(&archive)
        .arg("missing.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No member named 'missing.txt'"));
}

#[test]
fn test_compress_decompress_round_trip() {
    let temp = TempDir::new().unwrap();
    let content = "This is a test file for compression.";
    let file = write(temp.path(), "f", content);

    filepack_cmd()
        .arg("compress")
        .arg(&file)
        .args(["-a", "gz", "--in-place"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compressed"));
    assert!(!file.exists());

    let gz = temp.path().join("f.gz");
    filepack_cmd()
        .arg("decompress")
        .arg(&gz)
        .args(["-a", "gzip", "--in-place"])
        .assert()
        .success();
    assert!(!gz.exists());
    assert_eq!(fs::read_to_string(&file).unwrap(), content);
}

#[test]
fn test_compress_refuses_existing_target() {
    let temp = TempDir::new().unwrap();
    let file = write(temp.path(), "notes.txt", "notes");
    write(temp.path(), "notes.txt.xz", "occupied");

    filepack_cmd()
        .arg("compress")
        .arg(&file)
        .args(["-a", "xz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    filepack_cmd()
        .arg("compress")
        .arg(&file)
        .args(["-a", "xz", "--force", "-l", "9"])
        .assert()
        .success();
}

#[test]
fn test_unknown_algorithm_rejected() {
    let temp = TempDir::new().unwrap();
    let file = write(temp.path(), "notes.txt", "notes");

    filepack_cmd()
        .arg("compress")
        .arg(&file)
        .args(["-a", "zstd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported compression algorithm"));
}

#[test]
fn test_info_json() {
    let temp = TempDir::new().unwrap();
    let file = write(temp.path(), "log.txt", &"repeat me ".repeat(2000));

    filepack_cmd()
        .arg("compress")
        .arg(&file)
        .args(["-a", "bz2"])
        .assert()
        .success();

    let output = filepack_cmd()
        .arg("--json")
        .arg("info")
        .arg(temp.path().join("log.txt.bz2"))
        .args(["-a", "bz2"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["operation"], "info");
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["uncompressed_size"], 20_000);
    assert!(json["data"]["compression_ratio"].as_f64().unwrap() > 1.0);
}

#[test]
fn test_list_json() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("a.tar");
    add(&archive, &write(temp.path(), "a.txt", "abc"));

    let output = filepack_cmd()
        .args(["--json", "list"])
        .arg(&archive)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data"]["total_members"], 1);
    assert_eq!(json["data"]["members"][0]["name"], "a.txt");
    assert_eq!(json["data"]["members"][0]["size"], 3);
    assert_eq!(json["data"]["members"][0]["member_type"], "file");
}

#[test]
fn test_list_plain_file_unsupported() {
    let temp = TempDir::new().unwrap();
    let file = write(temp.path(), "notes.txt", "notes");

    filepack_cmd()
        .arg("list")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot run 'get_members'"));
}

#[test]
fn test_unsupported_format() {
    filepack_cmd()
        .arg("list")
        .arg("/nonexistent/archive.rar")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Format not supported"));
}

#[test]
fn test_quiet_suppresses_output() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("a.zip");
    let file = write(temp.path(), "a.txt", "a");

    filepack_cmd()
        .arg("-q")
        .arg("add")
        .arg(&archive)
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_completion_bash() {
    filepack_cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("filepack"));
}
