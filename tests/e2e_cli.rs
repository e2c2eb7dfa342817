//! CLI end-to-end tests
//!
//! Tests for the cinestream command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the cinestream binary
#[allow(deprecated)]
fn cinestream_cmd() -> Command {
    Command::cargo_bin("cinestream").unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = cinestream_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = cinestream_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cinestream"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = cinestream_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("cinestream "));
}

#[test]
fn test_cli_start_help() {
    let mut cmd = cinestream_cmd();
    cmd.args(["start", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Start the asset server"));
}

#[test]
fn test_cli_inspect_full_asset() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("movie.mp4"), vec![0u8; 1000]).unwrap();

    let mut cmd = cinestream_cmd();
    cmd.args(["inspect", "movie", "--assets"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Size: 1000 bytes"))
        .stdout(predicate::str::contains("Type: video/mp4"))
        .stdout(predicate::str::contains("200 OK"))
        .stdout(predicate::str::contains("Content-Range").not());
}

#[test]
fn test_cli_inspect_range() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("movie.mp4"), vec![0u8; 1000]).unwrap();

    let mut cmd = cinestream_cmd();
    cmd.args(["inspect", "movie", "--range", "bytes=200-299", "--assets"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("206 Partial Content"))
        .stdout(predicate::str::contains("Content-Length: 100"))
        .stdout(predicate::str::contains("Content-Range: bytes 200-299/1000"));
}

#[test]
fn test_cli_inspect_unsatisfiable_range() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("movie.mp4"), vec![0u8; 1000]).unwrap();

    let mut cmd = cinestream_cmd();
    cmd.args(["inspect", "movie", "--range", "bytes=5000-", "--assets"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("416"))
        .stdout(predicate::str::contains("Content-Range: bytes */1000"));
}

#[test]
fn test_cli_inspect_json_output() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("clip.webm"), vec![0u8; 500]).unwrap();

    let mut cmd = cinestream_cmd();
    let output = cmd
        .args(["inspect", "clip", "--json", "--range", "bytes=-100", "--assets"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], 206);
    assert_eq!(json["start"], 400);
    assert_eq!(json["end"], 499);
    assert_eq!(json["length"], 100);
    assert_eq!(json["content_range"], "bytes 400-499/500");
    assert_eq!(json["asset"]["mime_type"], "video/webm");
}

#[test]
fn test_cli_inspect_missing_asset() {
    let dir = tempdir().unwrap();

    let mut cmd = cinestream_cmd();
    cmd.args(["inspect", "nothing-here", "--assets"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Asset not found"));
}

#[test]
fn test_cli_inspect_invalid_id() {
    let mut cmd = cinestream_cmd();
    cmd.args(["inspect", "../etc/passwd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid asset id"));
}

#[test]
fn test_cli_validate_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[server]
host = "127.0.0.1"
port = 9000

[storage]
assets_dir = "/srv/media"
chunk_size = 16384
"#,
    )
    .unwrap();

    let mut cmd = cinestream_cmd();
    cmd.arg("validate")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("127.0.0.1:9000"))
        .stdout(predicate::str::contains("16384"));
}

#[test]
fn test_cli_validate_rejects_zero_chunk_size() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[storage]\nchunk_size = 0\n").unwrap();

    let mut cmd = cinestream_cmd();
    cmd.arg("validate").arg(&config_path).assert().failure();
}

#[test]
fn test_cli_validate_nonexistent_config() {
    let mut cmd = cinestream_cmd();
    cmd.args(["validate", "/nonexistent/cinestream.toml"])
        .assert()
        .failure();
}
