#![allow(clippy::unwrap_used)]
//! CLI smoke tests to verify basic command functionality.
//!
//! These tests never reach the network: every invocation either stays
//! offline or fails before a request would be sent.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[allow(deprecated)]
fn doubao(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("doubao").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("DOUBAO_API_KEY")
        .env_remove("DOUBAO_MODEL")
        .env_remove("DOUBAO_BASE_URL")
        .env_remove("DOUBAO_PERFORMANCE_MODE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_displays_usage() {
    let home = TempDir::new().unwrap();
    doubao(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--to"))
        .stdout(predicate::str::contains("--style"))
        .stdout(predicate::str::contains("--mode"))
        .stdout(predicate::str::contains("detect"));
}

#[test]
fn test_version_displays_version() {
    let home = TempDir::new().unwrap();
    doubao(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_styles_list_shows_presets() {
    let home = TempDir::new().unwrap();
    doubao(&home)
        .arg("styles")
        .assert()
        .success()
        .stdout(predicate::str::contains("Preset styles"))
        .stdout(predicate::str::contains("formal"))
        .stdout(predicate::str::contains("casual"))
        .stdout(predicate::str::contains("technical"))
        .stdout(predicate::str::contains("creative"));
}

#[test]
fn test_languages_list() {
    let home = TempDir::new().unwrap();
    doubao(&home)
        .arg("languages")
        .assert()
        .success()
        .stdout(predicate::str::contains("en"))
        .stdout(predicate::str::contains("ja"))
        .stdout(predicate::str::contains("zh"));
}

#[test]
fn test_invalid_language_code() {
    let home = TempDir::new().unwrap();
    doubao(&home)
        .args(["--to", "invalid_lang_xyz"])
        .write_stdin("hello")
        .assert()
        .code(exitcode::USAGE)
        .stderr(predicate::str::contains("Invalid language code"));
}

#[test]
fn test_unknown_style_is_a_config_error() {
    let home = TempDir::new().unwrap();
    doubao(&home)
        .args(["--from", "en", "--to", "fr", "--style", "pirate", "hello"])
        .assert()
        .code(exitcode::CONFIG)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_invalid_mode_is_rejected() {
    let home = TempDir::new().unwrap();
    doubao(&home)
        .args(["--mode", "turbo", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("turbo"));
}

#[test]
fn test_help_lists_a_supported_chinese_target() {
    let home = TempDir::new().unwrap();
    doubao(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("zh-TW"))
        .stdout(predicate::str::contains("zh-CN").not());
}

#[test]
fn test_empty_input_is_reported_once() {
    let home = TempDir::new().unwrap();
    doubao(&home)
        .env("DOUBAO_API_KEY", "test-key")
        .write_stdin("   \n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input is empty"))
        .stderr(predicate::str::contains("Error: Input").not());
}

#[test]
fn test_ping_without_api_key() {
    let home = TempDir::new().unwrap();
    doubao(&home)
        .arg("ping")
        .assert()
        .code(exitcode::NOPERM)
        .stderr(predicate::str::contains("DOUBAO_API_KEY"));
}

#[test]
fn test_config_shows_defaults() {
    let home = TempDir::new().unwrap();
    doubao(&home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration"))
        .stdout(predicate::str::contains("balanced"))
        .stdout(predicate::str::contains("not set"));
}

#[test]
fn test_config_init_writes_file_once() {
    let home = TempDir::new().unwrap();
    doubao(&home)
        .args(["config", "--init", "--mode", "fast"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration saved"));

    let saved = std::fs::read_to_string(home.path().join("doubao").join("config.toml")).unwrap();
    assert!(saved.contains("performance_mode = \"fast\""));

    doubao(&home)
        .args(["config", "--init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_file_settings_are_applied() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("doubao");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        "[translator]\nperformance_mode = \"accurate\"\nmax_workers = 9\n",
    )
    .unwrap();

    doubao(&home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("accurate"))
        .stdout(predicate::str::contains("9"));
}
