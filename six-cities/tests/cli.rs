//! six-cities command-line tests
//!
//! None of these need the real service: they cover argument handling,
//! local validation, the token file and an unreachable server.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to escape path for TOML on Windows
fn escape_path_for_toml(path: &str) -> String {
    path.replace('\\', "\\\\")
}

/// Config pointing at a closed local port with the token file inside the temp dir
fn setup_test_env() -> (TempDir, String, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    let token_path = temp_dir.path().join("data").join("six-cities-token");

    let config_content = format!(
        r#"
[api]
base_url = "http://127.0.0.1:9/six-cities"
timeout_ms = 1000

[storage]
token_path = "{}"
"#,
        escape_path_for_toml(&token_path.to_string_lossy())
    );
    fs::write(&config_path, config_content).unwrap();

    (
        temp_dir,
        config_path.to_string_lossy().to_string(),
        token_path,
    )
}

fn six_cities(config_path: &str) -> Command {
    let mut cmd = Command::cargo_bin("six-cities").unwrap();
    cmd.env("SIX_CITIES_CONFIG", config_path)
        .env_remove("SIX_CITIES_LOG_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("six-cities")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("offers"))
        .stdout(predicate::str::contains("favorite"))
        .stdout(predicate::str::contains("review"))
        .stdout(predicate::str::contains("EXIT CODES"));
}

#[test]
fn test_review_comment_too_short_is_invalid_input() {
    let (_temp_dir, config_path, _) = setup_test_env();

    six_cities(&config_path)
        .args(["review", "1", "--rating", "4", "--comment", "Too short"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Comment must be between 50 and 300 characters"));
}

#[test]
fn test_review_rating_out_of_range() {
    let (_temp_dir, config_path, _) = setup_test_env();
    let comment = "A".repeat(60);

    six_cities(&config_path)
        .args(["review", "1", "--rating", "6", "--comment", &comment])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Rating must be between 1 and 5"));
}

#[test]
fn test_invalid_output_format() {
    let (_temp_dir, config_path, _) = setup_test_env();

    six_cities(&config_path)
        .args(["offers", "--format", "xml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid format 'xml'"));
}

#[test]
fn test_invalid_sort_option() {
    let (_temp_dir, config_path, _) = setup_test_env();

    six_cities(&config_path)
        .args(["offers", "--sort", "cheapest"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid sort option"));
}

#[test]
fn test_unknown_city() {
    let (_temp_dir, config_path, _) = setup_test_env();

    six_cities(&config_path)
        .args(["offers", "--city", "Atlantis"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Valid cities: Paris, Cologne"));
}

#[test]
fn test_invalid_log_format() {
    let (_temp_dir, config_path, _) = setup_test_env();

    six_cities(&config_path)
        .args(["--log-format", "xml", "logout"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid log format"));
}

#[test]
fn test_logout_removes_token_file() {
    let (_temp_dir, config_path, token_path) = setup_test_env();
    fs::create_dir_all(token_path.parent().unwrap()).unwrap();
    fs::write(&token_path, "stored-token").unwrap();

    six_cities(&config_path)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));

    assert!(!token_path.exists());
}

#[test]
fn test_logout_without_token_succeeds() {
    let (_temp_dir, config_path, _) = setup_test_env();

    six_cities(&config_path).arg("logout").assert().success();
}

#[test]
fn test_commands_needing_session_exit_unauthorized() {
    let (_temp_dir, config_path, _) = setup_test_env();

    for args in [
        vec!["whoami"],
        vec!["favorites"],
        vec!["favorite", "1", "--on"],
    ] {
        six_cities(&config_path)
            .args(&args)
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Not signed in"));
    }
}

#[test]
fn test_login_requires_password() {
    let (_temp_dir, config_path, token_path) = setup_test_env();

    six_cities(&config_path)
        .args(["login", "user@example.com"])
        .write_stdin("   \n")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Email and password are required"));

    assert!(!token_path.exists());
}

#[test]
fn test_unreachable_server_reports_network_error() {
    let (_temp_dir, config_path, _) = setup_test_env();

    six_cities(&config_path)
        .arg("offers")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load offers"))
        .stderr(predicate::str::contains(
            "No response from server. Please check your connection.",
        ));
}

#[test]
fn test_favorite_requires_on_or_off() {
    Command::cargo_bin("six-cities")
        .unwrap()
        .args(["favorite", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--on"));
}
