//! Binary-level checks of flag wiring, exit codes and seeded runs
//!
//! Every test runs in its own temp directory with the LEARNSPHERE_*
//! overrides removed, so no config file or ambient setting leaks in. None of
//! them reach the network.

use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn learnsphere(dir: &TempDir) -> Command {
    // Stops config discovery at the temp dir
    std::fs::create_dir_all(dir.path().join(".git")).unwrap();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("learnsphere"));
    cmd.current_dir(dir.path())
        .env_remove("LEARNSPHERE_MODEL")
        .env_remove("LEARNSPHERE_LLM_PROVIDER")
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_config_command_shows_sources() {
    let dir = TempDir::new().unwrap();

    learnsphere(&dir)
        .args(["config", "--model", "gemini-2.5-pro"])
        .assert()
        .success()
        .stdout(predicate::str::contains("model = gemini-2.5-pro (cli)"))
        .stdout(predicate::str::contains("llm_provider = gemini"));
}

#[test]
fn test_config_command_json() {
    let dir = TempDir::new().unwrap();

    let output = learnsphere(&dir)
        .args(["config", "--json", "--timeout", "60"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["request_timeout"]["value"], "60s");
    assert_eq!(json["request_timeout"]["source"], "cli");
}

#[test]
fn test_config_file_is_discovered_from_working_directory() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join(".learnsphere")).unwrap();
    write(
        &dir,
        ".learnsphere/config.toml",
        "[defaults]\nmodel = \"from-file\"\n",
    );

    learnsphere(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("model = from-file"));
}

#[test]
fn test_out_of_range_temperature_exits_with_cli_args_code() {
    let dir = TempDir::new().unwrap();

    learnsphere(&dir)
        .args(["config", "--temperature", "3.5"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("temperature"));
}

#[test]
fn test_explicit_missing_config_file_exits_with_cli_args_code() {
    let dir = TempDir::new().unwrap();

    learnsphere(&dir)
        .args(["config", "--config", "absent.toml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration file not found at absent.toml"));
}

#[test]
fn test_seed_spec_requires_seed_code() {
    let dir = TempDir::new().unwrap();

    learnsphere(&dir)
        .args(["generate", "https://youtu.be/abc12345678", "--seed-spec", "spec.txt"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--seed-code"));
}

#[test]
fn test_seeded_generate_emits_code_without_model_call() {
    let dir = TempDir::new().unwrap();
    let spec = write(&dir, "spec.txt", "Build a quiz.");
    let code = write(&dir, "app.html", "<html>quiz</html>");

    learnsphere(&dir)
        .args(["generate", "https://youtu.be/abc12345678", "--seed-spec"])
        .arg(&spec)
        .arg("--seed-code")
        .arg(&code)
        .assert()
        .success()
        .stdout(predicate::str::contains("<html>quiz</html>"))
        .stdout(predicate::str::contains("Build a quiz.").not());
}

#[test]
fn test_seeded_generate_emits_status_and_json() {
    let dir = TempDir::new().unwrap();
    let spec = write(&dir, "spec.txt", "Build a quiz.");
    let code = write(&dir, "app.html", "<html>quiz</html>");

    learnsphere(&dir)
        .args(["generate", "u", "--emit", "status", "--seed-spec"])
        .arg(&spec)
        .arg("--seed-code")
        .arg(&code)
        .assert()
        .success()
        .stdout(predicate::eq("ready\n"));

    let output = learnsphere(&dir)
        .args(["generate", "u", "--json", "--seed-spec"])
        .arg(&spec)
        .arg("--seed-code")
        .arg(&code)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["run_state"], "ready");
    assert_eq!(json["spec"], "Build a quiz.");
    assert_eq!(json["is_busy"], false);
}

#[test]
fn test_code_edit_on_seeded_run_replaces_document() {
    let dir = TempDir::new().unwrap();
    let spec = write(&dir, "spec.txt", "Build a quiz.");
    let code = write(&dir, "app.html", "<html>quiz</html>");
    let edited = write(&dir, "edited.html", "<html>edited</html>");

    learnsphere(&dir)
        .args(["generate", "u", "--seed-spec"])
        .arg(&spec)
        .arg("--seed-code")
        .arg(&code)
        .arg("--edit-code")
        .arg(&edited)
        .assert()
        .success()
        .stdout(predicate::str::contains("<html>edited</html>"));
}

#[test]
fn test_unchanged_spec_edit_makes_no_model_call() {
    let dir = TempDir::new().unwrap();
    let spec = write(&dir, "spec.txt", "Build a quiz.");
    let code = write(&dir, "app.html", "<html>quiz</html>");
    let same = write(&dir, "same.txt", "  Build a quiz.\n");

    learnsphere(&dir)
        .args(["generate", "u", "--emit", "both", "--seed-spec"])
        .arg(&spec)
        .arg("--seed-code")
        .arg(&code)
        .arg("--edit-spec")
        .arg(&same)
        .assert()
        .success()
        .stdout(predicate::str::contains("Build a quiz."))
        .stdout(predicate::str::contains("----- code -----"))
        .stdout(predicate::str::contains("<html>quiz</html>"));
}

#[test]
fn test_unreadable_seed_file_exits_with_cli_args_code() {
    let dir = TempDir::new().unwrap();

    learnsphere(&dir)
        .args([
            "generate",
            "u",
            "--seed-spec",
            "missing.txt",
            "--seed-code",
            "missing.html",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--seed-spec"));
}

#[test]
fn test_missing_api_key_fails_code_command_with_cli_args_code() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "config.toml",
        "[llm.gemini]\napi_key_env = \"LEARNSPHERE_TEST_KEY_THAT_IS_NEVER_SET\"\n",
    );
    let spec = write(&dir, "spec.txt", "Build a quiz.");

    learnsphere(&dir)
        .env_remove("LEARNSPHERE_TEST_KEY_THAT_IS_NEVER_SET")
        .args(["code", "--config", "config.toml"])
        .arg(&spec)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("LEARNSPHERE_TEST_KEY_THAT_IS_NEVER_SET"));
}

#[test]
fn test_unknown_provider_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let spec = write(&dir, "spec.txt", "Build a quiz.");

    learnsphere(&dir)
        .args(["code", "--provider", "openrouter"])
        .arg(&spec)
        .assert()
        .failure()
        .stderr(predicate::str::contains("openrouter"));
}
