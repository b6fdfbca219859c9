use assert_cmd::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;

const RULES: &str = "tests/fixtures/rules.yaml";
const BAD_RULES: &str = "tests/fixtures/bad_rules.yaml";

/// Isolated from the user's config directory and PATHWARDEN_* variables.
fn pathwarden(config_dir: &Path) -> Command {
    let bin = assert_cmd::cargo::cargo_bin!("pathwarden");
    let mut cmd = Command::new(bin);
    cmd.env_remove("PATHWARDEN_RULES_JSON")
        .env_remove("PATHWARDEN_UNKNOWN_SCOPE")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config_dir.join("config.yaml"));
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("utf8 output");
    serde_json::from_str(&stdout).expect("valid json")
}

#[test]
fn role_rule_allows_matching_path() {
    let dir = tempfile::tempdir().unwrap();
    let assert = pathwarden(dir.path())
        .args(["--rules", RULES, "--output", "json"])
        .args(["check", "--user", "alice", "--role", "editor", "--method", "GET", "/docs/42"])
        .assert()
        .success();

    let value = stdout_json(assert.get_output());
    assert_eq!(value["allowed"], true);
    assert_eq!(value["rev"], 1);
    assert_eq!(value["roles"][0], "editor");
}

#[test]
fn known_user_without_matching_role_is_denied() {
    let dir = tempfile::tempdir().unwrap();
    let assert = pathwarden(dir.path())
        .args(["--rules", RULES])
        .args(["check", "--user", "alice", "--method", "POST", "/home/alice/x"])
        .assert()
        .code(3);

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.starts_with("DENY POST /home/alice/x"), "{stdout}");
}

#[test]
fn unknown_user_fails_open_unless_configured() {
    let dir = tempfile::tempdir().unwrap();
    pathwarden(dir.path())
        .args(["--rules", RULES])
        .args(["check", "--user", "mallory", "/anything"])
        .assert()
        .success();

    std::fs::write(dir.path().join("config.yaml"), "unknown_scope: deny\n").unwrap();
    pathwarden(dir.path())
        .args(["--rules", RULES])
        .args(["check", "--user", "mallory", "/anything"])
        .assert()
        .code(3);
}

#[test]
fn configured_rule_paths_are_used() {
    let dir = tempfile::tempdir().unwrap();
    let rules = std::fs::canonicalize(RULES).unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        format!("rule_paths:\n  - {:?}\n", rules.display().to_string()),
    )
    .unwrap();

    pathwarden(dir.path())
        .args(["check", "--user", "ops", "--role", "ops", "--method", "DELETE", "/sessions/1"])
        .assert()
        .success();
    pathwarden(dir.path())
        .args(["check", "--user", "ops", "--role", "ops", "--method", "delete", "/sessions/1"])
        .assert()
        .code(3);
}

#[test]
fn env_rules_are_layered_on_files() {
    let dir = tempfile::tempdir().unwrap();
    pathwarden(dir.path())
        .env(
            "PATHWARDEN_RULES_JSON",
            r#"{"rules":[{"scope":"auditor","method":"GET","path":"^/audit/"}]}"#,
        )
        .args(["--rules", RULES])
        .args(["check", "--user", "alice", "--role", "auditor", "/audit/2024"])
        .assert()
        .success();
}

#[test]
fn invalid_pattern_fails_the_load() {
    let dir = tempfile::tempdir().unwrap();
    pathwarden(dir.path())
        .args(["--rules", BAD_RULES])
        .args(["check", "--user", "editor", "/docs/1"])
        .assert()
        .code(1);
}

#[test]
fn missing_rule_file_fails_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let typo = dir.path().join("typo-rules.yaml");
    let assert = pathwarden(dir.path())
        .args(["--rules", RULES, "--rules"])
        .arg(&typo)
        .args(["check", "--user", "mallory", "/admin"])
        .assert()
        .code(1);

    assert!(assert.get_output().stdout.is_empty());
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("rule file not found"), "{stderr}");
}

#[test]
fn check_requires_a_user() {
    let dir = tempfile::tempdir().unwrap();
    pathwarden(dir.path())
        .args(["--rules", RULES, "check", "/anything"])
        .assert()
        .code(2);

    // the empty user is still reachable when asked for explicitly
    pathwarden(dir.path())
        .args(["--rules", RULES, "check", "--user", "", "/anything"])
        .assert()
        .success();
}

#[test]
fn validate_reports_each_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing: PathBuf = dir.path().join("missing.yaml");
    let assert = pathwarden(dir.path())
        .args(["--output", "json", "rules", "validate", RULES, BAD_RULES])
        .arg(&missing)
        .assert()
        .code(1);

    let reports = stdout_json(assert.get_output());
    let reports = reports.as_array().expect("report list");
    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0]["ok"], true);
    assert_eq!(reports[0]["rules"], 6);
    assert_eq!(reports[0]["scopes"], 3);
    assert_eq!(reports[1]["ok"], false);
    assert!(reports[1]["error"]
        .as_str()
        .unwrap()
        .contains("invalid path pattern"));
    assert_eq!(reports[2]["error"], "file not found");
}

#[test]
fn show_lists_index_entries() {
    let dir = tempfile::tempdir().unwrap();
    let assert = pathwarden(dir.path())
        .args(["--rules", RULES, "rules", "show"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].contains("6 rules, 3 scopes"), "{stdout}");
    assert!(lines[1].starts_with("alice"));
    assert!(lines[2].starts_with("editor") && lines[2].contains("GET"));
    assert!(stdout.contains("^/cache/  ^/sessions/"));
}

#[test]
fn config_show_reports_effective_rule_paths() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.yaml"), "unknown_scope: deny\n").unwrap();
    let assert = pathwarden(dir.path())
        .args(["--rules", RULES, "--output", "json", "config", "show"])
        .assert()
        .success();

    let value = stdout_json(assert.get_output());
    assert_eq!(value["config"]["unknown_scope"], "deny");
    assert_eq!(value["effective_rule_paths"][0], RULES);

    let assert = pathwarden(dir.path()).args(["config", "path"]).assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.trim(), dir.path().join("config.yaml").display().to_string());
}
