//! E2E CLI tests covering the graph-wide commands:
//! - `archlens analyze`, `metrics`, `report`, `cycles`
//! - `archlens export` to stdout and to a file
//! - project config overrides and structured errors
//!
//! Each test runs the `archlens` binary as a subprocess in an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

const FACTS: &str = r#"{
  "containers": [{"path": "/app", "type": "backend", "technology": "python"}],
  "components": [
    {"path": "/app/UserController.py", "name": "UserController", "type": "controller"},
    {"path": "/app/UserService.py", "name": "UserService", "type": "service"},
    {"path": "/app/UserRepository.py", "name": "UserRepository", "type": "repository"},
    {"path": "/app/Database.py", "name": "Database", "type": "model"}
  ],
  "relations": [
    {"from": "UserController", "to": "UserService"},
    {"from": "UserService", "to": "UserRepository"},
    {"from": "UserRepository", "to": "Database"},
    {"from": "Database", "to": "UserRepository"},
    {"from": "Ghost", "to": "Database"}
  ]
}"#;

/// Build a Command targeting the archlens binary, rooted in `dir`.
fn archlens_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("archlens"));
    cmd.current_dir(dir);
    cmd.env("ARCHLENS_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

fn project() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("facts.json"), FACTS).expect("write facts");
    dir
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = archlens_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("command should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

// ---------------------------------------------------------------------------
// Analysis commands
// ---------------------------------------------------------------------------

#[test]
fn analyze_reports_build_metrics_and_quality() {
    let dir = project();
    let json = run_json(dir.path(), &["analyze", "facts.json"]);

    assert_eq!(json["load"]["build"]["nodes"], 5);
    assert_eq!(json["load"]["build"]["containment_edges"], 4);
    assert_eq!(json["load"]["build"]["import_edges"], 4);
    assert_eq!(json["load"]["build"]["dropped_relations"], 1);
    assert!(
        json["load"]["facts_hash"]
            .as_str()
            .is_some_and(|h| h.starts_with("blake3:"))
    );
    assert!(json["load"].get("enrich").is_none());

    assert_eq!(json["stats"]["node_types"]["component"], 4);
    assert_eq!(json["metrics"]["total_nodes"], 5);
    assert_eq!(json["metrics"]["total_edges"], 8);
    assert_eq!(json["dependency_report"]["cycles"]["total_cycles"], 1);
}

#[test]
fn metrics_has_every_category() {
    let dir = project();
    let json = run_json(dir.path(), &["metrics", "facts.json"]);

    for key in [
        "important_components",
        "bottleneck_components",
        "hub_components",
        "communities",
    ] {
        assert!(json[key].is_array(), "{key} should be an array");
    }
    assert_eq!(json["algorithms"]["importance"]["method"], "pagerank");
    assert!(json["algorithms"]["importance"]["fallback_reason"].is_null());
}

#[test]
fn project_config_selects_degree_importance() {
    let dir = project();
    fs::create_dir_all(dir.path().join(".archlens")).expect("mkdir");
    fs::write(
        dir.path().join(".archlens/config.toml"),
        "[metrics]\nimportance = \"degree\"\n",
    )
    .expect("write config");

    let json = run_json(dir.path(), &["metrics", "facts.json"]);
    assert_eq!(json["algorithms"]["importance"]["method"], "degree");
    assert_eq!(json["algorithms"]["importance"]["fallback_reason"], "configured");
}

#[test]
fn report_recommends_breaking_the_cycle() {
    let dir = project();
    let json = run_json(dir.path(), &["report", "facts.json"]);

    assert_eq!(json["cycles"]["severity"], "low");
    assert_eq!(json["cycles"]["cycles"][0]["length"], 2);
    assert_eq!(json["cycles"]["cycles"][0]["severity"], "high");
    assert_eq!(json["recommendations"][0]["priority"], "high");
    assert_eq!(json["recommendations"][0]["category"], "architecture");
    assert!(json["coupling"]["modules"]["/app/UserService.py"].is_object());
}

#[test]
fn cycles_text_lists_members() {
    let dir = project();
    archlens_cmd(dir.path())
        .args(["cycles", "facts.json", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cycle 1 (length 2, high)"))
        .stdout(predicate::str::contains("/app/Database.py"));
}

#[test]
fn yaml_bundle_with_detected_keys_loads() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("facts.yaml"),
        "components_detected:\n  - {path: /a.py, name: A}\n  - {path: /b.py, name: B}\nrelations_detected:\n  - {from: A, to: B}\n",
    )
    .expect("write");

    let json = run_json(dir.path(), &["metrics", "facts.yaml"]);
    assert_eq!(json["total_nodes"], 2);
    assert_eq!(json["total_edges"], 1);
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn export_to_stdout_is_json() {
    let dir = project();
    let output = archlens_cmd(dir.path())
        .args(["export", "facts.json", "--format", "pretty"])
        .output()
        .expect("export");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["nodes"].as_array().map(Vec::len), Some(5));
    assert_eq!(json["edges"].as_array().map(Vec::len), Some(8));
}

#[test]
fn export_to_file_prints_summary() {
    let dir = project();
    let json = run_json(dir.path(), &["export", "facts.json", "--output", "graph.json"]);
    assert_eq!(json["nodes"], 5);
    assert_eq!(json["edges"], 8);

    let written = fs::read_to_string(dir.path().join("graph.json")).expect("export file");
    let export: Value = serde_json::from_str(&written).expect("json");
    assert_eq!(export["content_hash"], json["content_hash"]);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn missing_bundle_is_a_coded_json_error() {
    let dir = TempDir::new().expect("tempdir");
    let output = archlens_cmd(dir.path())
        .args(["metrics", "nope.json", "--json"])
        .output()
        .expect("run");
    assert!(!output.status.success());
    let json: Value = serde_json::from_slice(&output.stderr).expect("stderr json");
    assert_eq!(json["error"]["error_code"], "E1001");
    assert!(json["error"]["suggestion"].is_string());
}

#[test]
fn unsupported_extension_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("facts.txt"), "{}").expect("write");
    archlens_cmd(dir.path())
        .args(["report", "facts.txt", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported fact bundle format"))
        .stderr(predicate::str::contains("suggestion:"));
}

#[test]
fn malformed_bundle_is_a_parse_error() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("facts.json"), "{not json").expect("write");
    let output = archlens_cmd(dir.path())
        .args(["analyze", "facts.json", "--json"])
        .output()
        .expect("run");
    assert!(!output.status.success());
    let json: Value = serde_json::from_slice(&output.stderr).expect("stderr json");
    assert_eq!(json["error"]["error_code"], "E1002");
}

#[test]
fn completions_generate_script() {
    let dir = TempDir::new().expect("tempdir");
    archlens_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("archlens"));
}
