//! Integration tests for toolshed
//!
//! These tests exercise the end-to-end invocation path through the library
//! and the `shed` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use toolshed::config::Config;
use toolshed::orchestrator::Orchestrator;
use toolshed::runner::RunStatus;
use toolshed::tool::{ExecutionRequest, InputField, ToolDefinition};

fn test_config(temp: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.base_dir = temp.path().to_path_buf();
    config
}

fn write_config_file(temp: &TempDir) -> std::path::PathBuf {
    let path = temp.path().join("shed.yml");
    let yaml = format!("storage:\n  base-dir: {}\n", temp.path().join("store").display());
    fs::write(&path, yaml).expect("Failed to write config file");
    path
}

// =============================================================================
// Library Tests
// =============================================================================

#[tokio::test]
async fn test_full_invocation_lifecycle() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let orchestrator = Orchestrator::new(&test_config(&temp)).expect("Failed to open orchestrator");

    // Register
    let tool = ToolDefinition::new("Lookup", "echo resolving {{domain}}").with_field(InputField::new("domain"));
    let id = tool.id.clone();
    orchestrator.registry().add(tool).expect("Failed to register");

    // Run
    let inputs: ExecutionRequest = [("domain".to_string(), "example.com".to_string())].into_iter().collect();
    let invocation = orchestrator.invoke(&id, &inputs).await.expect("Invocation failed");

    assert_eq!(invocation.status, RunStatus::Success);
    assert_eq!(invocation.output.trim(), "resolving example.com");

    // Artifact is readable back through the store
    let stored = orchestrator
        .artifacts()
        .read(&invocation.output_file)
        .expect("Artifact missing");
    assert_eq!(stored, invocation.output);

    // History carries the snapshot
    let records = orchestrator.history().list_by_tool(&id).expect("History read failed");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].tool_name, "Lookup");
    assert_eq!(records[0].inputs.get("domain").map(String::as_str), Some("example.com"));

    // Remove; history survives the tool
    orchestrator.registry().remove(&id).expect("Remove failed");
    assert!(orchestrator.registry().get(&id).expect("Get failed").is_none());
    assert_eq!(orchestrator.history().list_by_tool(&id).expect("History read failed").len(), 1);
}

#[tokio::test]
async fn test_artifact_reads_stay_inside_output_dir() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let orchestrator = Orchestrator::new(&test_config(&temp)).expect("Failed to open orchestrator");

    let secret = temp.path().join("secret.txt");
    fs::write(&secret, "keep out").expect("Failed to write file");

    let err = orchestrator.artifacts().read("../secret.txt").unwrap_err();
    assert!(matches!(err, toolstore::StoreError::AccessDenied { .. }));
}

// =============================================================================
// CLI Tests
// =============================================================================

fn shed(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("shed").expect("Binary not built");
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn test_cli_tools_on_empty_registry() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = write_config_file(&temp);

    shed(&config)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tools registered"));
}

#[test]
fn test_cli_add_run_history_show() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = write_config_file(&temp);

    let definition = temp.path().join("lookup.yml");
    fs::write(
        &definition,
        "id: lookup-1\nname: Lookup\ncommand-template: echo resolving {{domain}}\ninput-fields:\n  - id: domain\n",
    )
    .expect("Failed to write definition");

    shed(&config)
        .args(["add"])
        .arg(&definition)
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered tool: Lookup"));

    shed(&config)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("Lookup"));

    shed(&config)
        .args(["run", "lookup-1", "-i", "domain=example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("resolving example.com"))
        .stdout(predicate::str::contains("Output saved as:"));

    shed(&config)
        .args(["history", "lookup-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lookup"))
        .stdout(predicate::str::contains("resolving example.com"));

    // Find the artifact name from history and cat it back
    let data_dir = temp.path().join("store").join("data");
    let artifact = fs::read_dir(&data_dir)
        .expect("Output dir missing")
        .next()
        .expect("No artifact written")
        .expect("Read dir entry failed")
        .file_name();

    shed(&config)
        .args(["show", &artifact.to_string_lossy()])
        .assert()
        .success()
        .stdout(predicate::str::contains("resolving example.com"));
}

#[test]
fn test_cli_run_unknown_tool_fails() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = write_config_file(&temp);

    shed(&config)
        .args(["run", "no-such-tool"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tool not found"));
}

#[test]
fn test_cli_show_rejects_traversal() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = write_config_file(&temp);

    fs::write(temp.path().join("store").join("secret.txt"), "keep out").ok();

    shed(&config)
        .args(["show", "../secret.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the store"));
}

#[test]
fn test_cli_rm_removes_tool() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = write_config_file(&temp);

    let definition = temp.path().join("t.yml");
    fs::write(&definition, "id: t-1\nname: Transient\ncommand-template: \"true\"\n").expect("Failed to write definition");

    shed(&config).args(["add"]).arg(&definition).assert().success();

    shed(&config)
        .args(["rm", "t-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed tool: Transient"));

    shed(&config)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tools registered"));
}
