//! CLI integration tests
//!
//! Run the `formdesk` binary against a temporary store and check what a
//! local operator would see.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("formdesk.yaml");
    let yaml = format!(
        "allowed_projects: [P1234]\nsubmit_project: P1234\nstorage:\n  root: {}\n  public_base_url: http://localhost:5000/files\n  ingest_dir: {}\n",
        dir.path().join("store").display(),
        dir.path().display()
    );
    fs::write(&path, yaml).unwrap();
    path
}

fn run(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_formdesk"))
        .arg("--config")
        .arg(config)
        .args(["--log", "test"])
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "CLI command should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_send_then_fetch_round_trip() {
    // Given: A config pointing at a temporary store
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    // When: A timesheet is requested with JSON output
    let out = stdout(&run(
        &config,
        &["send", "--sender", "alice", "--text", "request timesheet, P1234", "--json"],
    ));
    let reply: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    let uri = reply["attachment_uris"][0].as_str().unwrap().to_string();

    // Then: The URI can be fetched back to a file
    let target = dir.path().join("sheet.xlsx");
    stdout(&run(&config, &["fetch", &uri, "--out", target.to_str().unwrap()]));
    let content = fs::read_to_string(&target).unwrap();
    assert!(content.contains("project: P1234"));
}

#[test]
fn test_send_submission_and_history() {
    // Given: A config and a filled-in workbook on disk
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let sheet = dir.path().join("filled.xlsx");
    fs::write(&sheet, b"filled in").unwrap();
    let attach = format!(
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet={}",
        sheet.display()
    );

    // When: It is submitted twice
    let first = stdout(&run(&config, &["send", "--sender", "alice", "--attach", &attach]));
    let second = stdout(&run(&config, &["send", "--sender", "alice", "--attach", &attach]));

    // Then: Versions advance and history lists both
    assert!(first.contains("(version 1)"));
    assert!(second.contains("(version 2)"));
    let history = stdout(&run(&config, &["history", "--project", "P1234", "--json"]));
    assert_eq!(history.lines().count(), 2);
}

#[test]
fn test_batch_keeps_input_order() {
    // Given: A batch file with a greeting, a bad line and a report request
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let input = dir.path().join("inbox.jsonl");
    fs::write(
        &input,
        concat!(
            "{\"sender\":\"a\",\"text\":\"start\"}\n",
            "not json\n",
            "\n",
            "{\"sender\":\"b\",\"text\":\"report, P1234, 2024\"}\n",
        ),
    )
    .unwrap();

    // When: The batch runs
    let out = stdout(&run(
        &config,
        &["batch", "--input", input.to_str().unwrap(), "--jobs", "2"],
    ));

    // Then: One result per non-blank line, in input order
    let lines: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["line"], 1);
    assert!(lines[0]["reply"]["text"].as_str().unwrap().starts_with("Welcome"));
    assert_eq!(lines[1]["error"]["code"], "ERR_SERIALIZATION");
    assert_eq!(lines[2]["line"], 4);
    assert!(lines[2]["reply"]["attachment_uris"][0]
        .as_str()
        .unwrap()
        .ends_with("report_P1234_2024.xlsx"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    // Given: An existing config
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let out = dir.path().join("generated.yaml");

    // When: init writes a new file twice
    stdout(&run(&config, &["init", "--out", out.to_str().unwrap()]));
    let again = run(&config, &["init", "--out", out.to_str().unwrap()]);

    // Then: The first succeeds with a loadable config and the second refuses
    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("submit_project: P1234"));
    assert!(!again.status.success());
    assert!(String::from_utf8_lossy(&again.stderr).contains("already exists"));
}

#[test]
fn test_fetch_unknown_uri_fails() {
    // Given: An empty store
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    // When: A URI outside the store is fetched
    let output = run(&config, &["fetch", "http://localhost:5000/files/index.db"]);

    // Then: The command fails with a not-found error
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_NOT_FOUND"));
}
