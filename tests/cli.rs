//! Tests for the nesteval binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn nesteval() -> Command {
    Command::cargo_bin("nesteval").unwrap()
}

#[test]
fn test_eval_human() {
    nesteval()
        .args(["eval", "-g", &fixture("gold.xml"), "-p", &fixture("predictions.jsonl")])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Only Boundaries"))
        .stdout(predicate::str::contains("## Classic (Boundary + Type)"))
        .stdout(predicate::str::contains("weighted_avg"))
        .stderr(predicate::str::contains("2 gold documents, 2 prediction records"));
}

#[test]
fn test_eval_json_with_aggregate() {
    let output = nesteval()
        .args([
            "eval",
            "-g",
            &fixture("gold.xml"),
            "-p",
            &fixture("predictions.jsonl"),
            "--format",
            "json",
            "--aggregate",
            "depth",
            "--quiet",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["aggregated"]["key"], "depth");
    assert_eq!(value["aggregated"]["recall"]["GPEs"]["2"], 1.0);
    assert_eq!(value["typed"]["categories"][1]["name"], "Organizations");
    assert_eq!(value["matching"]["aligned_documents"], 2);
}

#[test]
fn test_eval_with_config_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.txt");
    nesteval()
        .args([
            "eval",
            "-g",
            &fixture("gold.xml"),
            "-p",
            &fixture("predictions.jsonl"),
            "-c",
            &fixture("categories.toml"),
            "-o",
            out.to_str().unwrap(),
            "-q",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("NestedOrganizations"));
    assert!(!text.contains("GPEs"));
}

#[test]
fn test_sample() {
    nesteval()
        .args(["sample", "-g", &fixture("gold.xml"), "-p", &fixture("predictions.jsonl")])
        .assert()
        .success()
        .stdout(predicate::str::contains("HEAD CORRECT, FULL SPAN WRONG"))
        .stdout(predicate::str::contains("FULL SPAN CORRECT, HEAD WRONG"))
        .stdout(predicate::str::contains("gold head: Präsident"));
}

#[test]
fn test_breakdown_json() {
    let output = nesteval()
        .args([
            "breakdown",
            "-g",
            &fixture("gold.xml"),
            "-p",
            &fixture("predictions.jsonl"),
            "--format",
            "json",
            "-q",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["tag_length_eval"]["org"]["20"]["count"], 1);
    assert_eq!(value["tag_depth_eval"]["gpe"]["2"]["recall"], 1.0);
    assert!(value["tag_depth_eval"]["gpe"]["2"].get("precision").is_none());
}

#[test]
fn test_missing_gold_file_fails() {
    nesteval()
        .args(["eval", "-g", "/no/such/gold.xml", "-p", &fixture("predictions.jsonl")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ERROR: load gold"));
}

#[test]
fn test_malformed_predictions_fail() {
    let dir = tempfile::tempdir().unwrap();
    let preds = dir.path().join("bad.jsonl");
    fs::write(
        &preds,
        r#"[{"text": "x", "start_pos": 0, "end_pos": 1, "labels": [{"value": "ent", "confidence": 1.0}]}]"#,
    )
    .unwrap();
    nesteval()
        .args(["eval", "-g", &fixture("gold.xml"), "-p", preds.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not of the form key:value"));
}
