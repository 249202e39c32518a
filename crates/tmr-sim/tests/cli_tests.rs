//! Integration tests for the tmr-sim binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn tmr_sim() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("tmr-sim")?;
    cmd.env_remove("RUST_LOG").env_remove("TMR_SIM_CONFIG");
    Ok(cmd)
}

fn run_json(args: &[&str]) -> Result<Value, Box<dyn std::error::Error>> {
    let output = tmr_sim()?
        .args(["--json", "--period-ms", "0", "--seed", "11"])
        .args(args)
        .output()?;
    assert!(output.status.success(), "tmr-sim failed: {output:?}");
    Ok(serde_json::from_slice(&output.stdout)?)
}

#[test]
fn test_cli_help() -> TestResult {
    tmr_sim()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--malformed-every"));
    Ok(())
}

#[test]
fn test_healthy_json_report() -> TestResult {
    let report = run_json(&["--cycles", "30"])?;
    assert_eq!(report["success"], true);
    assert_eq!(report["report"]["voter"]["voted"], 30);
    assert_eq!(report["report"]["monitor"]["results"], 30);
    assert_eq!(report["report"]["final_state"], "ALL_SENSORS_OK");
    assert_eq!(report["report"]["transitions"].as_array().map(Vec::len), Some(3));
    Ok(())
}

#[test]
fn test_stuck_sensor_reported() -> TestResult {
    let report = run_json(&["--cycles", "20", "--fault", "stuck"])?;
    assert_eq!(report["report"]["final_state"], "ONE_SENSOR_FAIL");
    assert_eq!(report["report"]["transitions"][0]["suspect"], "sensor1");
    Ok(())
}

#[test]
fn test_malformed_records_counted() -> TestResult {
    let report = run_json(&["--cycles", "20", "--malformed-every", "4", "--window", "5"])?;
    assert_eq!(report["report"]["voter"]["discarded"], 5);
    assert_eq!(report["report"]["voter"]["voted"], 20);
    assert_eq!(report["report"]["transitions"].as_array().map(Vec::len), Some(4));
    Ok(())
}

#[test]
fn test_human_report() -> TestResult {
    tmr_sim()?
        .args(["--cycles", "10", "--period-ms", "0", "--seed", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Final state:"))
        .stdout(predicate::str::contains("ALL_SENSORS_OK"));
    Ok(())
}

#[test]
fn test_config_file_with_flag_override() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("voter.yaml");
    fs::write(&path, "mask: 255\nwindow_len: 2\nreceive_timeout_ms: 50\n")?;
    let path = path.to_str().ok_or("non-utf8 temp path")?;

    let report = run_json(&["--cycles", "8", "--config", path, "--window", "4"])?;
    assert_eq!(report["report"]["config"]["mask"], 255);
    assert_eq!(report["report"]["config"]["window_len"], 4);
    assert_eq!(report["report"]["config"]["receive_timeout_ms"], 50);
    assert_eq!(report["report"]["transitions"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[test]
fn test_invalid_window_fails() -> TestResult {
    tmr_sim()?
        .args(["--window", "0", "--cycles", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("window_len must be greater than 0"));
    Ok(())
}

#[test]
fn test_zero_mask_votes_zero() -> TestResult {
    let report = run_json(&["--cycles", "10", "--mask", "0", "--fault", "chaos"])?;
    assert_eq!(report["report"]["config"]["mask"], 0);
    assert_eq!(report["report"]["monitor"]["last_result"], 0);
    assert_eq!(report["report"]["final_state"], "ALL_SENSORS_OK");
    Ok(())
}

#[test]
fn test_missing_config_file_fails() -> TestResult {
    tmr_sim()?
        .args(["--config", "/nonexistent/voter.yaml", "--json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"success\": false"));
    Ok(())
}
