use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const REPORT: &str = "Welcome to the CBC MILP Solver
Result - Optimal solution found
---shortest_paths
origin,destination,shortest_path_cost
1,3,8.8
---infrastructures
arc,infrastructure,construction_cost
arc_1_2,1,20
arc_2_3,1,20
---demand_transfered
origin,destination,demand_transfered,z,j_value
1,3,30,1,1
---total_demand_transfered
total_demand_transfered
30
---budget_used
budget_used
40
---
";

fn write_model(dir: &Path, budget: f64) -> PathBuf {
    let model = json!({
        "nodes": [{"id": "1"}, {"id": "2"}, {"id": "3"}],
        "arcs": [
            {"source": "1", "destination": "2", "construction_cost": 10.0, "user_cost": 5.0},
            {"source": "2", "destination": "3", "construction_cost": 10.0, "user_cost": 5.0},
            {"source": "1", "destination": "3", "construction_cost": 100.0, "user_cost": 20.0}
        ],
        "odpairs": [{"origin": "1", "destination": "3", "demand": 60.0}],
        "breakpoints": [
            {"transfer_fraction": 0.0, "cost_improvement_fraction": 1.0},
            {"transfer_fraction": 0.5, "cost_improvement_fraction": 0.9},
            {"transfer_fraction": 1.0, "cost_improvement_fraction": 0.76}
        ],
        "budget": budget,
        "infrastructure_count": 3
    });
    let path = dir.join("model.json");
    fs::write(&path, serde_json::to_string_pretty(&model).unwrap()).unwrap();
    path
}

fn write_report(dir: &Path) -> PathBuf {
    let path = dir.join("stdout.cbc");
    fs::write(&path, REPORT).unwrap();
    path
}

fn bcn() -> Command {
    Command::cargo_bin("bcn-cli").unwrap()
}

#[test]
fn export_writes_mathprog_data() {
    let tmp = tempdir().unwrap();
    let model = write_model(tmp.path(), 40.0);
    let out = tmp.path().join("data.dat");

    bcn()
        .args([
            "export",
            "--model",
            model.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 3 arcs"));

    let data = fs::read_to_string(&out).unwrap();
    assert!(data.starts_with("data;"));
    assert!(data.contains("set OD"));
    assert!(data.trim_end().ends_with("end;"));
}

#[test]
fn decode_writes_solution_json() {
    let tmp = tempdir().unwrap();
    let model = write_model(tmp.path(), 40.0);
    let report = write_report(tmp.path());
    let out = tmp.path().join("solution.json");

    bcn()
        .args([
            "decode",
            "--model",
            model.to_str().unwrap(),
            "--report",
            report.to_str().unwrap(),
            "--solver",
            "cbc",
            "--timeout",
            "60",
            "--out",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Solver: CBC"));

    let solution: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(solution["data"]["budget_used"], json!(40.0));
    assert_eq!(solution["data"]["infrastructures"].as_array().unwrap().len(), 2);
    assert_eq!(solution["run"]["did_timeout"], json!(false));
}

#[test]
fn validate_accepts_consistent_solution() {
    let tmp = tempdir().unwrap();
    let model = write_model(tmp.path(), 40.0);
    let report = write_report(tmp.path());

    bcn()
        .args([
            "validate",
            "--model",
            model.to_str().unwrap(),
            "--report",
            report.to_str().unwrap(),
            "--format",
            "csv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("no errors"));
}

#[test]
fn validate_flags_unspent_budget() {
    let tmp = tempdir().unwrap();
    let model = write_model(tmp.path(), 100.0);
    let report = write_report(tmp.path());

    bcn()
        .args([
            "validate",
            "--model",
            model.to_str().unwrap(),
            "--report",
            report.to_str().unwrap(),
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("budget_excess:"))
        .stdout(predicate::str::contains("arc_1_2"));
}

#[test]
fn validate_honors_config_tolerance() {
    let tmp = tempdir().unwrap();
    let model = write_model(tmp.path(), 100.0);
    let report = write_report(tmp.path());
    let config = tmp.path().join("validation.toml");
    fs::write(&config, "budget_tolerance = 100.0\n").unwrap();

    bcn()
        .args([
            "validate",
            "--model",
            model.to_str().unwrap(),
            "--report",
            report.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .success();
}

#[test]
fn breakpoints_prints_json() {
    let output = bcn()
        .args(["breakpoints", "--function", "linear", "--count", "4", "--m", "0.4"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let breakpoints: Value = serde_json::from_slice(&output).unwrap();
    let list = breakpoints.as_array().unwrap();
    assert_eq!(list.len(), 4);
    assert_eq!(list[3]["cost_improvement_fraction"], json!(0.4));
}

#[test]
fn breakpoints_requires_ratio() {
    bcn()
        .args(["breakpoints", "--function", "sad", "--count", "4"])
        .assert()
        .failure();
}

#[test]
fn breakpoints_rejects_unknown_function() {
    bcn()
        .args(["breakpoints", "--function", "cubic", "--count", "4", "--infrastructures", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown transfer function"));
}

#[test]
fn missing_model_fails() {
    bcn()
        .args(["export", "--model", "does/not/exist.json", "--out", "x.dat"])
        .assert()
        .code(2);
}
