//! CLI command integration tests.
//! Each test points HF_DATA_DIR at a temp directory so no user config leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn hf_cmd(data_dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("hf").unwrap();
    cmd.env("HF_DATA_DIR", data_dir.path());
    cmd.env_remove("HF_CONFIG");
    cmd
}

fn run_json(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = hf_cmd(dir).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn config_prints_defaults() {
    let dir = TempDir::new().unwrap();
    hf_cmd(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("# source: built-in defaults"))
        .stdout(predicate::str::contains("hand_timeout_ms = 800.0"))
        .stdout(predicate::str::contains("[physics]"));
}

#[test]
fn config_picks_up_data_dir_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "tier = \"high\"\n").unwrap();
    hf_cmd(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"))
        .stdout(predicate::str::contains("tier = \"high\""));
}

#[test]
fn invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[occlusion]\nmax_fade = 2.0\n").unwrap();
    hf_cmd(&dir)
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_fade"));
}

#[test]
fn shape_writes_requested_point_count() {
    let dir = TempDir::new().unwrap();
    let value = run_json(&dir, &["shape", "star", "--count", "300", "--seed", "9"]);
    assert_eq!(value["shape"], "star");
    assert_eq!(value["count"], 300);
    assert_eq!(value["points"].as_array().unwrap().len(), 300);
}

#[test]
fn shape_to_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("heart.json");
    hf_cmd(&dir)
        .args(["shape", "heart", "--count", "64", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote 64 heart points"));
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value["points"].as_array().unwrap().len(), 64);
}

#[test]
fn unknown_shape_is_usage_error() {
    let dir = TempDir::new().unwrap();
    hf_cmd(&dir)
        .args(["shape", "cube"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown shape"));
}

#[test]
fn demo_then_classify_commits_every_gesture() {
    let dir = TempDir::new().unwrap();
    let rec = dir.path().join("demo.jsonl");
    hf_cmd(&dir)
        .args(["demo", "--seconds", "8", "--fps", "20"])
        .arg(&rec)
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote 161 frames"));

    hf_cmd(&dir)
        .arg("classify")
        .arg(&rec)
        .assert()
        .success()
        .stdout(predicate::str::contains("-> sphere"))
        .stdout(predicate::str::contains("-> text"))
        .stdout(predicate::str::contains("-> star"))
        .stdout(predicate::str::contains("-> heart"))
        .stdout(predicate::str::contains("-> ring"))
        .stdout(predicate::str::contains("no-hand"))
        .stdout(predicate::str::contains("commits: 5"));
}

#[test]
fn classify_reports_bad_recording_line() {
    let dir = TempDir::new().unwrap();
    let rec = dir.path().join("bad.jsonl");
    std::fs::write(&rec, "{\"timestampMs\":0}\nnot json\n").unwrap();
    hf_cmd(&dir)
        .arg("classify")
        .arg(&rec)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn run_scripted_prints_snapshot() {
    let dir = TempDir::new().unwrap();
    let value = run_json(
        &dir,
        &[
            "run",
            "--duration",
            "0.6",
            "--particles",
            "400",
            "--seed",
            "1",
        ],
    );
    let snap = &value["snapshot"];
    assert_eq!(snap["particleCount"], 400);
    assert!(snap["ticks"].as_u64().unwrap() > 5);
    assert_eq!(snap["shape"], "sphere");
    assert_eq!(value["commits"][0]["shape"], "sphere");
    assert_eq!(value["inference"]["fatal"], false);
}

#[test]
fn run_replays_recording() {
    let dir = TempDir::new().unwrap();
    let rec = dir.path().join("demo.jsonl");
    hf_cmd(&dir)
        .args(["demo", "--seconds", "2"])
        .arg(&rec)
        .assert()
        .success();

    let rec_arg = rec.to_string_lossy().into_owned();
    let value = run_json(
        &dir,
        &[
            "run",
            "--recording",
            &rec_arg,
            "--duration",
            "0.5",
            "--tier",
            "low",
        ],
    );
    assert_eq!(value["snapshot"]["particleCount"], 4000);
    assert_eq!(value["snapshot"]["shape"], "sphere");
    assert!(value["framesTaken"].as_u64().unwrap() > 0);
}

#[test]
fn run_survives_estimator_running_out_of_resources() {
    let dir = TempDir::new().unwrap();
    let value = run_json(
        &dir,
        &[
            "run",
            "--duration",
            "0.5",
            "--particles",
            "200",
            "--call-budget",
            "3",
        ],
    );
    assert_eq!(value["inference"]["fatal"], true);
    assert_eq!(value["inference"]["completed"], 3);
    assert_eq!(value["snapshot"]["hand"]["present"], false);
    assert!(value["snapshot"]["ticks"].as_u64().unwrap() > 5);
}

#[test]
fn bad_tier_is_usage_error() {
    let dir = TempDir::new().unwrap();
    hf_cmd(&dir)
        .args(["run", "--tier", "ultra"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown tier"));
}

#[test]
fn run_rejects_bad_duration_and_rates() {
    let dir = TempDir::new().unwrap();
    for args in [
        ["run", "--particles", "10", "--duration=-1"],
        ["run", "--particles", "10", "--duration=nan"],
    ] {
        hf_cmd(&dir)
            .args(args)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("--duration must be"))
            .stderr(predicate::str::contains("panicked").not());
    }
    hf_cmd(&dir)
        .args(["run", "--particles", "10", "--duration", "1", "--fps", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--fps must be positive"));
    hf_cmd(&dir)
        .args(["run", "--particles", "10", "--duration", "1", "--infer-hz", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--infer-hz must be positive"));
}
