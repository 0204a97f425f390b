//! `hf run` without a duration must stop cleanly on Ctrl-C and still print
//! its final snapshot.

use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn hf_binary() -> std::path::PathBuf {
    assert_cmd::cargo::cargo_bin!("hf").into()
}

#[cfg(unix)]
#[test]
fn run_exits_on_sigint() {
    let dir = TempDir::new().unwrap();
    let child = Command::new(hf_binary())
        .args(["run", "--particles", "200", "--seed", "5"])
        .env("HF_DATA_DIR", dir.path())
        .env_remove("HF_CONFIG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn hf run");

    // Let the tick loop start and install its signal handler
    std::thread::sleep(Duration::from_millis(800));
    unsafe {
        libc::kill(child.id() as libc::pid_t, libc::SIGINT);
    }

    let start = Instant::now();
    let output = child.wait_with_output().expect("wait");
    let elapsed = start.elapsed();

    assert!(
        output.status.success(),
        "hf run should exit 0 on SIGINT, got {}",
        output.status
    );
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["snapshot"]["ticks"].as_u64().unwrap() > 0);
}
