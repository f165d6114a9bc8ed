use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Minimal config for sim mode; fast loop and an ephemeral server port
fn write_config(dir: &tempfile::TempDir, extra: &str) -> PathBuf {
    let www = dir.path().join("www");
    fs::create_dir_all(&www).unwrap();
    fs::write(www.join("dashboard.html"), "<html></html>").unwrap();
    let toml = format!(
        r#"
[bin]
height_cm = 40.0

[server]
port = 0
assets_dir = "{}"

[loop]
tick_ms = 20
{extra}
"#,
        www.display()
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn smartbin(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("smartbin_cli").unwrap();
    cmd.env_remove("SMARTBIN_SIM_LID_CM")
        .env_remove("SMARTBIN_SIM_FILL_CM")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(cfg);
    cmd
}

#[rstest]
fn help_lists_subcommands() {
    Command::cargo_bin("smartbin_cli")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("self-check"))
        .stdout(predicate::str::contains("run"));
}

#[rstest]
#[case(None, "fill level: 0.0% (OK)")]
#[case(Some("10"), "fill level: 75.0% (WARNING)")]
#[case(Some("4"), "fill level: 90.0% (FULL)")]
fn self_check_reports_simulated_fill(#[case] fill_cm: Option<&str>, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let mut cmd = smartbin(&cfg);
    if let Some(cm) = fill_cm {
        cmd.env("SMARTBIN_SIM_FILL_CM", cm);
    }
    cmd.arg("self-check")
        .assert()
        .success()
        .stdout(predicate::str::contains(needle))
        .stdout(predicate::str::contains("lid: no reading"))
        .stdout(predicate::str::contains("self-check ok"));
}

#[rstest]
fn self_check_json_is_machine_readable() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    let out = smartbin(&cfg)
        .env("SMARTBIN_SIM_FILL_CM", "20")
        .env("SMARTBIN_SIM_LID_CM", "10")
        .args(["--json", "self-check"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json stdout");
    assert_eq!(v["fill_percentage"], 50.0);
    assert_eq!(v["status"], "WARNING");
    assert_eq!(v["lid_cm"], 10.0);
}

#[rstest]
fn bounded_run_exits_cleanly() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    smartbin(&cfg)
        .env("SMARTBIN_SIM_LID_CM", "15")
        .args(["run", "--max-ticks", "5", "--port", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status page on port"))
        .stdout(predicate::str::contains("stopped after 5 ticks (0 faults)"));
}

#[rstest]
#[case("[bin]\nhalf_threshold = 90.0\nfull_threshold = 80.0\n", "half_threshold")]
#[case("[loop]\ntick_ms = 0\n", "loop.tick_ms")]
#[case("[bin\n", "invalid configuration")]
fn invalid_config_exits_2(#[case] toml: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, toml).unwrap();
    smartbin(&path)
        .arg("self-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("What happened: Configuration"))
        .stderr(predicate::str::contains(needle));
}

#[rstest]
fn missing_config_file_exits_2() {
    let dir = tempdir().unwrap();
    smartbin(&dir.path().join("nope.toml"))
        .arg("self-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("read config"));
}

#[rstest]
fn garbage_sim_distance_is_a_config_error() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");
    smartbin(&cfg)
        .env("SMARTBIN_SIM_FILL_CM", "lots")
        .arg("self-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("SMARTBIN_SIM_FILL_CM"));
}

#[rstest]
fn json_errors_are_structured() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[alert]\ncooldown_s = 0\n").unwrap();
    let out = smartbin(&path)
        .args(["--json", "self-check"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    let line = stderr
        .lines()
        .rev()
        .find(|l| l.starts_with('{') && l.contains("\"reason\""))
        .expect("json error line");
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["reason"], "ConfigInvalid");
    assert_eq!(v["exit_code"], 2);
}
