//! Integration tests for cortexkey-cli.
//!
//! Each test runs the built `cortexkey` binary against files in a temporary
//! directory, always with an explicit `--config` so the user's own
//! configuration never leaks in.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::Value;

/// Helper to get the path to the `cortexkey` binary built by cargo.
fn cortexkey_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cortexkey"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.toml");
    let output = cortexkey_bin()
        .args(["config", "init", "--config"])
        .arg(&path)
        .output()
        .expect("failed to run cortexkey config init");
    assert!(output.status.success(), "config init failed");
    path
}

fn generate(dir: &Path, name: &str, extra: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let output = cortexkey_bin()
        .arg("generate")
        .arg(&path)
        .args(extra)
        .output()
        .expect("failed to run cortexkey generate");
    assert!(
        output.status.success(),
        "generate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    path
}

fn json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line is not JSON"))
        .collect()
}

fn derive(config: &Path, recording: &Path, extra: &[&str]) -> Output {
    cortexkey_bin()
        .arg("derive")
        .arg(recording)
        .arg("--config")
        .arg(config)
        .args(extra)
        .output()
        .expect("failed to run cortexkey derive")
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

#[test]
fn cli_generate_writes_feed_messages() {
    let dir = tempfile::tempdir().unwrap();
    let path = generate(dir.path(), "rec.jsonl", &["--ticks", "5", "--timestamps"]);

    let text = std::fs::read_to_string(path).unwrap();
    let lines: Vec<Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0]["channels"].as_array().unwrap().len(), 8);
    assert_eq!(lines[0]["channels"][7]["value"], 8.0);
    assert_eq!(lines[4]["timestamp"], 0.2);
}

// ---------------------------------------------------------------------------
// derive
// ---------------------------------------------------------------------------

#[test]
fn cli_derive_repeated_keys_are_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let recording = generate(dir.path(), "rec.jsonl", &["--ticks", "40"]);

    let output = derive(&config, &recording, &["--count", "2"]);
    assert!(
        output.status.success(),
        "derive failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["status"], "success");
    assert_eq!(lines[0]["message"], "Success");
    assert_eq!(lines[0]["key_length"], 2732);
    assert_eq!(lines[0]["brain_key"], lines[1]["brain_key"]);
    assert_eq!(lines[1]["consistency"], 100.0);

    let status = &lines[2];
    assert_eq!(status["buffer_ready"], true);
    assert_eq!(status["is_processing"], false);
    assert_eq!(status["key_history_count"], 2);
    assert_eq!(status["last_key_preview"].as_str().unwrap().len(), 32);
}

#[test]
fn cli_derive_same_recording_same_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let recording = generate(dir.path(), "eeg.jsonl", &["--mode", "eeg", "--ticks", "60"]);

    let first = json_lines(&derive(&config, &recording, &[]));
    let second = json_lines(&derive(&config, &recording, &[]));
    assert_eq!(first[0]["brain_key"], second[0]["brain_key"]);
}

#[test]
fn cli_derive_tolerance_changes_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let recording = generate(dir.path(), "eeg.jsonl", &["--mode", "eeg", "--ticks", "40"]);

    let fine = json_lines(&derive(&config, &recording, &["--tolerance", "5"]));
    let coarse = json_lines(&derive(&config, &recording, &["--tolerance", "80"]));
    assert_ne!(fine[0]["brain_key"], coarse[0]["brain_key"]);
}

#[test]
fn cli_derive_short_recording_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let recording = generate(dir.path(), "short.jsonl", &["--ticks", "10"]);

    let output = derive(&config, &recording, &[]);
    assert!(!output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines[0]["status"], "error");
    assert_eq!(
        lines[0]["message"],
        "Insufficient data. Need 2 seconds of EEG data."
    );
    assert_eq!(lines[1]["key_history_count"], 0);
}

#[test]
fn cli_derive_skips_malformed_lines() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let recording = generate(dir.path(), "rec.jsonl", &["--ticks", "40"]);

    let mut text = std::fs::read_to_string(&recording).unwrap();
    text.insert_str(0, "not json\n{\"channels\": [{\"value\": 1}]}\n");
    std::fs::write(&recording, text).unwrap();

    let output = derive(&config, &recording, &[]);
    assert!(output.status.success());
    assert_eq!(json_lines(&output)[0]["status"], "success");
}

#[test]
fn cli_derive_reads_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let recording = generate(dir.path(), "rec.jsonl", &["--ticks", "40"]);

    let mut child = cortexkey_bin()
        .args(["derive", "-", "--config"])
        .arg(&config)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(&std::fs::read(&recording).unwrap())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert_eq!(json_lines(&output)[0]["status"], "success");
}

#[test]
fn cli_logs_stay_off_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let recording = generate(dir.path(), "rec.jsonl", &["--ticks", "40"]);

    let output = derive(&config, &recording, &["--log-level", "debug"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("generated brain key"));
    json_lines(&output);
}

// ---------------------------------------------------------------------------
// stream
// ---------------------------------------------------------------------------

#[test]
fn cli_stream_derives_every_n_ticks() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let recording = generate(dir.path(), "rec.jsonl", &["--ticks", "100"]);

    let output = cortexkey_bin()
        .args(["stream", "--every", "20", "--input"])
        .arg(&recording)
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let lines = json_lines(&output);
    let keys: Vec<&Value> = lines.iter().filter(|l| l["status"] == "success").collect();
    // Ready at tick 40; derivations at 40, 60, 80, 100.
    assert_eq!(keys.len(), 4);
    assert!(
        lines
            .iter()
            .any(|l| l["event"] == "link" && l["state"] == "connected")
    );
    assert_eq!(lines.last().unwrap()["key_history_count"], 4);
}

// ---------------------------------------------------------------------------
// bands and config
// ---------------------------------------------------------------------------

#[test]
fn cli_bands_at_high_rate() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let output = cortexkey_bin()
        .args(["bands", "--sample-rate", "256", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for band in ["delta", "theta", "alpha", "beta", "gamma"] {
        assert!(stdout.contains(band), "missing band {band}");
    }
    assert!(!stdout.contains("raw signal"));
}

#[test]
fn cli_bands_short_window_uses_raw_signal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.toml");
    std::fs::write(&path, "[processor]\nbuffer_duration_secs = 1.0\n").unwrap();

    let output = cortexkey_bin()
        .args(["bands", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("bandpass"));
    assert_eq!(stdout.matches("raw signal").count(), 5);
}

#[test]
fn cli_config_show_reflects_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[processor]\ntolerance_percent = 25.0\n").unwrap();

    let output = cortexkey_bin()
        .args(["config", "show", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tolerance_percent = 25.0"));
    assert!(stdout.contains("raw signal bands: alpha, beta, gamma"));
}

#[test]
fn cli_config_init_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path());

    let again = cortexkey_bin()
        .args(["config", "init", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(!again.status.success());

    let forced = cortexkey_bin()
        .args(["config", "init", "--force", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(forced.status.success());
}

#[test]
fn cli_config_rejects_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[history]\ncapacity = 0\n").unwrap();

    let output = cortexkey_bin()
        .args(["config", "show", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
}
