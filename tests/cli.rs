use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn touchboard_cmd() -> Command {
    Command::cargo_bin("touchboard").expect("binary exists")
}

const DRAW_TRACE: &str = r#"{
    "version": 1,
    "viewport": { "origin": { "x": 0, "y": 0 }, "size": { "width": 3000, "height": 2000 } },
    "tool": "pen",
    "events": [
        { "at_ms": 0, "type": "touch-start", "touches": [{ "id": 1, "x": 100, "y": 100 }] },
        { "at_ms": 150, "type": "touch-move", "touches": [{ "id": 1, "x": 110, "y": 100 }] },
        { "at_ms": 200, "type": "touch-end", "touches": [] }
    ]
}"#;

fn write_trace(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn help_prints_usage() {
    touchboard_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("shared zoomable drawing canvas"));
}

#[test]
fn version_includes_package_version() {
    touchboard_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn replay_reports_segment_as_json() {
    let temp = TempDir::new().unwrap();
    let trace = write_trace(&temp, "draw.json", DRAW_TRACE);

    touchboard_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .arg("replay")
        .arg(&trace)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"segment\""))
        .stdout(predicate::str::contains("\"fromX\": 100.0"))
        .stdout(predicate::str::contains("\"commits\": 1"));
}

#[test]
fn replay_prints_summary() {
    let temp = TempDir::new().unwrap();
    let trace = write_trace(&temp, "draw.json", DRAW_TRACE);

    touchboard_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .arg("replay")
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("segment=1"))
        .stdout(predicate::str::contains("stroke-finalized"));
}

#[test]
fn replay_rejects_out_of_order_trace() {
    let temp = TempDir::new().unwrap();
    let trace = write_trace(
        &temp,
        "bad.json",
        r#"{
            "viewport": { "origin": { "x": 0, "y": 0 }, "size": { "width": 800, "height": 600 } },
            "events": [
                { "at_ms": 50, "type": "accept" },
                { "at_ms": 10, "type": "accept" }
            ]
        }"#,
    );

    touchboard_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .arg("replay")
        .arg(&trace)
        .assert()
        .failure()
        .stderr(predicate::str::contains("earlier than the previous event"));
}

#[test]
fn replay_missing_trace_fails() {
    let temp = TempDir::new().unwrap();

    touchboard_cmd()
        .env("XDG_CONFIG_HOME", temp.path())
        .args(["replay", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read trace"));
}

#[test]
fn print_config_uses_explicit_file() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("custom.toml");
    std::fs::write(&config, "[drawing]\ndraw_delay_ms = 120\n").unwrap();

    touchboard_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("draw_delay_ms = 120"))
        .stdout(predicate::str::contains("[viewport]"));
}

#[test]
fn init_config_writes_once() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("touchboard").join("config.toml");

    touchboard_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--init-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config"));
    assert!(config.exists());

    touchboard_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--init-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
