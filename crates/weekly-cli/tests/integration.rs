#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn weekly(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("weekly").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("WEEKLY_CONFIG")
        .env("RUST_LOG", "off")
        .env("NO_COLOR", "1");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) {
    std::fs::write(dir.path().join(name), content).unwrap();
}

// ---------------------------------------------------------------------------
// weekly diff
// ---------------------------------------------------------------------------

#[test]
fn diff_prints_one_marked_line_per_segment() {
    let dir = TempDir::new().unwrap();
    write(&dir, "old.md", "the cat sat");
    write(&dir, "new.md", "the dog sat");

    weekly(&dir)
        .args(["diff", "old.md", "new.md"])
        .assert()
        .success()
        .stdout("  the\n- cat\n+ dog\n  sat\n");
}

#[test]
fn diff_json_lists_typed_segments() {
    let dir = TempDir::new().unwrap();
    write(&dir, "old.md", "");
    write(&dir, "new.md", "hello world");

    let output = weekly(&dir)
        .args(["diff", "old.md", "new.md", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{ "type": "added", "text": "hello world" }])
    );
}

#[test]
fn diff_missing_file_fails_with_path() {
    let dir = TempDir::new().unwrap();
    write(&dir, "old.md", "x");

    weekly(&dir)
        .args(["diff", "old.md", "nope.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: reading nope.md"));
}

// ---------------------------------------------------------------------------
// weekly config
// ---------------------------------------------------------------------------

#[test]
fn config_show_without_file_prints_defaults() {
    let dir = TempDir::new().unwrap();
    weekly(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gpt-4o"))
        .stdout(predicate::str::contains("68b2d261fd8b6b2f72c7167d"));
}

#[test]
fn config_init_writes_file_once() {
    let dir = TempDir::new().unwrap();
    weekly(&dir).args(["config", "init"]).assert().success();
    assert!(dir.path().join("weekly.yaml").exists());

    weekly(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    weekly(&dir)
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn config_show_reads_overrides() {
    let dir = TempDir::new().unwrap();
    write(&dir, "custom.yaml", "model: gpt-4o-mini\nreveal:\n  reveal_ms: 8000\n");

    weekly(&dir)
        .args(["--config", "custom.yaml", "config", "show", "--yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("model: gpt-4o-mini"))
        .stdout(predicate::str::contains("reveal_ms: 8000"))
        .stdout(predicate::str::contains("pulse_ms: 2000"));
}

#[test]
fn invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    write(&dir, "weekly.yaml", "reveal: [not, a, map]\n");

    weekly(&dir)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: loading weekly.yaml"));
}
