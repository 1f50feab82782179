use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const CONFIG: &str = r#"{
  "config": { "interval": 1 },
  "agents": [
    { "name": "cursor",
      "rules":   { "pattern": ".cursor/rules/*.mdc" },
      "context": { "path": "AGENTS.md" } },
    { "name": "copilot",
      "rules":   { "pattern": ".github/instructions/*.instructions.md" },
      "context": { "path": ".github/copilot-instructions.md" } },
    { "name": "claude",
      "rules":      { "pattern": ".claude/rules/*.md" },
      "guidelines": { "path": "CLAUDE.md" } }
  ]
}"#;

fn syncai_cmd(root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("syncai"));
    cmd.current_dir(root)
        .arg("--config")
        .arg(root.join("syncai.json"))
        .env("RUST_LOG", "warn");
    cmd
}

fn project() -> TempDir {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("syncai.json"), CONFIG).expect("config");
    write(
        tmp.path(),
        ".cursor/rules/style.mdc",
        "---\ndescription: Style\nalwaysApply: false\nglobs: \"src/**\"\n---\nUse rustfmt.\n",
    );
    write(tmp.path(), "CLAUDE.md", "# Project\n");
    tmp
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, contents).expect("write");
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap_or_else(|e| panic!("read {rel}: {e}"))
}

#[test]
fn sync_propagates_rules_and_context() {
    let tmp = project();
    let root = tmp.path();

    syncai_cmd(root)
        .arg("sync")
        .assert()
        .success()
        .stdout(contains("wrote 4 file(s)"))
        .stdout(contains(".claude/rules/style.md"));

    assert_eq!(read(root, ".claude/rules/style.md"), "Use rustfmt.\n");
    assert_eq!(
        read(root, ".github/instructions/style.instructions.md"),
        "---\ndescription: Style\napplyTo: \"src/**\"\n---\nUse rustfmt.\n"
    );
    assert_eq!(read(root, "AGENTS.md"), "# Project\n");
    assert_eq!(read(root, ".github/copilot-instructions.md"), "# Project\n");

    syncai_cmd(root)
        .arg("sync")
        .assert()
        .success()
        .stdout(contains("nothing to do"));
}

#[test]
fn dry_run_writes_nothing() {
    let tmp = project();
    let root = tmp.path();

    syncai_cmd(root)
        .args(["sync", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("would write 4 file(s)"));
    assert!(!root.join(".claude/rules/style.md").exists());
    assert!(!root.join("AGENTS.md").exists());
}

#[test]
fn diff_shows_pending_additions() {
    let tmp = project();
    let root = tmp.path();

    let assert = syncai_cmd(root)
        .arg("diff")
        .assert()
        .success()
        .stdout(contains("+++ b/.claude/rules/style.md"));
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    assert!(stdout.lines().any(|line| line == "+Use rustfmt."));
    assert!(!root.join(".claude/rules/style.md").exists(), "diff never writes");

    syncai_cmd(root).arg("sync").assert().success();
    syncai_cmd(root)
        .arg("diff")
        .assert()
        .success()
        .stdout(contains("No differences."));
}

#[test]
fn status_json_lists_identified_files() {
    let tmp = project();
    let root = tmp.path();

    let assert = syncai_cmd(root).args(["status", "--json"]).assert().success();
    let payload: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("status json");
    let files = payload["files"].as_array().expect("files array");
    assert_eq!(payload["agents"], 3);
    assert_eq!(files.len(), 2);

    let rule = files
        .iter()
        .find(|f| f["kind"] == "rules")
        .expect("rules row");
    assert_eq!(rule["agent"], "cursor");
    assert_eq!(rule["stem"], "style");
    assert_eq!(rule["path"], ".cursor/rules/style.mdc");

    let context = files
        .iter()
        .find(|f| f["kind"] == "context")
        .expect("context row");
    assert_eq!(context["agent"], "claude");
    assert_eq!(context["stem"], "");
}

#[test]
fn status_table_has_summary_line() {
    let tmp = project();
    syncai_cmd(tmp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(contains("3 agents | 2 files | 2 artifacts"));
}

#[test]
fn invalid_config_is_reported() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("syncai.json"), r#"{"agents": []}"#).expect("config");

    syncai_cmd(tmp.path())
        .arg("sync")
        .assert()
        .failure()
        .stderr(contains("has no agents defined"));
}

#[test]
fn workdir_flag_overrides_config_location() {
    let config_dir = TempDir::new().expect("config dir");
    let work = TempDir::new().expect("work");
    fs::write(config_dir.path().join("syncai.json"), CONFIG).expect("config");
    write(work.path(), "AGENTS.md", "from workdir\n");

    Command::new(assert_cmd::cargo::cargo_bin!("syncai"))
        .arg("--config")
        .arg(config_dir.path().join("syncai.json"))
        .arg("--workdir")
        .arg(work.path())
        .arg("sync")
        .env("RUST_LOG", "warn")
        .assert()
        .success();
    assert_eq!(read(work.path(), "CLAUDE.md"), "from workdir\n");
    assert!(!config_dir.path().join("CLAUDE.md").exists());
}
