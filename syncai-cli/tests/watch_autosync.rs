use std::fs;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};

use tempfile::TempDir;

const CONFIG: &str = r#"{
  "config": { "interval": 1 },
  "agents": [
    { "name": "cursor", "rules": { "pattern": ".cursor/rules/*.mdc" } },
    { "name": "claude", "rules": { "pattern": ".claude/rules/*.md" } }
  ]
}"#;

/// Kills the watcher when the test ends, pass or fail.
struct WatchProcess {
    child: Child,
}

impl WatchProcess {
    fn start(root: &Path) -> Self {
        let child = Command::new(assert_cmd::cargo::cargo_bin!("syncai"))
            .arg("--config")
            .arg(root.join("syncai.json"))
            .args(["watch", "--interval", "1"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn watch");
        Self { child }
    }
}

impl Drop for WatchProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn wait_for(mut condition: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(100));
    }
    condition()
}

#[test]
fn watch_propagates_edits_and_deletions() {
    let tmp = TempDir::new().expect("tmp");
    let root = tmp.path();
    fs::write(root.join("syncai.json"), CONFIG).expect("config");
    fs::create_dir_all(root.join(".cursor/rules")).expect("mkdir");
    fs::create_dir_all(root.join(".claude/rules")).expect("mkdir");

    let _watch = WatchProcess::start(root);

    let source = root.join(".claude/rules/live.md");
    let mirror = root.join(".cursor/rules/live.mdc");
    fs::write(&source, "first\n").expect("write");
    assert!(
        wait_for(
            || fs::read_to_string(&mirror).is_ok_and(|s| s.ends_with("first\n")),
            Duration::from_secs(15)
        ),
        "new rule should be mirrored"
    );

    fs::write(&source, "second\n").expect("write");
    assert!(
        wait_for(
            || fs::read_to_string(&mirror).is_ok_and(|s| s.ends_with("second\n")),
            Duration::from_secs(15)
        ),
        "edit should be mirrored"
    );

    fs::remove_file(&source).expect("rm");
    assert!(
        wait_for(|| !mirror.exists(), Duration::from_secs(15)),
        "deletion should propagate"
    );
}
