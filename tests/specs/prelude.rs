// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for the CLI specs.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// A throwaway project directory with its own state dir, so tests never
/// share deployments.
pub struct Project {
    root: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { root: TempDir::new().expect("temp project dir") }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn state_dir(&self) -> PathBuf {
        self.path().join("state")
    }

    /// Write a file under the project root, creating parent directories.
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, content).expect("write project file");
        path
    }

    /// A `goalrun` invocation scoped to this project.
    pub fn goalrun(&self) -> Cmd {
        let mut cmd = assert_cmd::Command::cargo_bin("goalrun").expect("goalrun binary");
        cmd.current_dir(self.path());
        cmd.arg("--workdir").arg(self.path());
        cmd.arg("--state-dir").arg(self.state_dir());
        Cmd(cmd)
    }
}

pub struct Cmd(assert_cmd::Command);

impl Cmd {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.0.args(args);
        self
    }

    /// Run, assert success, return stdout.
    pub fn passes(mut self) -> String {
        let assert = self.0.assert().success();
        String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
    }

    /// Run, assert failure with the given exit code, return stderr.
    pub fn fails(mut self, code: i32) -> String {
        let assert = self.0.assert().failure().code(code);
        String::from_utf8_lossy(&assert.get_output().stderr).into_owned()
    }
}

/// Poll until `f` returns true, panicking after ten seconds.
pub fn wait_for(what: &str, f: impl Fn() -> bool) {
    for _ in 0..200 {
        if f() {
            return;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    panic!("timed out waiting for {}", what);
}

/// Deploy with the default goal and return the deployment id.
pub fn deploy(project: &Project) -> String {
    let id = project.goalrun().args(&["deploy"]).passes().trim().to_string();
    assert!(id.starts_with("goal-agent-"), "unexpected deployment id: {}", id);
    id
}

/// Parse `goalrun status --format json` output.
pub fn status_json(project: &Project, id: &str) -> serde_json::Value {
    let out = project.goalrun().args(&["status", id, "--format", "json"]).passes();
    serde_json::from_str(&out).expect("status output should be JSON")
}

/// Block until the deployment reaches the given status.
pub fn wait_for_status(project: &Project, id: &str, status: &str) {
    wait_for(&format!("{} to reach {}", id, status), || {
        status_json(project, id)["status"] == status
    });
}
