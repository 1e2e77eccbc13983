use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated HOSTFLOW_HOME for one test
pub struct TestHome {
    pub root: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn inventory_path(&self) -> PathBuf {
        self.path().join("inventory").join("inventory.json")
    }

    /// `hostflow` bound to this home
    #[allow(deprecated)]
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("hostflow").unwrap();
        cmd.env("HOSTFLOW_HOME", self.path())
            .env_remove("HOSTFLOW_INVENTORY_PATH")
            .env_remove("HOSTFLOW_HOST_PASSWORD")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    /// Run `args` and expect success
    pub fn run(&self, args: &[&str]) {
        self.cmd().args(args).assert().success();
    }

    /// Rendered inventory document as JSON
    pub fn inventory(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .cmd()
            .arg("inventory")
            .args(args)
            .output()
            .unwrap();
        assert!(output.status.success());
        serde_json::from_slice(&output.stdout).unwrap()
    }
}
