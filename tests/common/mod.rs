use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

pub fn run_crosstalk(args: &[&str]) -> Output {
    TestEnv::new().run(args)
}

pub struct TestEnv {
    home: TempDir,
    config: TempDir,
    data: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temporary HOME dir"),
            config: tempfile::tempdir().expect("create temporary XDG config dir"),
            data: tempfile::tempdir().expect("create temporary XDG data dir"),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_crosstalk"))
            .args(args)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.config.path())
            .env("XDG_DATA_HOME", self.data.path())
            .output()
            .expect("failed to execute crosstalk binary")
    }

    /// Write a JSON fixture into the sandbox and return its path.
    #[allow(dead_code)]
    pub fn write_fixture(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.data.path().join(name);
        std::fs::write(&path, contents).expect("write fixture file");
        path
    }

    #[allow(dead_code)]
    pub fn data_path(&self, name: &str) -> PathBuf {
        self.data.path().join(name)
    }
}
