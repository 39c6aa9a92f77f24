#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;
use yap::storage::Storage;
use yap::task::Tracker;

/// Throwaway yap home for one test
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn storage(&self) -> Storage {
        Storage::open(self.path()).expect("open storage")
    }

    pub fn tracker(&self) -> Tracker {
        Tracker::new(self.storage())
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.path().join("config.toml");
        fs::write(&path, contents).expect("write config");
        path
    }

    /// Sorted file names in one of the home's subdirectories
    pub fn entries(&self, sub: &str) -> Vec<String> {
        let dir = self.path().join(sub);
        let mut names: Vec<String> = match fs::read_dir(&dir) {
            Ok(read) => read
                .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = yap_cmd();
        cmd.env("YAP_HOME", self.path());
        cmd
    }
}

pub fn yap_cmd() -> Command {
    let mut cmd = Command::cargo_bin("yap").expect("binary");
    cmd.env_remove("YAP_HOME").env_remove("RUST_LOG");
    cmd
}
