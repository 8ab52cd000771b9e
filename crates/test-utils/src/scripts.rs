#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use scriptvisor::ResolvedCommand;
use tempfile::TempDir;

/// Temporary directory of shell scripts, removed on drop.
///
/// Scripts are plain POSIX `sh` files and are run through
/// [`ScriptDir::sh`], standing in for a real interpreter.
pub struct ScriptDir {
    dir: TempDir,
}

impl ScriptDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `body` to `name` and return its path.
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("failed to write script");
        path
    }

    /// Create `link` pointing at the existing script `target`.
    #[cfg(unix)]
    pub fn symlink(&self, target: &str, link: &str) -> PathBuf {
        let link_path = self.dir.path().join(link);
        std::os::unix::fs::symlink(self.dir.path().join(target), &link_path)
            .expect("failed to create symlink");
        link_path
    }

    /// The interpreter used for test scripts.
    pub fn sh() -> ResolvedCommand {
        ResolvedCommand::new("/bin/sh")
    }
}

impl Default for ScriptDir {
    fn default() -> Self {
        Self::new()
    }
}
