//! Shared test utilities for CLI end-to-end tests.
//!
//! This module provides a fixture that builds a directory tree of real git
//! repositories and helpers to inspect them after `mgit` ran.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_repo("alpha").with_repo("beta");
//!     fixture.command().arg("status").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::TestFixture;
}

/// Run git in `dir` and return its stdout, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// A temporary tree of git repositories.
///
/// Each repository gets a local identity, signing disabled and one initial
/// commit on `main`, so the tree behaves the same on any machine.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
    config_home: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
            config_home: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Initialize a repository at `path` (relative to the root) with one commit.
    pub fn with_repo(self, path: &str) -> Self {
        let dir = self.temp_dir.child(path);
        dir.create_dir_all().expect("Failed to create repository dir");
        let dir = dir.path();

        git(dir, &["init", "-q", "-b", "main"]);
        git(dir, &["config", "user.email", "test@example.com"]);
        git(dir, &["config", "user.name", "Test User"]);
        git(dir, &["config", "commit.gpgsign", "false"]);

        std::fs::write(dir.join("README.md"), format!("# {}\n", path))
            .expect("Failed to write README");
        git(dir, &["add", "."]);
        git(dir, &["commit", "-q", "-m", "Initial commit"]);
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add an `.mgit.yaml` configuration in the root.
    #[allow(dead_code)]
    pub fn with_config(self, content: &str) -> Self {
        self.with_file(".mgit.yaml", content)
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of something inside the tree.
    pub fn join(&self, path: &str) -> PathBuf {
        self.temp_dir.path().join(path)
    }

    /// Full id of `HEAD` in the repository at `path`.
    #[allow(dead_code)]
    pub fn head(&self, path: &str) -> String {
        git(&self.join(path), &["rev-parse", "HEAD"]).trim().to_string()
    }

    /// Full message of the last commit in the repository at `path`.
    #[allow(dead_code)]
    pub fn last_message(&self, path: &str) -> String {
        git(&self.join(path), &["log", "-1", "--format=%B"])
            .trim_end()
            .to_string()
    }

    /// Number of commits reachable from `HEAD`.
    #[allow(dead_code)]
    pub fn commit_count(&self, path: &str) -> usize {
        git(&self.join(path), &["rev-list", "--count", "HEAD"])
            .trim()
            .parse()
            .expect("rev-list --count should print a number")
    }

    /// Current branch name.
    #[allow(dead_code)]
    pub fn branch(&self, path: &str) -> String {
        git(&self.join(path), &["rev-parse", "--abbrev-ref", "HEAD"])
            .trim()
            .to_string()
    }

    /// Porcelain status, empty when clean.
    #[allow(dead_code)]
    pub fn porcelain(&self, path: &str) -> String {
        git(&self.join(path), &["status", "--porcelain"])
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create an `mgit` command running in this fixture's directory.
    ///
    /// Color and ambient `MGIT_*` settings are neutralized, and the user
    /// configuration directory points at an empty scratch directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mgit");
        cmd.current_dir(self.path())
            .env("NO_COLOR", "1")
            .env("XDG_CONFIG_HOME", self.config_home.path())
            .env_remove("MGIT_JOBS")
            .env_remove("MGIT_GIT")
            .env_remove("MGIT_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_repository_with_commit() {
        let fixture = TestFixture::new().with_repo("alpha");
        assert!(fixture.join("alpha/.git").exists());
        assert_eq!(fixture.commit_count("alpha"), 1);
        assert_eq!(fixture.branch("alpha"), "main");
        assert!(fixture.porcelain("alpha").is_empty());
    }

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("notes/test.txt", "hello");
        assert!(fixture.join("notes/test.txt").exists());
    }
}
