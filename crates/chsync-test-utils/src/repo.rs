//! [`TestRepo`]: a scratch synchronization root.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::git::repo_with_identity;

/// A temporary directory with file helpers and assertions.
pub struct TestRepo {
    temp_dir: TempDir,
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRepo {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// A new directory that is already a git repository with an identity.
    pub fn with_git() -> Self {
        let repo = Self::new();
        repo_with_identity(repo.root());
        repo
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("TestRepo::write {}: {e}", path.display()));
    }

    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("TestRepo::read {}: {e}", path.display()))
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.path(relative)).unwrap();
    }

    pub fn assert_file_exists(&self, relative: &str) {
        let path = self.path(relative);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    pub fn assert_file_not_exists(&self, relative: &str) {
        let path = self.path(relative);
        assert!(!path.exists(), "Expected file NOT to exist: {}", path.display());
    }

    pub fn assert_file_contains(&self, relative: &str, needle: &str) {
        let content = self.read(relative);
        assert!(
            content.contains(needle),
            "File {relative} does not contain {needle:?}.\nActual content:\n{content}"
        );
    }

    pub fn assert_file_not_contains(&self, relative: &str, needle: &str) {
        let content = self.read(relative);
        assert!(
            !content.contains(needle),
            "File {relative} unexpectedly contains {needle:?}"
        );
    }
}
