//! [`TestProject`]: a temporary checkout with a template manifest.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::git;

/// A temporary directory holding a git repository and, optionally, a
/// `package.in.json` template.
///
/// The directory is removed when the value is dropped.
pub struct TestProject {
    repo: Option<git2::Repository>,
    dir: TempDir,
}

impl TestProject {
    /// An empty directory that is not a repository.
    ///
    /// # Panics
    /// Panics if the temp directory cannot be created.
    pub fn empty() -> Self {
        Self {
            repo: None,
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// A repository with `commits` commits on `HEAD`.
    pub fn with_commits(commits: usize) -> Self {
        let mut project = Self::empty();
        project.repo = Some(git::git_repo_with_commits(project.path(), commits));
        project
    }

    /// Add an `origin` remote.
    ///
    /// # Panics
    /// Panics if the project is not a repository.
    pub fn with_origin(self, url: &str) -> Self {
        let repo = self
            .repo
            .as_ref()
            .expect("with_origin requires a repository");
        git::add_origin(repo, url);
        self
    }

    /// Write `package.in.json` with `content`.
    pub fn with_template(self, content: &str) -> Self {
        self.write("package.in.json", content);
        self
    }

    /// Write `file` (relative to the project root) with `content`.
    ///
    /// # Panics
    /// Panics if the write fails.
    pub fn write(&self, file: &str, content: &str) -> PathBuf {
        let path = self.path().join(file);
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("TestProject::write: failed to write {file}: {e}"));
        path
    }

    /// Read `file` (relative to the project root), or `None` if it is absent.
    pub fn read(&self, file: &str) -> Option<String> {
        fs::read_to_string(self.path().join(file)).ok()
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
