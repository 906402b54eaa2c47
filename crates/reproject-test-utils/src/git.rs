//! Git repository fixtures.
//!
//! Repositories are built with `git2` so the fixture itself does not depend
//! on the `git` CLI; the code under test still shells out to it.

use std::fs;
use std::path::Path;

use git2::{Commit, Repository, Signature};

/// Initialises a repository at `path` with exactly `count` commits on `HEAD`.
///
/// Each commit rewrites `README.md` so every commit has a distinct tree.
///
/// # Panics
/// Panics if any git or filesystem operation fails.
pub fn git_repo_with_commits(path: &Path, count: usize) -> Repository {
    let repo = Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "git_repo_with_commits: failed to init repository at {}: {e}",
            path.display()
        )
    });

    for i in 0..count {
        commit_file(&repo, path, "README.md", &format!("# Test {i}\n"));
    }

    repo
}

/// Writes `file` with `content` and commits it on top of `HEAD`.
///
/// # Panics
/// Panics if any git or filesystem operation fails.
pub fn commit_file(repo: &Repository, root: &Path, file: &str, content: &str) {
    fs::write(root.join(file), content)
        .unwrap_or_else(|e| panic!("commit_file: failed to write {file}: {e}"));

    let sig = Signature::now("Test User", "test@test.com")
        .unwrap_or_else(|e| panic!("commit_file: failed to build signature: {e}"));

    let mut index = repo
        .index()
        .unwrap_or_else(|e| panic!("commit_file: failed to open index: {e}"));
    index
        .add_path(Path::new(file))
        .unwrap_or_else(|e| panic!("commit_file: failed to stage {file}: {e}"));
    index
        .write()
        .unwrap_or_else(|e| panic!("commit_file: failed to write index: {e}"));
    let tree_id = index
        .write_tree()
        .unwrap_or_else(|e| panic!("commit_file: failed to write tree: {e}"));
    let tree = repo
        .find_tree(tree_id)
        .unwrap_or_else(|e| panic!("commit_file: failed to find tree: {e}"));

    let parent: Option<Commit<'_>> = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&Commit<'_>> = parent.iter().collect();

    repo.commit(
        Some("HEAD"),
        &sig,
        &sig,
        &format!("Update {file}"),
        &tree,
        &parents,
    )
    .unwrap_or_else(|e| panic!("commit_file: failed to commit: {e}"));
}

/// Adds an `origin` remote pointing at `url`.
///
/// # Panics
/// Panics if the remote cannot be created.
pub fn add_origin(repo: &Repository, url: &str) {
    repo.remote("origin", url)
        .unwrap_or_else(|e| panic!("add_origin: failed to add remote {url}: {e}"));
}

/// Returns `true` when a `git` executable is on the path.
///
/// Tests that exercise the real revision command skip themselves otherwise.
pub fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
