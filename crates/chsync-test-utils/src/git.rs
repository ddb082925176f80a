//! Git repository fixtures.

use std::path::Path;

/// Initialise a repository with a local identity and no commits.
///
/// # Panics
/// Panics if git2 fails.
pub fn repo_with_identity(path: &Path) -> git2::Repository {
    let repo = git2::Repository::init(path)
        .unwrap_or_else(|e| panic!("repo_with_identity: init {} failed: {e}", path.display()));
    {
        let mut config = repo
            .config()
            .unwrap_or_else(|e| panic!("repo_with_identity: config failed: {e}"));
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@test.com").unwrap();
        config.set_bool("commit.gpgsign", false).unwrap();
    }
    repo
}

/// Initialise a bare repository usable as a push/pull remote.
///
/// # Panics
/// Panics if git2 fails.
pub fn bare_remote(path: &Path) -> git2::Repository {
    git2::Repository::init_bare(path)
        .unwrap_or_else(|e| panic!("bare_remote: init {} failed: {e}", path.display()))
}

/// Register `url` as remote `name` of the repository at `path`.
///
/// # Panics
/// Panics if the repository cannot be opened or the remote exists.
pub fn add_remote(path: &Path, name: &str, url: &str) {
    let repo = git2::Repository::open(path)
        .unwrap_or_else(|e| panic!("add_remote: open {} failed: {e}", path.display()));
    repo.remote(name, url)
        .unwrap_or_else(|e| panic!("add_remote: remote {name} failed: {e}"));
}

/// Number of commits reachable from HEAD; zero on an unborn branch.
pub fn commit_count(path: &Path) -> usize {
    let Ok(repo) = git2::Repository::open(path) else {
        return 0;
    };
    let Ok(mut walk) = repo.revwalk() else {
        return 0;
    };
    if walk.push_head().is_err() {
        return 0;
    }
    walk.count()
}

/// Message of the HEAD commit.
///
/// # Panics
/// Panics when HEAD has no commit.
pub fn head_message(path: &Path) -> String {
    let repo = git2::Repository::open(path).unwrap();
    let commit = repo.head().unwrap().peel_to_commit().unwrap();
    commit.message().unwrap_or_default().to_string()
}
