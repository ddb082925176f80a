//! libgit2-backed [`VersionControl`]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use git2::{DiffOptions, IndexAddOption, Repository, Signature, Status, StatusOptions};
use tracing::{debug, info};

use crate::error::GitContext;
use crate::history::{CommitInfo, recent_commits};
use crate::vcs::{FileState, StatusEntry, VersionControl};
use crate::{Error, Result, remote};

const FALLBACK_NAME: &str = "chsync";
const FALLBACK_EMAIL: &str = "chsync@localhost";

/// Git working directory at `root`.
///
/// The repository is reopened per operation so the client holds no libgit2
/// state between calls.
#[derive(Debug, Clone)]
pub struct GitClient {
    root: PathBuf,
}

impl GitClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// True when `root` is already a git working directory.
    pub fn is_repository(&self) -> bool {
        Repository::open(&self.root).is_ok()
    }

    fn open(&self) -> Result<Repository> {
        Repository::open(&self.root).map_err(|_| Error::NotARepository {
            path: self.root.clone(),
        })
    }

    fn signature(repo: &Repository) -> Result<Signature<'static>> {
        match repo.signature() {
            Ok(sig) => Ok(sig.to_owned()),
            Err(_) => Signature::now(FALLBACK_NAME, FALLBACK_EMAIL).during("commit"),
        }
    }

    fn staged(repo: &Repository) -> Result<bool> {
        let index = repo.index().during("status")?;
        match repo.head() {
            Ok(head) => {
                let tree = head.peel_to_tree().during("status")?;
                let diff = repo
                    .diff_tree_to_index(Some(&tree), Some(&index), None)
                    .during("status")?;
                Ok(diff.deltas().len() > 0)
            }
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(!index.is_empty()),
            Err(e) => Err(e).during("status"),
        }
    }
}

fn pathspecs(specs: &[String]) -> Vec<String> {
    if specs.is_empty() {
        vec!["*".to_string()]
    } else {
        specs.to_vec()
    }
}

fn state_of(status: Status) -> Option<(FileState, bool)> {
    if status.is_conflicted() {
        return Some((FileState::Conflicted, false));
    }
    let staged = if status.is_index_new() {
        Some(FileState::Added)
    } else if status.is_index_deleted() {
        Some(FileState::Deleted)
    } else if status.is_index_renamed() {
        Some(FileState::Renamed)
    } else if status.is_index_modified() || status.is_index_typechange() {
        Some(FileState::Modified)
    } else {
        None
    };
    if let Some(state) = staged {
        return Some((state, true));
    }
    if status.is_wt_new() {
        Some((FileState::Untracked, false))
    } else if status.is_wt_deleted() {
        Some((FileState::Deleted, false))
    } else if status.is_wt_renamed() {
        Some((FileState::Renamed, false))
    } else if status.is_wt_modified() || status.is_wt_typechange() {
        Some((FileState::Modified, false))
    } else {
        None
    }
}

impl VersionControl for GitClient {
    fn root(&self) -> &Path {
        &self.root
    }

    fn init(&self) -> Result<()> {
        if self.is_repository() {
            debug!(path = %self.root.display(), "Repository already initialised");
            return Ok(());
        }
        Repository::init(&self.root).during("init")?;
        info!(path = %self.root.display(), "Initialised git repository");
        Ok(())
    }

    fn add(&self, specs: &[String]) -> Result<()> {
        let repo = self.open()?;
        let mut index = repo.index().during("add")?;
        let specs = pathspecs(specs);
        index
            .add_all(specs.iter().map(String::as_str), IndexAddOption::DEFAULT, None)
            .during("add")?;
        // Picks up files removed from the working tree.
        index
            .update_all(specs.iter().map(String::as_str), None)
            .during("add")?;
        index.write().during("add")?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        let repo = self.open()?;
        if !Self::staged(&repo)? {
            return Err(Error::NothingToCommit);
        }

        let mut index = repo.index().during("commit")?;
        let tree_id = index.write_tree().during("commit")?;
        let tree = repo.find_tree(tree_id).during("commit")?;
        let signature = Self::signature(&repo)?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit().during("commit")?),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e).during("commit"),
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let oid = repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &parents,
            )
            .during("commit")?;
        info!(commit = %oid, "Committed");
        Ok(oid.to_string())
    }

    fn status(&self) -> Result<Vec<StatusEntry>> {
        let repo = self.open()?;
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);
        let statuses = repo.statuses(Some(&mut options)).during("status")?;

        Ok(statuses
            .iter()
            .filter_map(|entry| {
                let path = entry.path()?.to_string();
                let (state, staged) = state_of(entry.status())?;
                Some(StatusEntry {
                    path,
                    state,
                    staged,
                })
            })
            .collect())
    }

    fn push(&self, remote: Option<&str>, branch: Option<&str>) -> Result<()> {
        let repo = self.open()?;
        remote::push(&repo, remote, branch)
    }

    fn pull(&self, remote: Option<&str>, branch: Option<&str>) -> Result<()> {
        let repo = self.open()?;
        remote::pull(&repo, remote, branch)
    }

    fn log(&self, max_count: usize) -> Result<Vec<CommitInfo>> {
        let repo = self.open()?;
        recent_commits(&repo, max_count)
    }

    fn diff(&self, from: &str, to: Option<&str>) -> Result<Vec<String>> {
        let repo = self.open()?;
        let from_tree = repo
            .revparse_single(from)
            .and_then(|obj| obj.peel_to_tree())
            .during("diff")?;

        let mut options = DiffOptions::new();
        options.include_untracked(true).recurse_untracked_dirs(true);

        let diff = match to {
            Some(to) => {
                let to_tree = repo
                    .revparse_single(to)
                    .and_then(|obj| obj.peel_to_tree())
                    .during("diff")?;
                repo.diff_tree_to_tree(Some(&from_tree), Some(&to_tree), Some(&mut options))
            }
            None => repo.diff_tree_to_workdir_with_index(Some(&from_tree), Some(&mut options)),
        }
        .during("diff")?;

        let mut paths = BTreeSet::new();
        for delta in diff.deltas() {
            for file in [delta.old_file(), delta.new_file()] {
                if let Some(path) = file.path() {
                    paths.insert(path.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        Ok(paths.into_iter().collect())
    }

    fn has_staged_changes(&self) -> Result<bool> {
        let repo = self.open()?;
        Self::staged(&repo)
    }
}
