//! Version-control interface

use std::path::Path;

use serde::Serialize;

use crate::Result;
use crate::history::CommitInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Added,
    Modified,
    Deleted,
    Renamed,
    Untracked,
    Conflicted,
}

/// One path reported by [`VersionControl::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub path: String,
    pub state: FileState,
    /// True when the change is in the index
    pub staged: bool,
}

/// Operations the sync orchestrator needs from a version-control system.
///
/// All paths are repository-relative and forward-slash separated.
pub trait VersionControl {
    /// Working directory root
    fn root(&self) -> &Path;

    /// Create the repository if it does not exist yet.
    fn init(&self) -> Result<()>;

    /// Stage additions, modifications and deletions matching `pathspecs`;
    /// an empty slice stages everything.
    fn add(&self, pathspecs: &[String]) -> Result<()>;

    /// Commit the index and return the new commit hash.
    ///
    /// Fails with [`crate::Error::NothingToCommit`] when nothing is staged.
    fn commit(&self, message: &str) -> Result<String>;

    fn status(&self) -> Result<Vec<StatusEntry>>;

    /// Push `branch` (default: current) to `remote` (default: `origin`).
    fn push(&self, remote: Option<&str>, branch: Option<&str>) -> Result<()>;

    /// Fetch and fast-forward `branch` from `remote`.
    fn pull(&self, remote: Option<&str>, branch: Option<&str>) -> Result<()>;

    /// Most recent commits first.
    fn log(&self, max_count: usize) -> Result<Vec<CommitInfo>>;

    /// Paths changed between two revisions, or between `from` and the
    /// working tree when `to` is `None`.
    fn diff(&self, from: &str, to: Option<&str>) -> Result<Vec<String>>;

    fn has_staged_changes(&self) -> Result<bool>;
}
