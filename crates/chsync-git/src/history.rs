//! Commit history extraction

use chrono::{DateTime, TimeZone, Utc};
use git2::Repository;
use serde::Serialize;

use crate::Result;
use crate::error::GitContext;

/// Information about a single commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    /// Short commit hash (7 characters)
    pub hash: String,

    /// First line of the commit message
    pub message: String,

    pub author: String,

    pub timestamp: DateTime<Utc>,
}

/// The last `max_count` commits reachable from HEAD, most recent first.
///
/// An unborn HEAD yields an empty list.
pub fn recent_commits(repo: &Repository, max_count: usize) -> Result<Vec<CommitInfo>> {
    let head = match repo.head() {
        Ok(head) => head,
        Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(Vec::new()),
        Err(e) => return Err(e).during("log"),
    };
    let tip = head.peel_to_commit().during("log")?;

    let mut revwalk = repo.revwalk().during("log")?;
    revwalk.push(tip.id()).during("log")?;
    revwalk.set_sorting(git2::Sort::TIME).during("log")?;

    let mut commits = Vec::with_capacity(max_count.min(64));
    for oid in revwalk.take(max_count) {
        let oid = oid.during("log")?;
        let commit = repo.find_commit(oid).during("log")?;

        let timestamp = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .unwrap_or_default();
        let message = commit
            .message()
            .unwrap_or("")
            .lines()
            .next()
            .unwrap_or("")
            .to_string();
        let author = commit.author().name().unwrap_or("Unknown").to_string();

        commits.push(CommitInfo {
            hash: oid.to_string().chars().take(7).collect(),
            message,
            author,
            timestamp,
        });
    }

    Ok(commits)
}
