//! Push and fast-forward pull

use git2::Repository;
use tracing::{debug, info};

use crate::error::GitContext;
use crate::{Error, Result};

const DEFAULT_REMOTE: &str = "origin";

pub(crate) fn current_branch(repo: &Repository) -> Result<String> {
    let head = repo.head().during("resolve HEAD")?;
    if !head.is_branch() {
        return Err(Error::Operation {
            operation: "resolve HEAD",
            message: "HEAD is detached".to_string(),
        });
    }
    Ok(head.shorthand().unwrap_or("HEAD").to_string())
}

fn resolve<'r>(
    repo: &'r Repository,
    remote: Option<&str>,
    branch: Option<&str>,
) -> Result<(git2::Remote<'r>, String)> {
    let remote_name = remote.unwrap_or(DEFAULT_REMOTE);
    let branch_name = match branch {
        Some(b) => b.to_string(),
        None => current_branch(repo)?,
    };
    let remote = repo
        .find_remote(remote_name)
        .map_err(|_| Error::RemoteNotFound {
            name: remote_name.to_string(),
        })?;
    Ok((remote, branch_name))
}

pub(crate) fn push(repo: &Repository, remote: Option<&str>, branch: Option<&str>) -> Result<()> {
    let (mut remote, branch_name) = resolve(repo, remote, branch)?;
    let refspec = format!("refs/heads/{}:refs/heads/{}", branch_name, branch_name);

    remote
        .push(&[&refspec], None)
        .map_err(|e| Error::Operation {
            operation: "push",
            message: e.message().to_string(),
        })?;

    info!(remote = remote.name().unwrap_or(DEFAULT_REMOTE), branch = %branch_name, "Pushed");
    Ok(())
}

pub(crate) fn pull(repo: &Repository, remote: Option<&str>, branch: Option<&str>) -> Result<()> {
    let (mut remote, branch_name) = resolve(repo, remote, branch)?;

    remote
        .fetch(&[&branch_name], None, None)
        .map_err(|e| Error::Operation {
            operation: "pull",
            message: format!("Fetch failed: {}", e.message()),
        })?;

    let fetch_commit = repo
        .find_reference("FETCH_HEAD")
        .and_then(|r| r.peel_to_commit())
        .map_err(|e| Error::Operation {
            operation: "pull",
            message: format!("Could not resolve FETCH_HEAD: {}", e.message()),
        })?;
    let annotated = repo
        .find_annotated_commit(fetch_commit.id())
        .during("pull")?;
    let (analysis, _) = repo.merge_analysis(&[&annotated]).during("pull")?;

    if analysis.is_up_to_date() {
        debug!(branch = %branch_name, "Already up to date");
        return Ok(());
    }

    let refname = format!("refs/heads/{}", branch_name);
    if analysis.is_unborn() {
        repo.reference(&refname, fetch_commit.id(), true, "pull: initial")
            .during("pull")?;
        repo.set_head(&refname).during("pull")?;
    } else if analysis.is_fast_forward() {
        let mut reference = repo.find_reference(&refname).during("pull")?;
        reference
            .set_target(
                fetch_commit.id(),
                &format!("pull: fast-forward to {}", fetch_commit.id()),
            )
            .during("pull")?;
    } else {
        let head_commit = repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .during("pull")?;
        return Err(Error::Operation {
            operation: "pull",
            message: format!(
                "Cannot fast-forward {} from {} to {}. Manual merge required.",
                branch_name,
                head_commit.id(),
                fetch_commit.id()
            ),
        });
    }

    repo.checkout_head(Some(git2::build::CheckoutBuilder::default().force()))
        .during("pull")?;
    info!(branch = %branch_name, commit = %fetch_commit.id(), "Fast-forwarded");
    Ok(())
}
