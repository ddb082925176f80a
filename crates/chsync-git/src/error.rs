//! Error types for chsync-git

use std::path::PathBuf;

/// Result type for chsync-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in version-control operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git {operation} failed: {source}")]
    Git {
        operation: &'static str,
        #[source]
        source: git2::Error,
    },

    #[error("Git {operation} failed: {message}")]
    Operation {
        operation: &'static str,
        message: String,
    },

    #[error("Nothing to commit")]
    NothingToCommit,

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },
}

/// Attach the failing operation name to a libgit2 error.
pub(crate) trait GitContext<T> {
    fn during(self, operation: &'static str) -> Result<T>;
}

impl<T> GitContext<T> for std::result::Result<T, git2::Error> {
    fn during(self, operation: &'static str) -> Result<T> {
        self.map_err(|source| Error::Git { operation, source })
    }
}
