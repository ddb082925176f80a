//! Error types for chsync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] chsync_core::Error),

    #[error(transparent)]
    Fs(#[from] chsync_fs::Error),

    #[error(transparent)]
    Git(#[from] chsync_git::Error),

    #[error(transparent)]
    Vars(#[from] chsync_vars::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
