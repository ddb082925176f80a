//! Error types for chsync-core

use std::path::PathBuf;

/// Result type for chsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in chsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A native document could not be decomposed or reassembled
    #[error("Codec error: {message}")]
    Codec { message: String },

    /// The synchronization root has no repository metadata
    #[error("Not a channel repository: {path} (run `chsync init`)")]
    NotInitialized { path: PathBuf },

    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Invalid file {path}: {message}")]
    InvalidFile { path: String, message: String },

    #[error(transparent)]
    Fs(#[from] chsync_fs::Error),

    #[error(transparent)]
    Vars(#[from] chsync_vars::Error),

    #[error(transparent)]
    Git(#[from] chsync_git::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    pub(crate) fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }
}
