//! Error types for chsync-vars

use std::path::PathBuf;

/// Result type for chsync-vars operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or resolving variables
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A variable re-entered its own expansion
    #[error("Circular variable reference: {chain}")]
    CircularReference { chain: String },

    /// Strict mode found placeholders with no value and no default
    #[error("Unresolved variables: {}", names.join(", "))]
    Unresolved { names: Vec<String> },

    #[error("Environment '{name}' has no variable file in {dir}")]
    EnvironmentNotFound { name: String, dir: PathBuf },

    #[error("Failed to parse variable file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
