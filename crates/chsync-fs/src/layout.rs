//! Synchronization repository layout

use std::path::Path;

/// File holding the full-fidelity native document inside a channel directory.
pub const SNAPSHOT_FILE: &str = "_snapshot.raw";

/// Channel metadata file inside a channel directory.
pub const CHANNEL_FILE: &str = "channel.yaml";

/// Connector properties file inside a connector directory.
pub const CONNECTOR_FILE: &str = "connector.yaml";

/// Library descriptor inside a code-template library directory.
pub const LIBRARY_FILE: &str = "library.yaml";

/// Repository metadata file at the synchronization root.
pub const REPOSITORY_FILE: &str = "repository.yaml";

/// Well-known directories and files of a synchronization repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoPath {
    Channels,
    CodeTemplates,
    Groups,
    Config,
    Environments,
    /// The `.chsync` tool configuration directory
    ToolConfig,
    /// The `.git` directory
    GitDir,
}

impl RepoPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Channels => "channels",
            Self::CodeTemplates => "code-templates",
            Self::Groups => "groups",
            Self::Config => "config",
            Self::Environments => "environments",
            Self::ToolConfig => ".chsync",
            Self::GitDir => ".git",
        }
    }

    /// The top-level directories that hold tracked artifacts.
    pub fn artifact_dirs() -> [RepoPath; 5] {
        [
            Self::Channels,
            Self::CodeTemplates,
            Self::Groups,
            Self::Config,
            Self::Environments,
        ]
    }

    /// Match a top-level directory name against the artifact directories.
    pub fn from_artifact_dir(name: &str) -> Option<RepoPath> {
        Self::artifact_dirs()
            .into_iter()
            .find(|dir| dir.as_str() == name)
    }
}

impl AsRef<Path> for RepoPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for RepoPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for RepoPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
