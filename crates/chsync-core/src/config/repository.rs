//! `repository.yaml` at the synchronization root

use chsync_fs::layout::REPOSITORY_FILE;
use chsync_fs::{NormalizedPath, io};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitFlow {
    pub main_branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub develop_branch: Option<String>,
}

impl Default for GitFlow {
    fn default() -> Self {
        Self {
            main_branch: "main".to_string(),
            develop_branch: None,
        }
    }
}

/// Describes the integration engine a repository was exported from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    pub engine: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(default)]
    pub git_flow: GitFlow,
}

impl Default for RepositoryMetadata {
    fn default() -> Self {
        Self {
            engine: "generic".to_string(),
            engine_version: None,
            server_url: None,
            git_flow: GitFlow::default(),
        }
    }
}

impl RepositoryMetadata {
    pub fn path(root: &NormalizedPath) -> NormalizedPath {
        root.join(REPOSITORY_FILE)
    }

    /// Read the metadata file, failing with `NotInitialized` when absent.
    pub fn load(root: &NormalizedPath) -> Result<Self> {
        let path = Self::path(root);
        if !path.is_file() {
            return Err(Error::NotInitialized {
                path: root.to_native(),
            });
        }
        let content = io::read_text(&path)?;
        serde_yaml::from_str(&content).map_err(|e| Error::InvalidFile {
            path: REPOSITORY_FILE.to_string(),
            message: e.to_string(),
        })
    }

    /// Write the metadata file. Returns `true` when the content changed.
    pub fn save(&self, root: &NormalizedPath) -> Result<bool> {
        let content = serde_yaml::to_string(self)?;
        Ok(io::write_if_changed(&Self::path(root), &content)?)
    }
}
