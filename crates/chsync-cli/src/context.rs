//! Synchronization root detection
//!
//! Commands work from anywhere below a root, the way git does: the nearest
//! ancestor holding `repository.yaml` wins.

use std::path::{Path, PathBuf};

use chsync_core::config::ConfigResolver;
use chsync_core::{JsonChannelCodec, SyncConfig, SyncEngine};
use chsync_fs::NormalizedPath;
use chsync_fs::layout::REPOSITORY_FILE;
use chsync_git::GitClient;
use tracing::debug;

use crate::error::Result;

/// Walk up from `start` to the first directory containing `repository.yaml`.
pub fn find_root(start: &Path) -> Option<PathBuf> {
    let start = absolute(start);
    start
        .ancestors()
        .find(|dir| dir.join(REPOSITORY_FILE).is_file())
        .map(Path::to_path_buf)
}

fn absolute(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// The detected root, or `start` itself when none is found so that the
/// engine reports the missing metadata.
pub fn resolve_root(start: &Path) -> NormalizedPath {
    let root = find_root(start).unwrap_or_else(|| absolute(start));
    NormalizedPath::new(root)
}

pub type CliEngine = SyncEngine<JsonChannelCodec, GitClient>;

pub fn load_config(root: &NormalizedPath) -> Result<SyncConfig> {
    Ok(ConfigResolver::new(root.clone()).resolve()?)
}

/// Engine over the JSON codec and git for `root`.
pub fn open_engine(root: NormalizedPath) -> Result<CliEngine> {
    let config = load_config(&root)?;
    debug!(root = %root, "Opening channel repository");
    let vcs = GitClient::new(root.to_native());
    Ok(SyncEngine::new(root, JsonChannelCodec::new(), vcs, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_root_from_nested_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(REPOSITORY_FILE), "engine: generic\n").unwrap();
        let nested = temp.path().join("channels/adt-receiver/source");
        fs::create_dir_all(&nested).unwrap();

        let found = find_root(&nested).unwrap();
        assert_eq!(
            fs::canonicalize(found).unwrap(),
            fs::canonicalize(temp.path()).unwrap()
        );
    }

    #[test]
    fn falls_back_to_start_without_metadata() {
        let temp = TempDir::new().unwrap();
        assert!(find_root(temp.path()).is_none());
        let root = resolve_root(temp.path());
        assert!(root.is_dir());
    }
}
