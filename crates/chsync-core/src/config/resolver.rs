//! Layered loading of `config.toml`

use std::path::PathBuf;

use chsync_fs::{NormalizedPath, RepoPath, io};
use toml::Table;

use super::settings::SyncConfig;
use crate::{Error, Result};

/// Repository configuration, relative to the synchronization root.
pub const CONFIG_FILE: &str = ".chsync/config.toml";

/// Machine-local overrides, git-ignored.
pub const LOCAL_CONFIG_FILE: &str = ".chsync/config.local.toml";

/// Loads and merges configuration in order, later layers winning:
///
/// 1. `<config_dir>/channel-sync/config.toml`
/// 2. `.chsync/config.toml`
/// 3. `.chsync/config.local.toml`
///
/// Tables are merged key by key; any other value replaces the earlier one.
/// Missing layers are skipped.
pub struct ConfigResolver {
    root: NormalizedPath,
    /// Replaces `dirs::config_dir()` when set
    global_config_dir_override: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(root: NormalizedPath) -> Self {
        Self {
            root,
            global_config_dir_override: None,
        }
    }

    pub fn with_global_config_dir(root: NormalizedPath, global_config_dir: PathBuf) -> Self {
        Self {
            root,
            global_config_dir_override: Some(global_config_dir),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.global_config_dir_override {
            return Some(dir.clone());
        }
        dirs::config_dir().map(|d| d.join("channel-sync"))
    }

    /// Every candidate layer path, lowest priority first.
    pub fn layer_paths(&self) -> Vec<NormalizedPath> {
        let mut paths = Vec::new();
        if let Some(dir) = self.global_config_dir() {
            paths.push(NormalizedPath::new(dir.join("config.toml")));
        }
        paths.push(self.root.join(CONFIG_FILE));
        paths.push(self.root.join(LOCAL_CONFIG_FILE));
        paths
    }

    pub fn resolve(&self) -> Result<SyncConfig> {
        let mut merged = Table::new();
        for path in self.layer_paths() {
            if !path.is_file() {
                tracing::debug!(path = %path, "Config layer not present");
                continue;
            }
            tracing::debug!(path = %path, "Loading config layer");
            let content = io::read_text(&path)?;
            let layer: Table = content.parse().map_err(|e: toml::de::Error| Error::Config {
                path: path.to_native(),
                message: e.message().to_string(),
            })?;
            merge_tables(&mut merged, layer);
        }

        toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| Error::Config {
                path: self.root.join(RepoPath::ToolConfig.as_str()).to_native(),
                message: e.message().to_string(),
            })
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn has_config(&self) -> bool {
        self.root.join(CONFIG_FILE).is_file()
    }

    pub fn has_local_overrides(&self) -> bool {
        self.root.join(LOCAL_CONFIG_FILE).is_file()
    }
}

/// Deep-merge `overlay` into `base`.
pub fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
