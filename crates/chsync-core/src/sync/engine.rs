//! SyncEngine implementation

use std::collections::{BTreeMap, HashSet};

use chsync_delta::{DeltaResult, DetectOptions, LibraryRef};
use chsync_fs::layout::{CHANNEL_FILE, SNAPSHOT_FILE};
use chsync_fs::{NormalizedPath, RepoPath, io, slugify};
use chsync_git::VersionControl;
use chsync_model::{
    ChannelMetadata, CodeTemplateLibrary, DecomposedChannel, FileTreeEntry, Value,
};
use chsync_vars::{ResolverOptions, VariableResolver};
use tracing::{debug, info, warn};

use super::report::{
    ChannelDocument, ChannelError, PullOptions, PullReport, PulledChannel, PushOptions,
    PushReport, PushRequest, PushedChannel, PushedLibrary,
};
use crate::codec::{AssembleOptions, ChannelCodec, DecomposeOptions};
use crate::config::{CONFIG_FILE, LOCAL_CONFIG_FILE, RepositoryMetadata, SyncConfig};
use crate::overlay::overlay_directory;
use crate::tree::{library_file_tree, read_library};
use crate::{Error, Result};

/// Files written into one directory, and stale ones removed from it.
struct DirectoryWrite {
    written: Vec<String>,
    removed: Vec<String>,
}

/// Drives push and pull for one synchronization root.
///
/// The working directory and index are shared state: run at most one
/// workflow at a time per root.
pub struct SyncEngine<C, V> {
    root: NormalizedPath,
    codec: C,
    vcs: V,
    config: SyncConfig,
}

impl<C: ChannelCodec, V: VersionControl> SyncEngine<C, V> {
    pub fn new(root: NormalizedPath, codec: C, vcs: V, config: SyncConfig) -> Self {
        Self {
            root,
            codec,
            vcs,
            config,
        }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    fn channels_dir(&self) -> NormalizedPath {
        self.root.join(RepoPath::Channels.as_str())
    }

    fn libraries_dir(&self) -> NormalizedPath {
        self.root.join(RepoPath::CodeTemplates.as_str())
    }

    fn ensure_initialized(&self) -> Result<()> {
        if RepositoryMetadata::path(&self.root).is_file() {
            Ok(())
        } else {
            Err(Error::NotInitialized {
                path: self.root.to_native(),
            })
        }
    }

    /// Prepare the root for synchronization.
    ///
    /// Safe to run again: existing configuration is left alone and the
    /// ignore rule is only appended once. Returns the paths written.
    pub fn init(&self, metadata: &RepositoryMetadata) -> Result<Vec<String>> {
        self.vcs.init()?;
        let mut written = Vec::new();

        if metadata.save(&self.root)? {
            written.push(chsync_fs::layout::REPOSITORY_FILE.to_string());
        }

        let config_path = self.root.join(CONFIG_FILE);
        if !config_path.is_file() {
            io::write_text(&config_path, &SyncConfig::default_file_content())?;
            written.push(CONFIG_FILE.to_string());
        }

        let gitignore = self.root.join(".gitignore");
        let mut content = if gitignore.is_file() {
            io::read_text(&gitignore)?
        } else {
            String::new()
        };
        if !content.lines().any(|line| line.trim() == LOCAL_CONFIG_FILE) {
            if !content.is_empty() && !content.ends_with('\n') {
                content.push('\n');
            }
            content.push_str(LOCAL_CONFIG_FILE);
            content.push('\n');
            io::write_text(&gitignore, &content)?;
            written.push(".gitignore".to_string());
        }

        info!(root = %self.root, files = written.len(), "Initialized channel repository");
        Ok(written)
    }

    /// Externalize channels and libraries, then commit the result.
    pub fn push(&self, request: &PushRequest, options: &PushOptions) -> Result<PushReport> {
        self.ensure_initialized()?;
        let mut report = PushReport::default();
        let mut slugs = HashSet::new();

        for document in &request.documents {
            match self.push_channel(document, options, &mut slugs) {
                Ok(Some(pushed)) => report.channels.push(pushed),
                Ok(None) => {}
                Err(error) => {
                    warn!(origin = %document.origin, error = %error.message, "Channel push failed");
                    report.errors.push(error);
                }
            }
        }

        for library in &request.libraries {
            match self.push_library(library) {
                Ok(pushed) => report.libraries.push(pushed),
                Err(e) => report.errors.push(ChannelError::new(&library.name, e)),
            }
        }

        self.commit_push(options, &mut report)?;
        Ok(report)
    }

    fn push_channel(
        &self,
        document: &ChannelDocument,
        options: &PushOptions,
        slugs: &mut HashSet<String>,
    ) -> std::result::Result<Option<PushedChannel>, ChannelError> {
        let fail = |channel: &str, e: Error| ChannelError::new(channel, e);

        let mut decomposed = self
            .codec
            .decompose(&document.content, &DecomposeOptions::default())
            .map_err(|e| fail(&document.origin, e))?;
        let name = decomposed.metadata.name.clone();
        let slug = slugify(&name);

        if !options.filter.matches(&name, &slug) {
            debug!(channel = %name, "Channel excluded by filter");
            return Ok(None);
        }
        if !slugs.insert(slug.clone()) {
            return Err(ChannelError::new(
                &name,
                format!("directory 'channels/{}' is already used by another channel in this push", slug),
            ));
        }

        let (masked, snapshot) = if options.mask_secrets {
            let masked = chsync_secrets::mask_decomposed(
                &mut decomposed,
                &name,
                &self.config.secrets.extra_fields,
            );
            let snapshot = if masked.is_empty() {
                document.content.clone()
            } else {
                self.codec
                    .assemble(&decomposed, &AssembleOptions::with_snapshot(document.content.as_str()))
                    .map_err(|e| fail(&name, e))?
            };
            (masked, snapshot)
        } else {
            (Vec::new(), document.content.clone())
        };
        for field in &masked {
            debug!(channel = %name, path = %field.path, parameter = %field.parameter_name, "Masked field");
        }

        let mut entries = self.codec.to_file_tree(&decomposed).map_err(|e| fail(&name, e))?;
        entries.push(FileTreeEntry::document(SNAPSHOT_FILE, snapshot));

        let relative = format!("{}/{}", RepoPath::Channels, slug);
        let write = self
            .write_directory(&relative, &entries)
            .map_err(|e| fail(&name, e))?;

        info!(
            channel = %name,
            written = write.written.len(),
            removed = write.removed.len(),
            masked = masked.len(),
            "Externalized channel"
        );
        Ok(Some(PushedChannel {
            name,
            slug,
            files_written: write.written,
            files_removed: write.removed,
            masked,
        }))
    }

    fn push_library(&self, library: &CodeTemplateLibrary) -> Result<PushedLibrary> {
        let slug = slugify(&library.name);
        let entries = library_file_tree(library)?;
        let write = self.write_directory(&format!("{}/{}", RepoPath::CodeTemplates, slug), &entries)?;
        info!(library = %library.name, written = write.written.len(), "Externalized code template library");
        Ok(PushedLibrary {
            name: library.name.clone(),
            slug,
            files_written: write.written,
            files_removed: write.removed,
        })
    }

    /// Write `entries` beneath `relative_dir`, removing files the entries no
    /// longer produce.
    ///
    /// All or nothing: when any file fails, the files already touched are put
    /// back so the next commit never records a half-written directory.
    fn write_directory(&self, relative_dir: &str, entries: &[FileTreeEntry]) -> Result<DirectoryWrite> {
        let dir = self.root.join(relative_dir);
        let mut undo = Vec::new();
        match apply_directory(&dir, relative_dir, entries, &mut undo) {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(dir = %relative_dir, files = undo.len(), "Rolling back partial write");
                roll_back(&dir, undo);
                Err(e)
            }
        }
    }

    fn commit_push(&self, options: &PushOptions, report: &mut PushReport) -> Result<()> {
        self.vcs.add(&[])?;
        if !self.vcs.has_staged_changes()? {
            report.warnings.push("No changes to commit".to_string());
            return Ok(());
        }

        let message = options
            .message
            .clone()
            .unwrap_or_else(|| default_commit_message(report));
        match self.vcs.commit(&message) {
            Ok(hash) => {
                info!(commit = %hash, "Committed push");
                report.commit = Some(hash);
            }
            Err(chsync_git::Error::NothingToCommit) => {
                report.warnings.push("No changes to commit".to_string());
                return Ok(());
            }
            Err(e) => {
                report.vcs_error = Some(e.to_string());
                return Ok(());
            }
        }

        if options.push_remote {
            let remote = self.config.sync.remote.as_str();
            match self.vcs.push(Some(remote), self.config.sync.branch.as_deref()) {
                Ok(()) => report.pushed = true,
                Err(e) => report.vcs_error = Some(e.to_string()),
            }
        }
        Ok(())
    }

    /// Rebuild native documents from the repository.
    pub async fn pull(&self, options: &PullOptions) -> Result<PullReport> {
        self.ensure_initialized()?;
        if options.update_from_remote {
            self.vcs.pull(
                Some(self.config.sync.remote.as_str()),
                self.config.sync.branch.as_deref(),
            )?;
        }

        let mut resolver = VariableResolver::new(ResolverOptions {
            strict: options.strict,
            extra: options.extra_variables.clone(),
            process_env: options.process_env.clone(),
        });
        resolver
            .load_environment(&self.root.to_native(), options.environment.as_deref())
            .await?;

        let mut report = PullReport::default();
        let channels_dir = self.channels_dir();
        for slug in io::list_dirs(&channels_dir)? {
            let dir = channels_dir.join(&slug);
            let snapshot_path = dir.join(SNAPSHOT_FILE);
            if !snapshot_path.is_file() {
                warn!(channel = %slug, "Channel directory has no snapshot, skipping");
                report
                    .warnings
                    .push(format!("channels/{}: no {} file, skipped", slug, SNAPSHOT_FILE));
                continue;
            }

            match self.pull_channel(&slug, &dir, &snapshot_path, &resolver, options, &mut report.warnings) {
                Ok(Some(pulled)) => report.channels.push(pulled),
                Ok(None) => {}
                Err(e) => {
                    warn!(channel = %slug, error = %e, "Channel pull failed");
                    report.errors.push(ChannelError::new(&slug, e));
                }
            }
        }

        let libraries_dir = self.libraries_dir();
        for slug in io::list_dirs(&libraries_dir)? {
            match read_library(&libraries_dir.join(&slug)) {
                Ok(library) => report.libraries.push(library),
                Err(e) => report.errors.push(ChannelError::new(&slug, e)),
            }
        }

        info!(
            channels = report.channels.len(),
            libraries = report.libraries.len(),
            errors = report.errors.len(),
            "Pull finished"
        );
        Ok(report)
    }

    fn pull_channel(
        &self,
        slug: &str,
        dir: &NormalizedPath,
        snapshot_path: &NormalizedPath,
        resolver: &VariableResolver,
        options: &PullOptions,
        warnings: &mut Vec<String>,
    ) -> Result<Option<PulledChannel>> {
        let snapshot = io::read_text(snapshot_path)?;
        let mut decomposed = self.codec.decompose(&snapshot, &DecomposeOptions::default())?;
        if !options.filter.matches(&decomposed.metadata.name, slug) {
            return Ok(None);
        }

        let overlay = overlay_directory(&mut decomposed, dir)?;
        for (path, reason) in &overlay.not_found {
            warnings.push(format!("channels/{}/{}: {}", slug, path, reason));
        }
        let mut overlaid = overlay.applied;
        overlaid.extend(overlay.removed);

        let unresolved_vars = resolve_connectors(&mut decomposed, resolver)?;
        if !unresolved_vars.is_empty() {
            debug!(channel = %slug, unresolved = ?unresolved_vars, "Unresolved variables left verbatim");
        }

        let document = self
            .codec
            .assemble(&decomposed, &AssembleOptions::with_snapshot(snapshot))?;

        Ok(Some(PulledChannel {
            name: decomposed.metadata.name,
            slug: slug.to_string(),
            document,
            unresolved_vars,
            overlaid,
        }))
    }

    /// Every externalized code-template library.
    pub fn read_code_template_libraries(&self) -> Result<Vec<CodeTemplateLibrary>> {
        let dir = self.libraries_dir();
        io::list_dirs(&dir)?
            .iter()
            .map(|slug| read_library(&dir.join(slug)))
            .collect()
    }

    /// Channel metadata from every `channels/<slug>/channel.yaml`.
    pub fn read_channel_metadata(&self) -> Result<Vec<ChannelMetadata>> {
        let dir = self.channels_dir();
        let mut channels = Vec::new();
        for slug in io::list_dirs(&dir)? {
            let path = dir.join(&slug).join(CHANNEL_FILE);
            if !path.is_file() {
                continue;
            }
            let content = io::read_text(&path)?;
            let metadata: ChannelMetadata =
                serde_yaml::from_str(&content).map_err(|e| Error::InvalidFile {
                    path: format!("channels/{}/{}", slug, CHANNEL_FILE),
                    message: e.to_string(),
                })?;
            channels.push(metadata);
        }
        Ok(channels)
    }

    /// Cascade inputs for delta detection, read from the repository.
    pub fn delta_context(&self) -> Result<DetectOptions> {
        let libraries = self
            .read_code_template_libraries()?
            .into_iter()
            .map(|library| LibraryRef {
                name: library.name,
                enabled_channel_ids: library.enabled_channel_ids,
            })
            .collect();

        let channels = self.read_channel_metadata()?;
        let id_to_name: BTreeMap<String, String> = channels
            .iter()
            .filter(|c| !c.id.is_empty())
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect();
        let names = channels.into_iter().map(|c| c.name).collect();

        Ok(DetectOptions {
            include_cascades: true,
            code_template_libraries: Some(libraries),
            channel_id_to_name: Some(id_to_name),
            all_channel_names: Some(names),
        })
    }

    /// Artifacts changed between `from` and `to` (the working tree when `None`).
    pub fn delta(&self, from: &str, to: Option<&str>, include_cascades: bool) -> Result<DeltaResult> {
        let paths = self.vcs.diff(from, to)?;
        let mut options = self.delta_context()?;
        options.include_cascades = include_cascades;
        Ok(chsync_delta::detect(&paths, &options))
    }
}

fn default_commit_message(report: &PushReport) -> String {
    let mut message = format!("Sync {} channel(s)", report.channels.len());
    if !report.libraries.is_empty() {
        message.push_str(&format!(
            " and {} code template librar{}",
            report.libraries.len(),
            if report.libraries.len() == 1 { "y" } else { "ies" }
        ));
    }
    message
}

/// Resolve placeholders in every connector's properties in one pass, so a
/// strict failure names every unresolved variable of the channel. Scripts are
/// opaque and never expanded.
fn resolve_connectors(channel: &mut DecomposedChannel, resolver: &VariableResolver) -> Result<Vec<String>> {
    let properties: Vec<Value> = std::iter::once(&channel.source)
        .chain(channel.destinations.iter().map(|d| &d.connector))
        .map(|connector| Value::Mapping(connector.properties.clone()))
        .collect();
    let resolution = resolver.resolve_object(&Value::Sequence(properties))?;

    let Value::Sequence(resolved) = resolution.resolved else {
        return Err(Error::codec("variable resolution changed the property layout"));
    };
    let connectors = std::iter::once(&mut channel.source)
        .chain(channel.destinations.iter_mut().map(|d| &mut d.connector));
    for (connector, value) in connectors.zip(resolved) {
        if let Value::Mapping(properties) = value {
            connector.properties = properties;
        }
    }
    Ok(resolution.unresolved_vars)
}

/// A file touched by [`apply_directory`] and its content beforehand.
struct Touched {
    path: NormalizedPath,
    previous: Option<String>,
}

fn apply_directory(
    dir: &NormalizedPath,
    relative_dir: &str,
    entries: &[FileTreeEntry],
    undo: &mut Vec<Touched>,
) -> Result<DirectoryWrite> {
    let wanted: HashSet<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    let mut result = DirectoryWrite {
        written: Vec::new(),
        removed: Vec::new(),
    };

    for existing in io::list_files(dir)? {
        if !wanted.contains(existing.as_str()) {
            let path = dir.join(&existing);
            let previous = io::read_text(&path)?;
            io::remove_file_pruning(&path, dir)?;
            undo.push(Touched {
                path,
                previous: Some(previous),
            });
            result.removed.push(format!("{}/{}", relative_dir, existing));
        }
    }
    for entry in entries {
        let path = dir.join(&entry.path);
        let previous = if path.is_file() {
            Some(io::read_text(&path)?)
        } else {
            None
        };
        if io::write_if_changed(&path, &entry.content)? {
            undo.push(Touched { path, previous });
            result.written.push(format!("{}/{}", relative_dir, entry.path));
        }
    }
    Ok(result)
}

/// Undo `touched` newest first. Failures are logged and skipped.
fn roll_back(dir: &NormalizedPath, touched: Vec<Touched>) {
    for Touched { path, previous } in touched.into_iter().rev() {
        let restored = match previous {
            Some(content) => io::write_text(&path, &content),
            None => io::remove_file_pruning(&path, dir),
        };
        if let Err(e) = restored {
            warn!(path = %path, error = %e, "Could not roll back file");
        }
    }
}
