use std::collections::{BTreeMap, BTreeSet, HashSet};

use chsync_fs::slugify;
use serde::Serialize;
use tracing::debug;

use crate::artifact::{ArtifactType, map_file_to_artifact};

/// A code-template library and the channels it is enabled for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LibraryRef {
    pub name: String,
    pub enabled_channel_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectOptions {
    pub include_cascades: bool,
    pub code_template_libraries: Option<Vec<LibraryRef>>,
    pub channel_id_to_name: Option<BTreeMap<String, String>>,
    /// Every channel in the repository, cascaded on environment changes
    pub all_channel_names: Option<Vec<String>>,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            include_cascades: true,
            code_template_libraries: None,
            channel_id_to_name: None,
            all_channel_names: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedChannel {
    pub channel_name: String,
    pub changed_files: Vec<String>,
    /// Sorted, without duplicates
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedCodeTemplate {
    pub library_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedConfig {
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadedChannel {
    pub channel_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaResult {
    pub changed_channels: Vec<ChangedChannel>,
    pub changed_code_templates: Vec<ChangedCodeTemplate>,
    pub changed_config: Vec<ChangedConfig>,
    /// Never contains a channel already listed in `changed_channels`
    pub cascaded_channels: Vec<CascadedChannel>,
    pub total_affected: usize,
    pub summary: String,
}

impl DeltaResult {
    pub fn is_empty(&self) -> bool {
        self.total_affected == 0
            && self.changed_code_templates.is_empty()
            && self.changed_config.is_empty()
    }
}

const ENVIRONMENT_REASON: &str = "Environment config changed";

fn library_reason(library: &str) -> String {
    format!("Uses modified code template library '{}'", library)
}

/// Channels enabled for any library touched by `changed`.
///
/// Libraries match by name or by their directory slug. Each channel ID is
/// listed once, with the first library that reached it as the reason; the
/// channel name is the raw ID.
pub fn find_cascades(
    changed: &[ChangedCodeTemplate],
    libraries: &[LibraryRef],
) -> Vec<CascadedChannel> {
    let mut seen_libraries = HashSet::new();
    let mut seen_ids = HashSet::new();
    let mut cascades = Vec::new();

    for template in changed {
        if !seen_libraries.insert(template.library_name.as_str()) {
            continue;
        }
        let matching = libraries.iter().filter(|lib| {
            lib.name == template.library_name || slugify(&lib.name) == template.library_name
        });
        for library in matching {
            for id in &library.enabled_channel_ids {
                if seen_ids.insert(id.clone()) {
                    cascades.push(CascadedChannel {
                        channel_name: id.clone(),
                        channel_id: Some(id.clone()),
                        reason: library_reason(&template.library_name),
                    });
                }
            }
        }
    }
    cascades
}

/// Map changed paths to artifacts and expand cascades.
pub fn detect(paths: &[String], options: &DetectOptions) -> DeltaResult {
    let mut changed_channels: Vec<ChangedChannel> = Vec::new();
    let mut sections: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut changed_code_templates: Vec<ChangedCodeTemplate> = Vec::new();
    let mut changed_config: Vec<ChangedConfig> = Vec::new();
    let mut environment_changed = false;

    for path in paths {
        let artifact = map_file_to_artifact(path);
        debug!(path = %path, kind = ?artifact.kind, "Mapped changed file");

        match (artifact.kind, artifact.name) {
            (ArtifactType::Channel, Some(name)) => {
                match changed_channels.iter_mut().find(|c| c.channel_name == name) {
                    Some(entry) => entry.changed_files.push(path.clone()),
                    None => changed_channels.push(ChangedChannel {
                        channel_name: name.clone(),
                        changed_files: vec![path.clone()],
                        sections: Vec::new(),
                    }),
                }
                let entry = sections.entry(name).or_default();
                if let Some(section) = artifact.section {
                    entry.insert(section);
                }
            }
            (ArtifactType::CodeTemplate, Some(library_name)) => {
                let template = ChangedCodeTemplate {
                    library_name,
                    template_name: artifact.section,
                };
                if !changed_code_templates.contains(&template) {
                    changed_code_templates.push(template);
                }
            }
            (ArtifactType::Config, Some(file)) => {
                if !changed_config.iter().any(|c| c.file == file) {
                    changed_config.push(ChangedConfig { file });
                }
            }
            (ArtifactType::Environment, _) => environment_changed = true,
            _ => {}
        }
    }

    for channel in &mut changed_channels {
        if let Some(set) = sections.remove(&channel.channel_name) {
            channel.sections = set.into_iter().collect();
        }
    }

    let cascaded_channels = if options.include_cascades {
        cascade(
            &changed_channels,
            &changed_code_templates,
            environment_changed,
            options,
        )
    } else {
        Vec::new()
    };

    let total_affected = changed_channels.len() + cascaded_channels.len();
    let summary = summarize(
        paths.is_empty(),
        total_affected,
        changed_code_templates.len(),
        changed_config.len(),
    );

    DeltaResult {
        changed_channels,
        changed_code_templates,
        changed_config,
        cascaded_channels,
        total_affected,
        summary,
    }
}

fn cascade(
    changed_channels: &[ChangedChannel],
    changed_templates: &[ChangedCodeTemplate],
    environment_changed: bool,
    options: &DetectOptions,
) -> Vec<CascadedChannel> {
    let mut candidates = Vec::new();

    if let Some(libraries) = &options.code_template_libraries {
        for mut cascaded in find_cascades(changed_templates, libraries) {
            if let (Some(map), Some(id)) = (&options.channel_id_to_name, &cascaded.channel_id) {
                if let Some(name) = map.get(id) {
                    cascaded.channel_name = name.clone();
                }
            }
            candidates.push(cascaded);
        }
    }

    if environment_changed {
        if let Some(all) = &options.all_channel_names {
            candidates.extend(all.iter().map(|name| CascadedChannel {
                channel_name: name.clone(),
                channel_id: None,
                reason: ENVIRONMENT_REASON.to_string(),
            }));
        }
    }

    let direct: HashSet<&str> = changed_channels
        .iter()
        .map(|c| c.channel_name.as_str())
        .collect();
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| {
            !direct.contains(c.channel_name.as_str())
                && !direct.contains(slugify(&c.channel_name).as_str())
        })
        .filter(|c| seen.insert(c.channel_name.clone()))
        .collect()
}

fn count(n: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", n, if n == 1 { singular } else { plural })
}

fn summarize(no_input: bool, channels: usize, templates: usize, config: usize) -> String {
    if no_input || channels + templates + config == 0 {
        return "No changes".to_string();
    }
    let mut parts = Vec::new();
    if channels > 0 {
        parts.push(count(channels, "channel", "channels"));
    }
    if templates > 0 {
        parts.push(count(templates, "code template", "code templates"));
    }
    if config > 0 {
        parts.push(count(config, "config file", "config files"));
    }
    parts.join(", ")
}
