use chsync_fs::RepoPath;
use chsync_fs::layout::{CHANNEL_FILE, LIBRARY_FILE, SNAPSHOT_FILE};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    Channel,
    CodeTemplate,
    Group,
    Config,
    Environment,
    Unknown,
}

/// The logical artifact a repository path belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRef {
    #[serde(rename = "type")]
    pub kind: ArtifactType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl ArtifactRef {
    fn new(kind: ArtifactType, name: Option<&str>, section: Option<String>) -> Self {
        Self {
            kind,
            name: name.map(str::to_string),
            section,
        }
    }

    fn unknown() -> Self {
        Self::new(ArtifactType::Unknown, None, None)
    }
}

fn stem(file: &str) -> &str {
    match file.rfind('.') {
        Some(0) | None => file,
        Some(idx) => &file[..idx],
    }
}

/// Strip `./`, then a single leading component when it is not itself one of
/// the artifact directories (a repository-root prefix such as `repo/`).
pub(crate) fn relative_segments(path: &str) -> Vec<&str> {
    let trimmed = path.trim_start_matches("./");
    let mut segments: Vec<&str> = trimmed
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    let first_is_artifact_dir = segments
        .first()
        .is_some_and(|s| RepoPath::from_artifact_dir(s).is_some());
    if !first_is_artifact_dir && segments.len() > 1 {
        segments.remove(0);
    }
    segments
}

/// Map a changed file path to the artifact it belongs to.
pub fn map_file_to_artifact(path: &str) -> ArtifactRef {
    let segments = relative_segments(path);
    let Some((top, rest)) = segments.split_first() else {
        return ArtifactRef::unknown();
    };

    match RepoPath::from_artifact_dir(top) {
        Some(RepoPath::Channels) => match rest.split_first() {
            Some((name, within)) => ArtifactRef::new(
                ArtifactType::Channel,
                Some(*name),
                channel_section(within),
            ),
            None => ArtifactRef::unknown(),
        },
        Some(RepoPath::CodeTemplates) => match rest {
            [lib, file] if *file == LIBRARY_FILE => {
                ArtifactRef::new(ArtifactType::CodeTemplate, Some(*lib), None)
            }
            [lib, file] if file.ends_with(".js") => ArtifactRef::new(
                ArtifactType::CodeTemplate,
                Some(*lib),
                Some(stem(file).to_string()),
            ),
            [lib, ..] => ArtifactRef::new(ArtifactType::CodeTemplate, Some(*lib), None),
            [] => ArtifactRef::unknown(),
        },
        Some(RepoPath::Groups) => match rest {
            [file] => ArtifactRef::new(ArtifactType::Group, Some(stem(file)), None),
            _ => ArtifactRef::unknown(),
        },
        Some(RepoPath::Config) if !rest.is_empty() => {
            ArtifactRef::new(ArtifactType::Config, Some(&segments.join("/")), None)
        }
        Some(RepoPath::Environments) => match rest.last() {
            Some(file) => ArtifactRef::new(ArtifactType::Environment, Some(stem(file)), None),
            None => ArtifactRef::unknown(),
        },
        _ => ArtifactRef::unknown(),
    }
}

fn channel_section(within: &[&str]) -> Option<String> {
    match within {
        ["source", ..] => Some("source".to_string()),
        ["destinations", dest, ..] => Some(format!("destinations/{}", dest)),
        ["scripts", ..] => Some("scripts".to_string()),
        [file] if *file == CHANNEL_FILE || *file == SNAPSHOT_FILE => Some("config".to_string()),
        _ => None,
    }
}
