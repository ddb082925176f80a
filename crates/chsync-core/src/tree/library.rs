use chsync_fs::layout::LIBRARY_FILE;
use chsync_fs::{NormalizedPath, io, slugify};
use chsync_model::{CodeTemplate, CodeTemplateLibrary, FileTreeEntry};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::marker::{TEMPLATE_MARKER, read_marker, with_marker};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TemplateRef {
    pub id: String,
    pub name: String,
}

/// Contents of `library.yaml`. Template bodies live in sibling `.js` files.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryFile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub enabled_channel_ids: Vec<String>,
    #[serde(default)]
    pub templates: Vec<TemplateRef>,
}

fn template_slugs(library: &CodeTemplateLibrary) -> Vec<String> {
    let mut slugs: Vec<String> = Vec::new();
    for template in &library.templates {
        let base = slugify(&template.name);
        let mut slug = base.clone();
        let mut n = 2;
        while slugs.contains(&slug) {
            slug = format!("{}-{}", base, n);
            n += 1;
        }
        slugs.push(slug);
    }
    slugs
}

/// Files of one library, relative to `code-templates/<lib-slug>/`.
pub fn library_file_tree(library: &CodeTemplateLibrary) -> Result<Vec<FileTreeEntry>> {
    let file = LibraryFile {
        id: library.id.clone(),
        name: library.name.clone(),
        description: library.description.clone(),
        enabled_channel_ids: library.enabled_channel_ids.clone(),
        templates: library
            .templates
            .iter()
            .map(|t| TemplateRef {
                id: t.id.clone(),
                name: t.name.clone(),
            })
            .collect(),
    };

    let mut entries = vec![FileTreeEntry::yaml(LIBRARY_FILE, serde_yaml::to_string(&file)?)];
    for (template, slug) in library.templates.iter().zip(template_slugs(library)) {
        entries.push(FileTreeEntry::script(
            format!("{}.js", slug),
            with_marker(TEMPLATE_MARKER, &template.id, &template.code),
        ));
    }
    Ok(entries)
}

struct ScriptFile {
    id: Option<String>,
    stem: String,
    code: String,
}

/// Read a library back from its directory.
pub fn read_library(dir: &NormalizedPath) -> Result<CodeTemplateLibrary> {
    let descriptor = dir.join(LIBRARY_FILE);
    let content = io::read_text(&descriptor)?;
    let file: LibraryFile = serde_yaml::from_str(&content).map_err(|e| Error::InvalidFile {
        path: descriptor.to_string(),
        message: e.to_string(),
    })?;

    let mut scripts = Vec::new();
    for rel in io::list_files(dir)? {
        if rel.contains('/') {
            continue;
        }
        let Some(stem) = rel.strip_suffix(".js") else {
            continue;
        };
        let content = io::read_text(&dir.join(&rel))?;
        let script = match read_marker(TEMPLATE_MARKER, &content) {
            Some((id, body)) => ScriptFile {
                id: Some(id.to_string()),
                stem: stem.to_string(),
                code: body.to_string(),
            },
            None => ScriptFile {
                id: None,
                stem: stem.to_string(),
                code: content,
            },
        };
        scripts.push(script);
    }

    let mut templates = Vec::with_capacity(file.templates.len());
    for template in &file.templates {
        let position = scripts
            .iter()
            .position(|s| s.id.as_deref() == Some(template.id.as_str()))
            .or_else(|| {
                scripts
                    .iter()
                    .position(|s| s.id.is_none() && s.stem == slugify(&template.name))
            });
        let code = match position {
            Some(pos) => scripts.remove(pos).code,
            None => {
                warn!(library = %file.name, template = %template.name, "Template script missing");
                String::new()
            }
        };
        templates.push(CodeTemplate {
            id: template.id.clone(),
            name: template.name.clone(),
            code,
        });
    }
    for script in scripts {
        templates.push(CodeTemplate {
            id: script.id.unwrap_or_default(),
            name: script.stem,
            code: script.code,
        });
    }

    Ok(CodeTemplateLibrary {
        id: file.id,
        name: file.name,
        description: file.description,
        enabled_channel_ids: file.enabled_channel_ids,
        templates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn library() -> CodeTemplateLibrary {
        CodeTemplateLibrary {
            id: "lib-1".into(),
            name: "Util Lib".into(),
            description: String::new(),
            enabled_channel_ids: vec!["ch-1".into(), "ch-2".into()],
            templates: vec![
                CodeTemplate {
                    id: "t-1".into(),
                    name: "Format Date".into(),
                    code: "function formatDate(d) {}\n".into(),
                },
                CodeTemplate {
                    id: "t-2".into(),
                    name: "Pad".into(),
                    code: "function pad(s) {}\n".into(),
                },
            ],
        }
    }

    fn write_tree(dir: &NormalizedPath, entries: &[FileTreeEntry]) {
        for entry in entries {
            io::write_text(&dir.join(&entry.path), &entry.content).unwrap();
        }
    }

    #[test]
    fn tree_has_descriptor_and_marked_scripts() {
        let entries = library_file_tree(&library()).unwrap();
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["library.yaml", "format-date.js", "pad.js"]);
        assert!(entries[1].content.starts_with("// @template-id t-1\n"));
        assert!(entries[0].content.contains("enabledChannelIds"));
    }

    #[test]
    fn read_back_restores_library() {
        let temp = TempDir::new().unwrap();
        let dir = NormalizedPath::new(temp.path());
        write_tree(&dir, &library_file_tree(&library()).unwrap());

        assert_eq!(read_library(&dir).unwrap(), library());
    }

    #[test]
    fn edited_script_is_picked_up_by_marker() {
        let temp = TempDir::new().unwrap();
        let dir = NormalizedPath::new(temp.path());
        write_tree(&dir, &library_file_tree(&library()).unwrap());
        io::write_text(
            &dir.join("format-date.js"),
            "// @template-id t-1\nfunction formatDate(d) { return d; }\n",
        )
        .unwrap();

        let read = read_library(&dir).unwrap();
        assert_eq!(read.templates[0].code, "function formatDate(d) { return d; }\n");
    }

    #[test]
    fn unlisted_scripts_are_appended() {
        let temp = TempDir::new().unwrap();
        let dir = NormalizedPath::new(temp.path());
        write_tree(&dir, &library_file_tree(&library()).unwrap());
        io::write_text(&dir.join("extra.js"), "function extra() {}\n").unwrap();

        let read = read_library(&dir).unwrap();
        assert_eq!(read.templates.len(), 3);
        assert_eq!(read.templates[2].name, "extra");
        assert_eq!(read.templates[2].id, "");
    }
}
