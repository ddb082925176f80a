//! Push command implementation
//!
//! Reads native exports from disk and hands them to the engine.

use std::path::{Path, PathBuf};

use colored::Colorize;

use chsync_core::{ChannelDocument, ChannelFilter, PushOptions, PushReport, PushRequest};
use chsync_model::CodeTemplateLibrary;

use crate::context::{open_engine, resolve_root};
use crate::error::{CliError, Result};

#[derive(Debug, Clone, Default)]
pub struct PushArgs {
    pub documents: Vec<PathBuf>,
    pub libraries: Vec<PathBuf>,
    pub no_mask: bool,
    pub message: Option<String>,
    pub push: bool,
    pub channels: Vec<String>,
}

pub fn run_push(path: &Path, args: &PushArgs, json: bool) -> Result<()> {
    let engine = open_engine(resolve_root(path))?;

    let request = PushRequest {
        documents: read_documents(&args.documents)?,
        libraries: read_libraries(&args.libraries)?,
    };

    let mut options = PushOptions::from(engine.config());
    if args.no_mask {
        options.mask_secrets = false;
    }
    if args.message.is_some() {
        options.message = args.message.clone();
    }
    options.push_remote |= args.push;
    if !args.channels.is_empty() {
        options.filter = ChannelFilter::only(args.channels.iter().cloned());
    }

    let report = engine.push(&request, &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if let Some(error) = &report.vcs_error {
        return Err(CliError::user(format!("version control: {error}")));
    }
    if !report.errors.is_empty() {
        return Err(CliError::user(format!(
            "{} document(s) could not be pushed",
            report.errors.len()
        )));
    }
    Ok(())
}

/// Expand directories into their `*.json` files, sorted by name.
fn document_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            found.sort();
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn read_documents(inputs: &[PathBuf]) -> Result<Vec<ChannelDocument>> {
    document_paths(inputs)?
        .into_iter()
        .map(|path| {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| CliError::user(format!("cannot read {}: {e}", path.display())))?;
            Ok(ChannelDocument::new(path.display().to_string(), content))
        })
        .collect()
}

fn read_libraries(inputs: &[PathBuf]) -> Result<Vec<CodeTemplateLibrary>> {
    document_paths(inputs)?
        .into_iter()
        .map(|path| {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| CliError::user(format!("cannot read {}: {e}", path.display())))?;
            serde_json::from_str(&content)
                .map_err(|e| CliError::user(format!("{}: invalid library: {e}", path.display())))
        })
        .collect()
}

fn print_report(report: &PushReport) {
    for channel in &report.channels {
        println!(
            "{} {} -> channels/{} ({} written, {} removed)",
            "+".green(),
            channel.name.bold(),
            channel.slug,
            channel.files_written.len(),
            channel.files_removed.len()
        );
        for field in &channel.masked {
            println!(
                "    {} {} as {}",
                "masked".yellow(),
                field.path,
                format!("${{{}}}", field.parameter_name).cyan()
            );
        }
    }
    for library in &report.libraries {
        println!(
            "{} {} -> code-templates/{} ({} written, {} removed)",
            "+".green(),
            library.name.bold(),
            library.slug,
            library.files_written.len(),
            library.files_removed.len()
        );
    }
    for warning in &report.warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }
    for error in &report.errors {
        println!("{} {}: {}", "!".red(), error.channel.bold(), error.message);
    }
    if let Some(commit) = &report.commit {
        let short: String = commit.chars().take(8).collect();
        let remote = if report.pushed { " and pushed" } else { "" };
        println!("{} {}{}", "Committed".green().bold(), short.yellow(), remote);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn directories_expand_to_sorted_json_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.json"), "{}").unwrap();
        fs::write(temp.path().join("a.json"), "{}").unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();
        let single = temp.path().join("single.xml");

        let paths = document_paths(&[temp.path().to_path_buf(), single.clone()]).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json", "single.xml"]);
    }

    #[test]
    fn invalid_library_names_the_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        fs::write(&path, "[1, 2").unwrap();

        let err = read_libraries(&[path]).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
