//! Diff command implementation
//!
//! Compares two native channel documents without touching the repository.

use std::path::Path;

use colored::Colorize;

use chsync_diff::{DiffOptions, DiffResult, diff, format_for_cli};
use chsync_model::FlatChannel;

use super::decompose_file;
use crate::context::{find_root, load_config};
use crate::error::Result;

pub fn run_diff(
    root: &Path,
    old: &Path,
    new: &Path,
    ignore_whitespace: bool,
    context: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut options = default_options(root)?;
    options.ignore_whitespace |= ignore_whitespace;
    if let Some(lines) = context {
        options.context_lines = lines;
    }

    let old_channel = FlatChannel::from(&decompose_file(old)?);
    let new_channel = FlatChannel::from(&decompose_file(new)?);
    let result = diff(&old_channel, &new_channel, &options);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

/// Diff settings from the enclosing repository's configuration, if any.
fn default_options(root: &Path) -> Result<DiffOptions> {
    let Some(root) = find_root(root) else {
        return Ok(DiffOptions::default());
    };
    let config = load_config(&chsync_fs::NormalizedPath::new(root))?;
    Ok(DiffOptions {
        ignore_whitespace: config.diff.ignore_whitespace,
        context_lines: config.diff.context_lines,
    })
}

fn print_result(result: &DiffResult) {
    if result.is_empty() {
        println!(
            "{} {} has no changes",
            "OK".green().bold(),
            result.channel_name.bold()
        );
        return;
    }

    for line in format_for_cli(result).lines() {
        let styled = if line.starts_with('+') {
            line.green()
        } else if line.starts_with('-') {
            line.red()
        } else if line.starts_with("@@") {
            line.cyan()
        } else {
            line.normal()
        };
        println!("{styled}");
    }
}
