//! Pull command implementation

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use colored::Colorize;

use chsync_core::{ChannelFilter, PullOptions, PullReport};
use chsync_fs::{NormalizedPath, io, slugify};

use crate::context::{open_engine, resolve_root};
use crate::error::{CliError, Result};

#[derive(Debug, Clone, Default)]
pub struct PullArgs {
    pub environment: Option<String>,
    pub strict: bool,
    /// `NAME=VALUE` pairs
    pub variables: Vec<String>,
    pub channels: Vec<String>,
    pub out: Option<PathBuf>,
    pub update: bool,
}

pub async fn run_pull(path: &Path, args: &PullArgs, json: bool) -> Result<()> {
    let engine = open_engine(resolve_root(path))?;

    let mut options = PullOptions::from(engine.config());
    if args.environment.is_some() {
        options.environment = args.environment.clone();
    }
    options.strict |= args.strict;
    options.extra_variables = parse_variables(&args.variables)?;
    options.update_from_remote = args.update;
    if !args.channels.is_empty() {
        options.filter = ChannelFilter::only(args.channels.iter().cloned());
    }

    let report = engine.pull(&options).await?;

    let written = match &args.out {
        Some(out) => write_documents(out, &report)?,
        None => Vec::new(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &written, options.environment.as_deref());
    }

    if !report.is_success() {
        return Err(CliError::user(format!(
            "{} channel(s) could not be pulled",
            report.errors.len()
        )));
    }
    Ok(())
}

/// Parse `NAME=VALUE` arguments. The value may itself contain `=`.
pub(crate) fn parse_variables(pairs: &[String]) -> Result<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.to_string()))
            }
            _ => Err(CliError::user(format!(
                "invalid variable '{pair}', expected NAME=VALUE"
            ))),
        })
        .collect()
}

/// Write `<out>/<slug>.json` per channel and `<out>/code-templates/<slug>.json`
/// per library. Returns the written paths.
fn write_documents(out: &Path, report: &PullReport) -> Result<Vec<String>> {
    let out = NormalizedPath::new(out);
    let mut written = Vec::new();

    for channel in &report.channels {
        let path = out.join(&format!("{}.json", channel.slug));
        io::write_text(&path, &channel.document)?;
        written.push(path.as_str().to_string());
    }
    for library in &report.libraries {
        let path = out.join(&format!("code-templates/{}.json", slugify(&library.name)));
        let mut content = serde_json::to_string_pretty(library)?;
        content.push('\n');
        io::write_text(&path, &content)?;
        written.push(path.as_str().to_string());
    }
    Ok(written)
}

fn print_report(report: &PullReport, written: &[String], environment: Option<&str>) {
    println!(
        "{} {} channel(s), {} code template library(ies) [{}]",
        "Pulled".green().bold(),
        report.channels.len(),
        report.libraries.len(),
        environment.unwrap_or("base").cyan()
    );
    for channel in &report.channels {
        println!("  {} {} ({})", "<".green(), channel.name.bold(), channel.slug);
        for file in &channel.overlaid {
            println!("      {} {}", "~".yellow(), file);
        }
        if !channel.unresolved_vars.is_empty() {
            println!(
                "      {} {}",
                "unresolved:".yellow(),
                channel.unresolved_vars.join(", ")
            );
        }
    }
    for path in written {
        println!("  {} {}", "+".green(), path);
    }
    for warning in &report.warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }
    for error in &report.errors {
        println!("{} {}: {}", "!".red(), error.channel.bold(), error.message);
    }
}
