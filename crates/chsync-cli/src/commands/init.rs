//! Init command implementation

use std::path::Path;

use colored::Colorize;

use chsync_core::RepositoryMetadata;
use chsync_fs::NormalizedPath;

use crate::context::open_engine;
use crate::error::Result;

/// Prepare `path` for synchronization.
///
/// Re-running keeps existing metadata, replacing only the values given.
pub fn run_init(
    path: &Path,
    engine: Option<String>,
    engine_version: Option<String>,
    server_url: Option<String>,
) -> Result<()> {
    std::fs::create_dir_all(path)?;
    let root = NormalizedPath::new(dunce::canonicalize(path)?);

    let mut metadata = if RepositoryMetadata::path(&root).is_file() {
        RepositoryMetadata::load(&root)?
    } else {
        RepositoryMetadata::default()
    };
    if let Some(engine) = engine {
        metadata.engine = engine;
    }
    if engine_version.is_some() {
        metadata.engine_version = engine_version;
    }
    if server_url.is_some() {
        metadata.server_url = server_url;
    }

    let engine = open_engine(root.clone())?;
    let written = engine.init(&metadata)?;

    println!(
        "{} channel repository at {} ({})",
        "Initialized".green().bold(),
        root.as_str().yellow(),
        metadata.engine.cyan()
    );
    for file in &written {
        println!("  {} {}", "+".green(), file);
    }
    if written.is_empty() {
        println!("  {}", "Already up to date".dimmed());
    }
    Ok(())
}
