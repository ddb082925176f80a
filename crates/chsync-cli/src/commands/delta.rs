//! Delta command implementation

use std::path::Path;

use colored::Colorize;

use chsync_delta::{DeltaResult, detect, format_for_cli};

use crate::context::{open_engine, resolve_root};
use crate::error::Result;

/// Map changed files to affected channels.
///
/// Explicit `paths` are used as given; otherwise the changed-file list comes
/// from version control between `from` and `to` (or the working tree).
pub fn run_delta(
    root: &Path,
    paths: &[String],
    from: &str,
    to: Option<&str>,
    include_cascades: bool,
    json: bool,
) -> Result<()> {
    let engine = open_engine(resolve_root(root))?;

    let result = if paths.is_empty() {
        engine.delta(from, to, include_cascades)?
    } else {
        let mut options = engine.delta_context()?;
        options.include_cascades = include_cascades;
        detect(paths, &options)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn print_result(result: &DeltaResult) {
    if result.is_empty() {
        println!("{} No channels affected", "OK".green().bold());
        return;
    }
    print!("{}", format_for_cli(result));
}
