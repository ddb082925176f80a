//! Scan command implementation
//!
//! Lists credential-shaped fields. Values are never printed.

use std::path::Path;

use colored::Colorize;
use serde_json::json;

use chsync_secrets::detect;

use super::decompose_file;
use crate::error::Result;

pub fn run_scan(document: &Path, fields: &[String], json: bool) -> Result<()> {
    let channel = decompose_file(document)?;
    let found = detect(&channel, fields);

    if json {
        let output = json!({
            "channel": channel.metadata.name,
            "count": found.len(),
            "fields": found.iter()
                .map(|f| json!({
                    "path": f.path,
                    "fieldName": f.field_name,
                    "parameterName": f.parameter_name,
                    "transportType": f.transport_type,
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if found.is_empty() {
        println!(
            "{} No sensitive fields in {}",
            "OK".green().bold(),
            channel.metadata.name.bold()
        );
        return Ok(());
    }

    println!(
        "{} {} sensitive field(s) in {}",
        "!".yellow().bold(),
        found.len(),
        channel.metadata.name.bold()
    );
    for field in &found {
        println!(
            "  {} {} ({})",
            field.path,
            format!("${{{}}}", field.parameter_name).cyan(),
            field.transport_type.dimmed()
        );
    }
    Ok(())
}
