//! Vars command implementation

use std::collections::BTreeMap;
use std::path::Path;

use colored::Colorize;
use serde_json::json;

use chsync_secrets::is_sensitive_name;
use chsync_vars::{ResolverOptions, VariableEntry, VariableResolver};

use crate::context::{load_config, resolve_root};
use crate::error::Result;

const MASK: &str = "********";

/// Print where each variable's value comes from.
///
/// Values of credential-shaped names are masked.
pub async fn run_vars(
    root: &Path,
    environment: Option<&str>,
    explain: Option<&str>,
    json: bool,
) -> Result<()> {
    let root = resolve_root(root);
    let config = load_config(&root)?;
    let environment = environment.or(config.variables.environment.as_deref());

    let mut resolver = VariableResolver::new(ResolverOptions::default());
    resolver.load_environment(&root.to_native(), environment).await?;

    let entries = match explain {
        Some(text) => resolver.explain(text),
        None => resolver.variable_map(),
    };
    let rows = displayed(&entries, &config.secrets.extra_fields);

    if json {
        let output = json!({
            "environment": environment,
            "variables": rows.iter()
                .map(|(name, value, source)| (name.clone(), json!({ "value": value, "source": source })))
                .collect::<serde_json::Map<_, _>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} [{}]",
        "Variables".blue().bold(),
        environment.unwrap_or("base").cyan()
    );
    if rows.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (name, value, source) in &rows {
        println!("  {} = {} {}", name.bold(), value, format!("({source})").dimmed());
    }
    Ok(())
}

/// (name, display value, source) rows with sensitive values masked.
fn displayed(
    entries: &BTreeMap<String, VariableEntry>,
    extra_fields: &[String],
) -> Vec<(String, String, String)> {
    entries
        .iter()
        .map(|(name, entry)| {
            let value = if is_sensitive_name(name, extra_fields) {
                MASK.to_string()
            } else {
                entry.value.clone()
            };
            (name.clone(), value, entry.source.to_string())
        })
        .collect()
}
