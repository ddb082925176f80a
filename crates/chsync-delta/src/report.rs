use std::fmt::Write;

use crate::detector::DeltaResult;

/// Render a [`DeltaResult`] as plain terminal text.
pub fn format_for_cli(result: &DeltaResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Delta: {}", result.summary);

    if !result.changed_channels.is_empty() || !result.changed_code_templates.is_empty() {
        out.push_str("Changed:\n");
        for channel in &result.changed_channels {
            if channel.sections.is_empty() {
                let _ = writeln!(out, "  ~ {}", channel.channel_name);
            } else {
                let _ = writeln!(
                    out,
                    "  ~ {} ({})",
                    channel.channel_name,
                    channel.sections.join(", ")
                );
            }
        }
        for template in &result.changed_code_templates {
            match &template.template_name {
                Some(name) => {
                    let _ = writeln!(out, "  ~ code template {}/{}", template.library_name, name);
                }
                None => {
                    let _ = writeln!(out, "  ~ code template library {}", template.library_name);
                }
            }
        }
    }

    if !result.cascaded_channels.is_empty() {
        out.push_str("Cascaded:\n");
        for cascaded in &result.cascaded_channels {
            let _ = writeln!(out, "  -> {} ({})", cascaded.channel_name, cascaded.reason);
        }
    }

    if !result.changed_config.is_empty() {
        out.push_str("Config:\n");
        for config in &result.changed_config {
            let _ = writeln!(out, "  ~ {}", config.file);
        }
    }

    out
}
