//! Environment variable file loading

use std::collections::HashMap;
use std::path::Path;

use chsync_model::{Scalar, Value};

use crate::{Error, Result};

const EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Load `<dir>/<stem>.<ext>` for the first extension that exists.
///
/// Returns `None` when no candidate file exists.
pub(crate) async fn load_variable_file(dir: &Path, stem: &str) -> Result<Option<HashMap<String, String>>> {
    for ext in EXTENSIONS {
        let path = dir.join(format!("{}.{}", stem, ext));
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(source) => return Err(Error::Io { path, source }),
        };

        let parsed: std::result::Result<Option<Value>, String> = if ext == "json" {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        };
        let value = parsed.map_err(|message| Error::Parse {
            path: path.clone(),
            message,
        })?;

        return Ok(Some(flatten_variables(value, &path)?));
    }
    Ok(None)
}

fn flatten_variables(value: Option<Value>, path: &Path) -> Result<HashMap<String, String>> {
    let mapping = match value {
        None | Some(Value::Scalar(Scalar::Null)) => return Ok(HashMap::new()),
        Some(Value::Mapping(mapping)) => mapping,
        Some(_) => {
            return Err(Error::Parse {
                path: path.to_path_buf(),
                message: "expected a mapping of variable names to values".to_string(),
            });
        }
    };

    let mut vars = HashMap::with_capacity(mapping.len());
    for (name, value) in mapping {
        let text = match value {
            Value::Scalar(Scalar::String(s)) => s,
            Value::Scalar(Scalar::Integer(i)) => i.to_string(),
            Value::Scalar(Scalar::Float(f)) => f.to_string(),
            Value::Scalar(Scalar::Bool(b)) => b.to_string(),
            Value::Scalar(Scalar::Null) => String::new(),
            Value::Sequence(_) | Value::Mapping(_) => {
                tracing::warn!(variable = %name, path = %path.display(), "Ignoring non-scalar variable");
                continue;
            }
        };
        vars.insert(name, text);
    }
    Ok(vars)
}
