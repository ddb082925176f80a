use std::collections::{HashMap, HashSet};

use chsync_model::{Connector, ConnectorRef, DecomposedChannel, Mapping, Scalar, Value};
use serde::Serialize;
use tracing::debug;

use crate::naming::{is_sensitive_name, to_parameter_identifier, to_upper_snake};

/// A credential-shaped connector property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitiveField {
    pub field_name: String,
    /// Dot path, e.g. `destinations.Archive.connector.password`
    pub path: String,
    pub original_value: String,
    /// Unique within one detection pass
    pub parameter_name: String,
    pub transport_type: String,
}

/// True for `${...}` and `{{...}}` references.
pub fn is_parameter_reference(value: &str) -> bool {
    let value = value.trim();
    (value.starts_with("${") && value.ends_with('}'))
        || (value.starts_with("{{") && value.ends_with("}}"))
}

struct Candidate {
    connector: ConnectorRef,
    /// Property key, plus the child key when nested one level down
    keys: Vec<String>,
    field_name: String,
    path: String,
    value: String,
    transport_type: String,
}

impl Candidate {
    fn context(&self) -> String {
        let mut context = match &self.connector {
            ConnectorRef::Source => "SOURCE".to_string(),
            ConnectorRef::Destination(name) => to_upper_snake(name),
        };
        if self.keys.len() > 1 {
            context.push('_');
            context.push_str(&to_upper_snake(&self.keys[0]));
        }
        context
    }
}

/// The value of a credential-named scalar, as text. Numbers count (a `pin`
/// of `1234` is still a secret); booleans and nulls do not.
fn sensitive_scalar(name: &str, value: &Value, additional: &[String]) -> Option<String> {
    let text = match value {
        Value::Scalar(Scalar::String(s)) if !s.is_empty() && !is_parameter_reference(s) => {
            s.clone()
        }
        Value::Scalar(Scalar::Integer(n)) => n.to_string(),
        Value::Scalar(Scalar::Float(f)) => f.to_string(),
        _ => return None,
    };
    is_sensitive_name(name, additional).then_some(text)
}

fn collect(
    connector_ref: ConnectorRef,
    connector: &Connector,
    additional: &[String],
    out: &mut Vec<Candidate>,
) {
    let base_path = match &connector_ref {
        ConnectorRef::Source => "source.connector".to_string(),
        ConnectorRef::Destination(name) => format!("destinations.{}.connector", name),
    };

    for (key, value) in &connector.properties {
        if let Some(secret) = sensitive_scalar(key, value, additional) {
            out.push(Candidate {
                connector: connector_ref.clone(),
                keys: vec![key.clone()],
                field_name: key.clone(),
                path: format!("{}.{}", base_path, key),
                value: secret,
                transport_type: connector.transport_type.clone(),
            });
        } else if let Value::Mapping(nested) = value {
            for (child, child_value) in nested {
                if let Some(secret) = sensitive_scalar(child, child_value, additional) {
                    out.push(Candidate {
                        connector: connector_ref.clone(),
                        keys: vec![key.clone(), child.clone()],
                        field_name: child.clone(),
                        path: format!("{}.{}.{}", base_path, key, child),
                        value: secret,
                        transport_type: connector.transport_type.clone(),
                    });
                }
            }
        }
    }
}

fn field_base(field_name: &str) -> String {
    let base = to_upper_snake(field_name);
    if base.is_empty() { to_parameter_identifier(&base) } else { base }
}

/// Assign parameter names: the field name alone when unique, the connector
/// context prefixed when several fields share a name, then a numeric suffix
/// for anything still colliding. Every name is a valid placeholder identifier.
fn assign_names(candidates: &[Candidate], prefix: &str) -> Vec<String> {
    let mut base_counts: HashMap<String, usize> = HashMap::new();
    for candidate in candidates {
        *base_counts.entry(field_base(&candidate.field_name)).or_default() += 1;
    }

    let mut used = HashSet::new();
    candidates
        .iter()
        .map(|candidate| {
            let base = field_base(&candidate.field_name);
            let mut name = if base_counts.get(&base).copied().unwrap_or(0) > 1 {
                format!("{}_{}", candidate.context(), base)
            } else {
                base
            };
            if !prefix.is_empty() {
                name = format!("{}_{}", prefix, name);
            }
            let name = to_parameter_identifier(&name);
            let mut unique = name.clone();
            let mut n = 2;
            while !used.insert(unique.clone()) {
                unique = format!("{}_{}", name, n);
                n += 1;
            }
            unique
        })
        .collect()
}

fn detect_with_prefix(
    decomposed: &DecomposedChannel,
    additional: &[String],
    prefix: &str,
) -> (Vec<Candidate>, Vec<SensitiveField>) {
    let mut candidates = Vec::new();
    collect(ConnectorRef::Source, &decomposed.source, additional, &mut candidates);
    for destination in &decomposed.destinations {
        collect(
            ConnectorRef::Destination(destination.name.clone()),
            &destination.connector,
            additional,
            &mut candidates,
        );
    }

    let names = assign_names(&candidates, prefix);
    let fields = candidates
        .iter()
        .zip(names)
        .map(|(candidate, parameter_name)| {
            debug!(path = %candidate.path, parameter = %parameter_name, "Sensitive field detected");
            SensitiveField {
                field_name: candidate.field_name.clone(),
                path: candidate.path.clone(),
                original_value: candidate.value.clone(),
                parameter_name,
                transport_type: candidate.transport_type.clone(),
            }
        })
        .collect();
    (candidates, fields)
}

/// Find credential-shaped properties on the source and every destination,
/// including one level of nested property mappings.
pub fn detect(decomposed: &DecomposedChannel, additional: &[String]) -> Vec<SensitiveField> {
    detect_with_prefix(decomposed, additional, "").1
}

/// Replace every detected value with a `${PARAMETER}` reference.
///
/// Parameter names are prefixed with the channel name so they stay unique
/// across channels sharing one environment file. The returned fields keep the
/// original values for reporting.
pub fn mask_decomposed(
    decomposed: &mut DecomposedChannel,
    channel_name: &str,
    additional: &[String],
) -> Vec<SensitiveField> {
    let prefix = to_upper_snake(channel_name);
    let (candidates, fields) = detect_with_prefix(decomposed, additional, &prefix);

    for (candidate, field) in candidates.iter().zip(&fields) {
        let Some(connector) = decomposed.connector_mut(&candidate.connector) else {
            continue;
        };
        let reference = Value::from(format!("${{{}}}", field.parameter_name));
        if let Some(slot) = locate(&mut connector.properties, &candidate.keys) {
            *slot = reference;
        }
    }
    fields
}

fn locate<'a>(properties: &'a mut Mapping, keys: &[String]) -> Option<&'a mut Value> {
    let (first, rest) = keys.split_first()?;
    let value = properties.get_mut(first)?;
    match rest {
        [] => Some(value),
        [child] => value.as_mapping_mut()?.get_mut(child),
        _ => None,
    }
}
