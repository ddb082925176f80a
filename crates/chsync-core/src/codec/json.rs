//! Reference codec for JSON channel documents

use chsync_model::{
    ChannelMetadata, Connector, DecomposedChannel, Destination, Mapping, ScriptSlot, Step,
    StepKind, StepList, Value,
};
use serde_json::{Map, Value as Json};
use tracing::debug;

use super::{AssembleOptions, ChannelCodec, DecomposeOptions};
use crate::{Error, Result};

type Object = Map<String, Json>;

const SCRIPT_KEYS: [(ScriptSlot, &str); 4] = [
    (ScriptSlot::Deploy, "deployScript"),
    (ScriptSlot::Undeploy, "undeployScript"),
    (ScriptSlot::Preprocess, "preprocessingScript"),
    (ScriptSlot::Postprocess, "postprocessingScript"),
];

/// `(container key, list key)` of each step list inside a connector object.
fn step_keys(kind: StepKind) -> (&'static str, &'static str) {
    match kind {
        StepKind::Filter => ("filter", "rules"),
        StepKind::Transformer => ("transformer", "steps"),
        StepKind::ResponseTransformer => ("responseTransformer", "steps"),
    }
}

/// Channels as JSON objects:
///
/// ```json
/// {
///   "id": "…", "name": "…", "description": "…", "enabled": true, "revision": 3,
///   "deployScript": "…", "undeployScript": "…",
///   "preprocessingScript": "…", "postprocessingScript": "…",
///   "sourceConnector": { "transportName": "…", "properties": {},
///                        "filter": { "rules": [] }, "transformer": { "steps": [] } },
///   "destinationConnectors": [ { "name": "…", "transportName": "…", … } ]
/// }
/// ```
///
/// Steps are `{ "sequenceNumber", "name", "script" }`. Keys the model does
/// not track survive reassembly through the snapshot, in their original order.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonChannelCodec;

impl JsonChannelCodec {
    pub fn new() -> Self {
        Self
    }
}

fn parse_object(document: &str) -> Result<Object> {
    match serde_json::from_str::<Json>(document) {
        Ok(Json::Object(map)) => Ok(map),
        Ok(_) => Err(Error::codec("channel document must be a JSON object")),
        Err(e) => Err(Error::codec(format!("invalid channel document: {}", e))),
    }
}

fn str_field<'a>(object: &'a Object, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Json::as_str)
}

fn default_destination_name(index: usize) -> String {
    format!("Destination {}", index + 1)
}

fn destination_name(object: &Object, index: usize) -> String {
    str_field(object, "name")
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_destination_name(index))
}

fn step_sequence(object: &Object, index: usize) -> u32 {
    object
        .get("sequenceNumber")
        .and_then(Json::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or_else(|| u32::try_from(index).unwrap_or(u32::MAX))
}

fn decode_steps(connector: &Object, kind: StepKind, context: &str) -> Result<Option<StepList>> {
    let (container, key) = step_keys(kind);
    let items = match connector.get(container) {
        None | Some(Json::Null) => return Ok(None),
        Some(Json::Object(inner)) => match inner.get(key) {
            None | Some(Json::Null) => return Ok(Some(StepList::default())),
            Some(Json::Array(items)) => items,
            Some(_) => {
                return Err(Error::codec(format!(
                    "{}.{}.{} must be an array",
                    context, container, key
                )));
            }
        },
        Some(_) => {
            return Err(Error::codec(format!(
                "{}.{} must be an object",
                context, container
            )));
        }
    };

    let mut steps = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Json::Object(step) = item else {
            return Err(Error::codec(format!(
                "{}.{}.{}[{}] must be an object",
                context, container, key, index
            )));
        };
        steps.push(Step {
            sequence: step_sequence(step, index),
            name: str_field(step, "name").unwrap_or_default().to_string(),
            script: str_field(step, "script").unwrap_or_default().to_string(),
        });
    }
    Ok(Some(StepList { steps }))
}

fn decode_connector(object: &Object, context: &str) -> Result<Connector> {
    let properties: Mapping = match object.get("properties") {
        None | Some(Json::Null) => Mapping::new(),
        Some(Json::Object(props)) => props
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.clone())))
            .collect(),
        Some(_) => {
            return Err(Error::codec(format!(
                "{}.properties must be an object",
                context
            )));
        }
    };

    Ok(Connector {
        transport_type: str_field(object, "transportName")
            .unwrap_or_default()
            .to_string(),
        properties,
        filter: decode_steps(object, StepKind::Filter, context)?,
        transformer: decode_steps(object, StepKind::Transformer, context)?,
        response_transformer: decode_steps(object, StepKind::ResponseTransformer, context)?,
    })
}

/// Get `map[key]` as an object, replacing anything else with `{}`.
fn ensure_object<'a>(map: &'a mut Object, key: &str) -> &'a mut Object {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Json::Object(Map::new()));
    if !slot.is_object() {
        *slot = Json::Object(Map::new());
    }
    match slot {
        Json::Object(object) => object,
        _ => unreachable!("slot was replaced with an object"),
    }
}

/// Take the objects of `map[key]` out of the array, paired with their index.
fn take_objects(map: &mut Object, key: &str) -> Vec<(usize, Object)> {
    match map.get_mut(key) {
        Some(Json::Array(items)) => std::mem::take(items)
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match item {
                Json::Object(object) => Some((index, object)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn remove_key(map: &mut Object, key: &str) {
    map.retain(|k, _| k != key);
}

fn write_properties(connector: &mut Object, properties: &Mapping) {
    if properties.is_empty() && !connector.contains_key("properties") {
        return;
    }
    let target = ensure_object(connector, "properties");
    target.retain(|k, _| properties.contains_key(k));
    for (key, value) in properties {
        let unchanged = target
            .get(key)
            .is_some_and(|existing| Value::from(existing.clone()) == *value);
        if !unchanged {
            target.insert(key.clone(), Json::from(value));
        }
    }
}

fn write_steps(connector: &mut Object, kind: StepKind, list: Option<&StepList>) {
    let (container, key) = step_keys(kind);
    let Some(list) = list else {
        if connector.get(container).is_some_and(|v| !v.is_null()) {
            remove_key(connector, container);
        }
        return;
    };

    let inner = ensure_object(connector, container);
    let mut existing = take_objects(inner, key);
    let mut steps = Vec::with_capacity(list.steps.len());
    for step in &list.steps {
        let mut object = existing
            .iter()
            .position(|(index, object)| step_sequence(object, *index) == step.sequence)
            .map(|pos| existing.swap_remove(pos).1)
            .unwrap_or_default();
        object.insert("sequenceNumber".into(), Json::from(step.sequence));
        object.insert("name".into(), Json::from(step.name.clone()));
        object.insert("script".into(), Json::from(step.script.clone()));
        steps.push(Json::Object(object));
    }
    inner.insert(key.to_string(), Json::Array(steps));
}

fn write_connector(object: &mut Object, connector: &Connector, name: Option<&str>) {
    if let Some(name) = name {
        object.insert("name".into(), Json::from(name));
    }
    if !connector.transport_type.is_empty() || object.contains_key("transportName") {
        object.insert(
            "transportName".into(),
            Json::from(connector.transport_type.clone()),
        );
    }
    write_properties(object, &connector.properties);
    for kind in StepKind::ALL {
        write_steps(object, kind, connector.step_list(kind));
    }
}

fn write_metadata(doc: &mut Object, metadata: &ChannelMetadata, fresh: bool) {
    doc.insert("id".into(), Json::from(metadata.id.clone()));
    doc.insert("name".into(), Json::from(metadata.name.clone()));
    if !metadata.description.is_empty() || doc.contains_key("description") {
        doc.insert(
            "description".into(),
            Json::from(metadata.description.clone()),
        );
    }
    if fresh || !metadata.enabled || doc.contains_key("enabled") {
        doc.insert("enabled".into(), Json::from(metadata.enabled));
    }
    match metadata.revision {
        Some(revision) => {
            doc.insert("revision".into(), Json::from(revision));
        }
        None => remove_key(doc, "revision"),
    }
}

fn write_channel(doc: &mut Object, channel: &DecomposedChannel, fresh: bool) {
    write_metadata(doc, &channel.metadata, fresh);

    for (slot, key) in SCRIPT_KEYS {
        match channel.scripts.get(&slot) {
            Some(body) => {
                doc.insert(key.into(), Json::from(body.clone()));
            }
            None if doc.contains_key(key) => {
                doc.insert(key.into(), Json::from(""));
            }
            None => {}
        }
    }

    write_connector(ensure_object(doc, "sourceConnector"), &channel.source, None);

    if channel.destinations.is_empty() && !doc.contains_key("destinationConnectors") {
        return;
    }
    let mut existing = take_objects(doc, "destinationConnectors");
    let mut destinations = Vec::with_capacity(channel.destinations.len());
    for destination in &channel.destinations {
        let mut object = existing
            .iter()
            .position(|(index, object)| destination_name(object, *index) == destination.name)
            .map(|pos| existing.swap_remove(pos).1)
            .unwrap_or_default();
        write_connector(&mut object, &destination.connector, Some(&destination.name));
        destinations.push(Json::Object(object));
    }
    doc.insert("destinationConnectors".into(), Json::Array(destinations));
}

impl ChannelCodec for JsonChannelCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn decompose(&self, document: &str, options: &DecomposeOptions) -> Result<DecomposedChannel> {
        let doc = parse_object(document)?;

        let name = str_field(&doc, "name")
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| Error::codec("channel document has no name"))?;
        let metadata = ChannelMetadata {
            id: str_field(&doc, "id").unwrap_or_default().to_string(),
            name: name.to_string(),
            description: str_field(&doc, "description")
                .unwrap_or_default()
                .to_string(),
            enabled: doc.get("enabled").and_then(Json::as_bool).unwrap_or(true),
            revision: doc.get("revision").and_then(Json::as_i64),
        };

        let mut scripts = chsync_model::ChannelScripts::new();
        for (slot, key) in SCRIPT_KEYS {
            if let Some(body) = str_field(&doc, key)
                && (!body.is_empty() || options.keep_empty_scripts)
            {
                scripts.insert(slot, body.to_string());
            }
        }

        let source = match doc.get("sourceConnector") {
            None | Some(Json::Null) => Connector::default(),
            Some(Json::Object(object)) => decode_connector(object, "sourceConnector")?,
            Some(_) => return Err(Error::codec("sourceConnector must be an object")),
        };

        let destinations = match doc.get("destinationConnectors") {
            None | Some(Json::Null) => Vec::new(),
            Some(Json::Array(items)) => {
                let mut destinations = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let context = format!("destinationConnectors[{}]", index);
                    let Json::Object(object) = item else {
                        return Err(Error::codec(format!("{} must be an object", context)));
                    };
                    destinations.push(Destination {
                        name: destination_name(object, index),
                        connector: decode_connector(object, &context)?,
                    });
                }
                destinations
            }
            Some(_) => return Err(Error::codec("destinationConnectors must be an array")),
        };

        debug!(channel = %metadata.name, destinations = destinations.len(), "Decomposed channel");
        Ok(DecomposedChannel {
            metadata,
            scripts,
            source,
            destinations,
        })
    }

    fn assemble(&self, decomposed: &DecomposedChannel, options: &AssembleOptions) -> Result<String> {
        let Some(snapshot) = &options.snapshot else {
            let mut doc = Map::new();
            write_channel(&mut doc, decomposed, true);
            let mut out = serde_json::to_string_pretty(&Json::Object(doc))?;
            out.push('\n');
            return Ok(out);
        };

        let original = self.decompose(snapshot, &DecomposeOptions::default())?;
        if original == *decomposed {
            debug!(channel = %decomposed.metadata.name, "Decomposition unchanged, reusing snapshot");
            return Ok(snapshot.clone());
        }

        let mut doc = parse_object(snapshot)?;
        write_channel(&mut doc, decomposed, false);
        let mut out = serde_json::to_string_pretty(&Json::Object(doc))?;
        if snapshot.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }
}
