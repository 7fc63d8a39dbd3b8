//! Hierarchical document reader.
//!
//! Every supported format is parsed into the same `serde_json::Value` tree.
//! Keys are case-insensitive and lookups accept dotted paths such as
//! `alerts.time`.

use kdl::{KdlDocument, KdlNode, KdlValue};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::{ConfigError, ConfigResult};

/// Declared document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Yaml,
    Json,
    Toml,
    Kdl,
}

impl Format {
    /// Look up a format by file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Format::Yaml),
            "json" => Some(Format::Json),
            "toml" => Some(Format::Toml),
            "kdl" => Some(Format::Kdl),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
            Format::Toml => "toml",
            Format::Kdl => "kdl",
        }
    }

    fn parse(&self, text: &str) -> Result<Value, String> {
        match self {
            Format::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(text).map_err(|e| e.to_string()),
            Format::Kdl => text
                .parse::<KdlDocument>()
                .map(|doc| kdl_document(&doc))
                .map_err(|e| e.to_string()),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed document, or a view over a sub-map of one.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSource {
    format: Format,
    origin: String,
    root: Map<String, Value>,
}

impl ConfigSource {
    /// An empty source.
    pub fn new(format: Format, origin: impl Into<String>) -> Self {
        Self {
            format,
            origin: origin.into(),
            root: Map::new(),
        }
    }

    /// Parse a document held in memory.
    pub fn parse(text: &str, format: Format, origin: impl Into<String>) -> ConfigResult<Self> {
        let origin = origin.into();
        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            format.parse(text).map_err(|message| ConfigError::Parse {
                origin: origin.clone(),
                format,
                message,
            })?
        };

        let root = match normalize(value) {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ConfigError::Parse {
                    origin,
                    format,
                    message: format!("document root must be a map, found {}", type_name(&other)),
                });
            }
        };

        Ok(Self {
            format,
            origin,
            root,
        })
    }

    /// Load a file, inferring the format from its extension.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let format = Format::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_file_as(path, format)
    }

    /// Load a file under an explicit format.
    pub fn from_file_as(path: impl AsRef<Path>, format: Format) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::parse(&text, format, path.display().to_string())
    }

    /// Build a source over an already-parsed map, as for an inline event
    /// nested in another document.
    pub fn from_map(format: Format, origin: impl Into<String>, map: Map<String, Value>) -> Self {
        let root = match normalize(Value::Object(map)) {
            Value::Object(root) => root,
            _ => Map::new(),
        };
        Self {
            format,
            origin: origin.into(),
            root,
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Where this source came from, for diagnostics.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split('.').map(str::to_lowercase);
        let first = segments.next()?;
        segments.try_fold(self.root.get(&first)?, |value, segment| {
            value.as_object()?.get(&segment)
        })
    }

    pub fn is_set(&self, key: &str) -> bool {
        !matches!(self.get(key), None | Some(Value::Null))
    }

    /// A scalar value as text. Maps, sequences and nulls yield `None`.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_to_string)
    }

    /// A sequence of scalars as text. A lone scalar is a one-element
    /// sequence; anything else is empty.
    pub fn get_string_vec(&self, key: &str) -> Vec<String> {
        self.get(key).map(string_vec).unwrap_or_default()
    }

    /// A map whose values are read as [`get_string_vec`](Self::get_string_vec) would.
    pub fn get_string_map_vec(&self, key: &str) -> BTreeMap<String, Vec<String>> {
        match self.get(key) {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| (k.clone(), string_vec(v)))
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    /// A nested, non-empty map.
    pub fn get_map(&self, key: &str) -> Option<&Map<String, Value>> {
        self.get(key)
            .and_then(Value::as_object)
            .filter(|map| !map.is_empty())
    }

    /// Assign `value` at a dotted path, creating intermediate maps and
    /// replacing any non-map value in the way.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let segments: Vec<String> = key.split('.').map(str::to_lowercase).collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut map = &mut self.root;
        for segment in parents {
            let slot = map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            map = match slot {
                Value::Object(inner) => inner,
                _ => return,
            };
        }
        map.insert(last.clone(), normalize(value.into()));
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn string_vec(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
        other => scalar_to_string(other).into_iter().collect(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a map",
    }
}

/// Lowercase every map key, recursively.
fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), normalize(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        other => other,
    }
}

// KDL has no native maps or sequences, so documents are read as:
// - a node with children or `key=value` properties is a map
// - a block whose nodes are all named `-` is a sequence
// - otherwise a node is null, its single argument, or a sequence of arguments
// - repeated sibling names accumulate into a sequence

fn kdl_document(doc: &KdlDocument) -> Value {
    let nodes = doc.nodes();
    if !nodes.is_empty() && nodes.iter().all(|n| n.name().value() == "-") {
        return Value::Array(nodes.iter().map(kdl_node).collect());
    }

    let mut map = Map::new();
    for node in nodes {
        let key = node.name().value().to_string();
        let value = kdl_node(node);
        match map.get_mut(&key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key, value);
            }
        }
    }
    Value::Object(map)
}

fn kdl_node(node: &KdlNode) -> Value {
    let mut args: Vec<Value> = node
        .entries()
        .iter()
        .filter(|e| e.name().is_none())
        .map(|e| kdl_value(e.value()))
        .collect();
    let props: Vec<(String, Value)> = node
        .entries()
        .iter()
        .filter_map(|e| e.name().map(|n| (n.value().to_string(), kdl_value(e.value()))))
        .collect();

    if node.children().is_none() && props.is_empty() {
        return match args.len() {
            0 => Value::Null,
            1 => args.remove(0),
            _ => Value::Array(args),
        };
    }

    let mut value = node
        .children()
        .map(kdl_document)
        .unwrap_or_else(|| Value::Object(Map::new()));
    if let Value::Object(map) = &mut value {
        map.extend(props);
    }
    value
}

fn kdl_value(value: &KdlValue) -> Value {
    match value {
        KdlValue::String(s) => Value::String(s.clone()),
        KdlValue::Integer(i) => i64::try_from(*i)
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(i.to_string())),
        KdlValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        KdlValue::Bool(b) => Value::Bool(*b),
        KdlValue::Null => Value::Null,
    }
}
