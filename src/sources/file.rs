//! YAML config file source.

use super::{RawValue, Source, SourceKind};
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A decoded config file whose nesting mirrors dotted keys.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    path: Option<PathBuf>,
    tree: Map<String, Value>,
}

impl FileSource {
    /// A source that defines nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap an already decoded tree. Anything but a mapping defines nothing.
    pub fn from_value(tree: Value) -> Self {
        let tree = match tree {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { path: None, tree }
    }

    /// Read and decode `path`.
    ///
    /// A file that does not exist yields an empty source. A file that exists
    /// but cannot be read or decoded is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found, skipping");
                return Ok(Self::empty());
            }
            Err(e) => return Err(Error::read_file(path, e)),
        };

        let document = serde_yaml::from_str::<serde_yaml::Value>(&content)
            .map_err(|e| Error::parse_file(path, e))?;
        let tree = match to_tree(document) {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            // decode again as a mapping to get a precise error
            _ => serde_yaml::from_str::<Map<String, Value>>(&content)
                .map_err(|e| Error::parse_file(path, e))?,
        };
        debug!(path = %path.display(), keys = tree.len(), "loaded config file");

        Ok(Self {
            path: Some(path.to_path_buf()),
            tree,
        })
    }

    /// Path of the file this source was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn node(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let first = parts.next()?;
        let mut current = self.tree.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }
}

/// Convert a YAML document into the node tree sources hand out.
///
/// JSON numbers cannot be non-finite, so `.inf`, `-.inf` and `.nan` are kept
/// as the text `inf`, `-inf` and `NaN`, which the float kinds parse.
fn to_tree(node: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;

    match node {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => number(&n),
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(to_tree).collect()),
        Yaml::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Bool(b) => b.to_string(),
                    Yaml::Number(n) => n.to_string(),
                    other => {
                        debug!(key = ?other, "skipping non-scalar mapping key");
                        continue;
                    }
                };
                map.insert(key, to_tree(value));
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => to_tree(tagged.value),
    }
}

fn number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        return Value::from(i);
    }
    if let Some(u) = n.as_u64() {
        return Value::from(u);
    }
    let f = n.as_f64().unwrap_or(f64::NAN);
    match serde_json::Number::from_f64(f) {
        Some(finite) => Value::Number(finite),
        None if f.is_nan() => Value::String("NaN".to_owned()),
        None if f.is_sign_negative() => Value::String("-inf".to_owned()),
        None => Value::String("inf".to_owned()),
    }
}

impl Source for FileSource {
    fn kind(&self) -> SourceKind {
        SourceKind::File
    }

    /// An explicit YAML `null` counts as absent.
    fn lookup(&self, key: &str) -> Option<RawValue> {
        match self.node(key)? {
            Value::Null => None,
            node => Some(RawValue::Tree(node.clone())),
        }
    }
}
