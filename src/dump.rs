//! Human- and machine-readable renderings of a schema.

use crate::loader::Options;
use crate::param::{AnyParam, MASK};
use crate::schema::{Schema, walk};
use crate::sources::env_var_name;
use serde_json::{Map, Value};

/// Shown for a non-secret parameter with neither a value nor a default.
pub const NOT_SET: &str = "<not set>";

fn shown(param: &dyn AnyParam) -> String {
    if param.is_secret() {
        MASK.to_owned()
    } else if !param.is_set() && !param.has_default() {
        NOT_SET.to_owned()
    } else {
        param.render()
    }
}

pub(crate) fn render(params: &[&mut dyn AnyParam]) -> String {
    params
        .iter()
        .map(|p| format!("{} = {}", p.key(), shown(&**p)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn render_description(params: &[&mut dyn AnyParam], env_prefix: &str) -> String {
    params
        .iter()
        .map(|p| {
            let mut line = format!(
                "{} <{}> env={}",
                p.key(),
                p.kind_name(),
                env_var_name(env_prefix, p.key())
            );
            if let Some(default) = p.render_default() {
                let default = if p.is_secret() { MASK.to_owned() } else { default };
                line.push_str(&format!(" default={default}"));
            }
            if p.is_required() {
                line.push_str(" required");
            }
            if p.is_secret() {
                line.push_str(" secret");
            }
            if !p.description().is_empty() {
                line.push_str(&format!(" - {}", p.description()));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Merge `overlay` into `base`; objects merge key by key, anything else replaces.
fn merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// A single leaf nested under the segments of a dotted key.
fn nest(key: &str, leaf: Value) -> Value {
    key.rsplit('.').fold(leaf, |inner, segment| {
        let mut map = Map::new();
        map.insert(segment.to_owned(), inner);
        Value::Object(map)
    })
}

pub(crate) fn render_tree(params: &[&mut dyn AnyParam]) -> Value {
    params
        .iter()
        .filter(|p| p.is_secret() || p.is_set() || p.has_default())
        .map(|p| {
            let leaf = if p.is_secret() {
                Value::String(MASK.to_owned())
            } else {
                p.to_value()
            };
            nest(p.key(), leaf)
        })
        .fold(Value::Object(Map::new()), merge)
}

/// One `key = value` line per parameter, in walk order.
///
/// Secrets always show as `****`. A parameter with neither a value nor a
/// default shows as `<not set>`.
pub fn dump<S: Schema + ?Sized>(schema: &mut S) -> String {
    render(&walk(schema))
}

/// One line per parameter listing its kind, environment variable, default,
/// flags and description.
pub fn describe<S: Schema + ?Sized>(schema: &mut S, options: &Options) -> String {
    render_description(&walk(schema), &options.env_prefix)
}

/// Current values as a nested tree shaped like the config file.
///
/// Secrets are masked and parameters with neither a value nor a default are
/// left out. Serialize with `serde_yaml::to_string` to get a config file.
pub fn export<S: Schema + ?Sized>(schema: &mut S) -> Value {
    render_tree(&walk(schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nest() {
        assert_eq!(nest("a.b.c", json!(1)), json!({"a": {"b": {"c": 1}}}));
        assert_eq!(nest("port", json!(80)), json!({"port": 80}));
    }

    #[test]
    fn test_merge_keeps_siblings() {
        let merged = merge(json!({"db": {"host": "h"}}), json!({"db": {"port": 1}}));
        assert_eq!(merged, json!({"db": {"host": "h", "port": 1}}));
    }

    #[test]
    fn test_merge_overlay_replaces_scalar() {
        assert_eq!(merge(json!({"a": 1}), json!({"a": {"b": 2}})), json!({"a": {"b": 2}}));
        assert_eq!(merge(json!([1]), json!([2])), json!([2]));
    }
}
