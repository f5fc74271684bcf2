//! Attribute normalization.
//!
//! rrweb serializes element attributes in two encodings: a plain JSON object
//! (`{"id": "main", "name": "submit"}`) and a flattened key/value array
//! (`["id", "main", "name", "submit"]`). Both are normalized here into one
//! ordered map so no other module has to know about the split.

use indexmap::IndexMap;
use serde_json::Value;

/// Render a scalar attribute value as a string.
///
/// rrweb emits strings for almost everything, but booleans (`checked: true`)
/// and numbers (`width: 100`) occur; composite values are dropped.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Normalize either attribute encoding into an ordered name -> value map.
///
/// Unrecognized shapes yield an empty map rather than an error; a node with
/// unreadable attributes is still a node.
#[must_use]
pub fn normalize_attrs(raw: &Value) -> IndexMap<String, String> {
    let mut out = IndexMap::new();
    match raw {
        Value::Object(map) => {
            for (key, value) in map {
                if let Some(v) = scalar_to_string(value) {
                    out.insert(key.clone(), v);
                }
            }
        }
        Value::Array(items) => {
            for pair in items.chunks(2) {
                let [key, value] = pair else { continue };
                if let (Some(k), Some(v)) = (key.as_str(), scalar_to_string(value)) {
                    out.insert(k.to_string(), v);
                }
            }
        }
        _ => {}
    }
    out
}

/// Extract and normalize a raw node's attributes.
///
/// Accepts the `attributes`, `attrs`, and `attr` field spellings seen across
/// rrweb versions, first one present wins.
#[must_use]
pub fn node_attrs(node: &Value) -> IndexMap<String, String> {
    for field in ["attributes", "attrs", "attr"] {
        if let Some(raw) = node.get(field) {
            return normalize_attrs(raw);
        }
    }
    IndexMap::new()
}
