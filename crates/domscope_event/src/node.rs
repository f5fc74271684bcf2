//! Normalized DOM node records.
//!
//! A `DomNode` is the internal, already-normalized form of one serialized
//! node from a recording: id, tag, text-node marker, attribute map, text
//! payload, and the ids of its registered children. Raw JSON stops here.

use crate::attrs::node_attrs;
use domscope_core::NodeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// rrweb serialized-node type tag for text nodes
pub const TEXT_NODE_TYPE: i64 = 3;

/// One DOM node as captured at some point in the recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomNode {
    /// The recording-lifetime node id
    pub id: NodeId,
    /// Element/tag name as recorded (text nodes have none)
    pub tag: Option<String>,
    /// rrweb serialized-node type tag, when present
    pub node_type: Option<i64>,
    /// Normalized attribute map
    pub attrs: IndexMap<String, String>,
    /// Text payload (`textContent`, `text`, or a coerced `value`)
    pub text: Option<String>,
    /// Ids of children registered under this node, in document order.
    /// Incrementally-added nodes are leaf references and have none.
    pub children: Vec<NodeId>,
}

impl DomNode {
    /// Parse a raw serialized node.
    ///
    /// Returns `None` when the value has no usable `id` - such items are
    /// skipped by the registry, never treated as errors.
    #[must_use]
    pub fn from_value(raw: &Value) -> Option<Self> {
        let id = raw.get("id").and_then(NodeId::from_json)?;
        let tag = raw
            .get("tagName")
            .or_else(|| raw.get("nodeName"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let node_type = raw.get("type").and_then(Value::as_i64);
        let text = extract_text(raw);
        Some(Self {
            id,
            tag,
            node_type,
            attrs: node_attrs(raw),
            text,
            children: Vec::new(),
        })
    }

    /// Whether this is a text node
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.node_type == Some(TEXT_NODE_TYPE)
    }

    /// Lower-cased tag for selector-style labels; `#text` for text nodes,
    /// the generic `node` placeholder when the tag is unknown
    #[must_use]
    pub fn label_tag(&self) -> String {
        match &self.tag {
            Some(tag) => tag.to_lowercase(),
            None if self.is_text() => "#text".to_string(),
            None => "node".to_string(),
        }
    }

    /// Tag as recorded, with the same fallbacks but without lower-casing
    #[must_use]
    pub fn display_tag(&self) -> &str {
        match &self.tag {
            Some(tag) => tag,
            None if self.is_text() => "#text",
            None => "node",
        }
    }

    /// The `id` html attribute, when present and non-empty
    #[must_use]
    pub fn html_id(&self) -> Option<&str> {
        self.attrs.get("id").map(String::as_str).filter(|s| !s.is_empty())
    }

    /// The `name` html attribute, when present and non-empty
    #[must_use]
    pub fn html_name(&self) -> Option<&str> {
        self.attrs.get("name").map(String::as_str).filter(|s| !s.is_empty())
    }
}

/// Raw child list of a serialized node, if any.
///
/// Lives here rather than on `DomNode` because children are registered by
/// walking the raw tree; the normalized record only keeps their ids.
#[must_use]
pub fn raw_children(raw: &Value) -> &[Value] {
    raw.get("childNodes")
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

fn extract_text(raw: &Value) -> Option<String> {
    for field in ["textContent", "text"] {
        if let Some(s) = raw.get(field).and_then(Value::as_str) {
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    // Input values may be numbers; coerce scalars the way the recordings do.
    match raw.get("value") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
