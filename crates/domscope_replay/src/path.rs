//! Ancestry paths and node context.
//!
//! Pure reads against an already-built registry: the root-first ancestor
//! chain, the selector-like dom path, one-line node summaries, and the
//! target's direct children. Parent links come from recorded data, so the
//! chain walk carries a visited set; a cycle terminates the walk instead of
//! hanging it.

use crate::registry::NodeRegistry;
use domscope_core::NodeId;
use domscope_event::DomNode;
use std::collections::HashSet;

/// Longest text excerpt shown in a summary line
const TEXT_EXCERPT_CHARS: usize = 80;

/// Ancestor chain of `id`, root-first, `id` itself included last.
///
/// The walk stops at the first id without a registry record, at the first id
/// without a parent link, or when an id repeats within the walk.
#[must_use]
pub fn ancestor_chain(registry: &NodeRegistry, id: NodeId) -> Vec<NodeId> {
    let mut chain = Vec::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut cur = id;
    loop {
        if !registry.contains(cur) || !visited.insert(cur) {
            break;
        }
        chain.push(cur);
        match registry.parent(cur) {
            Some(parent) => cur = parent,
            None => break,
        }
    }
    chain.reverse();
    chain
}

/// Selector-like path from the root to `id`, or `None` when the id has no
/// registry record.
///
/// Each ancestor renders as `tag[id]`, `tag#htmlId[id]` when the node has an
/// html id, with `[name="..."]` appended when it has a name attribute;
/// segments join with `" > "`.
#[must_use]
pub fn dom_path(registry: &NodeRegistry, id: NodeId) -> Option<String> {
    if !registry.contains(id) {
        return None;
    }
    let labels: Vec<String> = ancestor_chain(registry, id)
        .into_iter()
        .filter_map(|cid| registry.get(cid).map(path_label))
        .collect();
    Some(labels.join(" > "))
}

fn path_label(node: &DomNode) -> String {
    let mut label = match node.html_id() {
        Some(html_id) => format!("{}#{}[{}]", node.label_tag(), html_id, node.id),
        None => format!("{}[{}]", node.label_tag(), node.id),
    };
    if let Some(name) = node.html_name() {
        label.push_str(&format!("[name=\"{}\"]", name));
    }
    label
}

/// One-line node summary: `[id] tag id="..." name="..." -> "text"`.
///
/// Absent fields are omitted entirely, and the text excerpt is capped at 80
/// characters.
#[must_use]
pub fn summarize(node: &DomNode) -> String {
    let mut out = format!("[{}] {}", node.id, node.display_tag());
    if let Some(html_id) = node.html_id() {
        out.push_str(&format!(" id=\"{}\"", html_id));
    }
    if let Some(name) = node.html_name() {
        out.push_str(&format!(" name=\"{}\"", name));
    }
    if let Some(text) = node.text.as_deref().filter(|t| !t.is_empty()) {
        let excerpt: String = text.chars().take(TEXT_EXCERPT_CHARS).collect();
        out.push_str(&format!(" -> \"{}\"", excerpt));
    }
    out
}

/// Direct children of `id`, in document order.
///
/// Incrementally-added nodes are leaf references and typically have none,
/// which is expected, not an error.
#[must_use]
pub fn direct_children(registry: &NodeRegistry, id: NodeId) -> Vec<&DomNode> {
    registry
        .get(id)
        .map(|node| {
            node.children
                .iter()
                .filter_map(|child| registry.get(*child))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;
    use domscope_event::RecordingEvent;
    use serde_json::json;

    fn page_registry() -> NodeRegistry {
        RegistryBuilder::new().build(&[RecordingEvent::new(
            2,
            json!({"node": {
                "id": 1,
                "tagName": "html",
                "childNodes": [
                    {"id": 2, "tagName": "body", "attributes": {"id": "main"}, "childNodes": [
                        {"id": 3, "tagName": "form", "attributes": {"name": "login"}, "childNodes": [
                            {"id": 4, "tagName": "INPUT",
                             "attributes": ["id", "login-btn", "name", "submit"],
                             "value": "ok"},
                            {"id": 5, "type": 3, "textContent": "Sign in to continue"}
                        ]}
                    ]}
                ]
            }}),
        )])
    }

    #[test]
    fn test_ancestor_chain_root_first() {
        let registry = page_registry();
        let chain: Vec<u64> = ancestor_chain(&registry, NodeId::from_raw(4))
            .iter()
            .map(NodeId::as_u64)
            .collect();
        assert_eq!(chain, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_ancestor_chain_of_root() {
        let registry = page_registry();
        let chain = ancestor_chain(&registry, NodeId::from_raw(1));
        assert_eq!(chain, vec![NodeId::from_raw(1)]);
    }

    #[test]
    fn test_ancestor_chain_unknown_id() {
        let registry = page_registry();
        assert!(ancestor_chain(&registry, NodeId::from_raw(404)).is_empty());
    }

    #[test]
    fn test_ancestor_chain_cycle_terminates() {
        // Crafted recording where 10's parent is 11 and 11's parent is 10.
        let registry = RegistryBuilder::new().build(&[
            RecordingEvent::new(1, json!({"adds": [
                {"parentId": 11, "node": {"id": 10}},
                {"parentId": 10, "node": {"id": 11}}
            ]})),
        ]);
        assert_eq!(registry.parent(NodeId::from_raw(10)), Some(NodeId::from_raw(11)));
        assert_eq!(registry.parent(NodeId::from_raw(11)), Some(NodeId::from_raw(10)));

        let chain = ancestor_chain(&registry, NodeId::from_raw(10));
        assert_eq!(chain.len(), 2);
        let chain = ancestor_chain(&registry, NodeId::from_raw(11));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_ancestor_chain_stops_at_unregistered_parent() {
        let registry = RegistryBuilder::new().build(&[RecordingEvent::new(
            1,
            json!({"adds": [{"parentId": 999, "node": {"id": 7}}]}),
        )]);
        // Parent link exists but 999 has no record; the chain is just [7].
        assert_eq!(ancestor_chain(&registry, NodeId::from_raw(7)), vec![NodeId::from_raw(7)]);
    }

    #[test]
    fn test_dom_path() {
        let registry = page_registry();
        assert_eq!(
            dom_path(&registry, NodeId::from_raw(4)).unwrap(),
            "html[1] > body#main[2] > form[3][name=\"login\"] > input#login-btn[4][name=\"submit\"]"
        );
    }

    #[test]
    fn test_dom_path_end_to_end_scenario() {
        let registry = RegistryBuilder::new().build(&[RecordingEvent::new(
            2,
            json!({"node": {"id": 1, "tagName": "html", "childNodes": [
                {"id": 2, "tagName": "body", "attributes": {"id": "main"}, "childNodes": []}
            ]}}),
        )]);
        assert_eq!(
            dom_path(&registry, NodeId::from_raw(2)).unwrap(),
            "html[1] > body#main[2]"
        );
    }

    #[test]
    fn test_dom_path_unknown_id() {
        let registry = page_registry();
        assert_eq!(dom_path(&registry, NodeId::from_raw(404)), None);
    }

    #[test]
    fn test_summarize_element() {
        let registry = page_registry();
        let node = registry.get(NodeId::from_raw(4)).unwrap();
        assert_eq!(
            summarize(node),
            "[4] INPUT id=\"login-btn\" name=\"submit\" -> \"ok\""
        );
    }

    #[test]
    fn test_summarize_text_node() {
        let registry = page_registry();
        let node = registry.get(NodeId::from_raw(5)).unwrap();
        assert_eq!(summarize(node), "[5] #text -> \"Sign in to continue\"");
    }

    #[test]
    fn test_summarize_bare_element() {
        let registry = page_registry();
        let node = registry.get(NodeId::from_raw(1)).unwrap();
        assert_eq!(summarize(node), "[1] html");
    }

    #[test]
    fn test_summarize_truncates_text() {
        let long = "x".repeat(200);
        let node = domscope_event::DomNode::from_value(&json!({
            "id": 9, "type": 3, "textContent": long
        }))
        .unwrap();
        let summary = summarize(&node);
        assert!(summary.ends_with(&format!("\"{}\"", "x".repeat(80))));
    }

    #[test]
    fn test_direct_children() {
        let registry = page_registry();
        let children = direct_children(&registry, NodeId::from_raw(3));
        let ids: Vec<u64> = children.iter().map(|n| n.id.as_u64()).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[test]
    fn test_direct_children_of_leaf_and_unknown() {
        let registry = page_registry();
        assert!(direct_children(&registry, NodeId::from_raw(5)).is_empty());
        assert!(direct_children(&registry, NodeId::from_raw(404)).is_empty());
    }
}
