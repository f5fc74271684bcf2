//! Query resolution.
//!
//! A raw query string is either a node id (whole input parses as a
//! non-negative integer) or an opaque token. The matching pass scans every
//! event in order; the target id is then extracted from the first match by a
//! strict strategy chain. Every failure mode is a distinct reportable
//! outcome, never an error.

use crate::registry::NodeRegistry;
use domscope_core::NodeId;
use domscope_event::RecordingEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// A classified user query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Query {
    /// Whole input parsed as a node id
    Id(NodeId),
    /// Anything else: matched as a substring token
    Token(String),
}

impl Query {
    /// Classify raw user input
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match NodeId::parse(raw) {
            Some(id) => Self::Id(id),
            None => Self::Token(raw.to_string()),
        }
    }

    /// Whether this is a numeric id query
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Id(_))
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {}", id),
            Self::Token(token) => write!(f, "token {:?}", token),
        }
    }
}

/// How a query resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ResolveOutcome {
    /// A target id was determined from the matched events
    Resolved(NodeId),
    /// No event matched, but the queried id exists in the registry
    /// (known from snapshots, never referenced by a matching event)
    SnapshotOnly(NodeId),
    /// Events matched but no extraction strategy produced an id
    Unextracted,
    /// Nothing matched
    NoMatch,
}

impl ResolveOutcome {
    /// The target id, when one was determined
    #[must_use]
    pub const fn target(&self) -> Option<NodeId> {
        match self {
            Self::Resolved(id) | Self::SnapshotOnly(id) => Some(*id),
            Self::Unextracted | Self::NoMatch => None,
        }
    }
}

/// Result of resolving one query against one event stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Indices of matching events, in encounter order
    pub matched: Vec<usize>,
    /// The determined outcome
    pub outcome: ResolveOutcome,
}

/// Resolve a query against the event stream.
///
/// The registry is consulted only for the snapshot-only annotation: a
/// numeric id that no event references can still be a perfectly good node.
#[must_use]
pub fn resolve(events: &[RecordingEvent], query: &Query, registry: &NodeRegistry) -> Resolution {
    let matched = matching_indices(events, query);
    debug!(%query, matches = matched.len(), "matching pass complete");

    let outcome = match matched.first() {
        Some(&first) => match query {
            Query::Id(id) => ResolveOutcome::Resolved(*id),
            Query::Token(token) => extract_target(&events[first], token)
                .map_or(ResolveOutcome::Unextracted, ResolveOutcome::Resolved),
        },
        None => match query {
            Query::Id(id) if registry.contains(*id) => ResolveOutcome::SnapshotOnly(*id),
            _ => ResolveOutcome::NoMatch,
        },
    };

    Resolution { matched, outcome }
}

/// Indices of events matching the query, in order; an event matches once.
fn matching_indices(events: &[RecordingEvent], query: &Query) -> Vec<usize> {
    let mut matched = Vec::new();
    for (index, event) in events.iter().enumerate() {
        let hit = match query {
            Query::Id(id) => event.data_id() == Some(*id),
            Query::Token(token) => event.contains_token(token),
        };
        if hit {
            matched.push(index);
        }
    }
    matched
}

/// Extract a target id from the first matched event of a token query.
///
/// Strategy order is strict, first success wins:
/// `data.id`, then `data.texts[].text`, then `data.inputs[].value`, then
/// `data.node.id`.
fn extract_target(event: &RecordingEvent, token: &str) -> Option<NodeId> {
    if let Some(id) = event.data_id() {
        return Some(id);
    }
    if let Some(id) = id_from_entries(&event.data, "texts", "text", token) {
        return Some(id);
    }
    if let Some(id) = id_from_entries(&event.data, "inputs", "value", token) {
        return Some(id);
    }
    event
        .data
        .get("node")
        .and_then(|node| node.get("id"))
        .and_then(NodeId::from_json)
}

/// Scan an `[{id, <field>}, ...]` payload list for the first entry whose
/// field contains the token.
fn id_from_entries(data: &Value, list: &str, field: &str, token: &str) -> Option<NodeId> {
    let entries = data.get(list)?.as_array()?;
    entries
        .iter()
        .find(|entry| {
            entry
                .get(field)
                .is_some_and(|value| scalar_contains(value, token))
        })
        .and_then(|entry| entry.get("id"))
        .and_then(NodeId::from_json)
}

/// Substring check with the scalar coercion input values need
/// (input `value` payloads may be numbers).
fn scalar_contains(value: &Value, token: &str) -> bool {
    match value {
        Value::String(s) => s.contains(token),
        Value::Number(n) => n.to_string().contains(token),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;
    use serde_json::json;

    fn empty_registry() -> NodeRegistry {
        NodeRegistry::new()
    }

    #[test]
    fn test_query_classification() {
        assert_eq!(Query::parse("292"), Query::Id(NodeId::from_raw(292)));
        assert!(Query::parse("292").is_numeric());
        assert_eq!(Query::parse("0cAFcWeA7"), Query::Token("0cAFcWeA7".to_string()));
        assert_eq!(Query::parse("2.5"), Query::Token("2.5".to_string()));
    }

    #[test]
    fn test_numeric_match_on_data_id() {
        let events = [
            RecordingEvent::new(3, json!({"id": 291})),
            RecordingEvent::new(3, json!({"id": 292})),
            RecordingEvent::new(3, json!({"id": 292, "x": 4})),
        ];
        let res = resolve(&events, &Query::parse("292"), &empty_registry());
        assert_eq!(res.matched, vec![1, 2]);
        assert_eq!(res.outcome, ResolveOutcome::Resolved(NodeId::from_raw(292)));
    }

    #[test]
    fn test_token_match_resolves_via_texts() {
        let events = [RecordingEvent::new(
            3,
            json!({"texts": [
                {"id": 41, "text": "nothing here"},
                {"id": 42, "text": "abcxyz-token-123-suffix"}
            ]}),
        )];
        let res = resolve(&events, &Query::parse("token-123"), &empty_registry());
        assert_eq!(res.matched, vec![0]);
        assert_eq!(res.outcome, ResolveOutcome::Resolved(NodeId::from_raw(42)));
    }

    #[test]
    fn test_token_match_resolves_via_inputs() {
        let events = [RecordingEvent::new(
            3,
            json!({"inputs": [{"id": 17, "value": "user-secret-value"}]}),
        )];
        let res = resolve(&events, &Query::parse("secret"), &empty_registry());
        assert_eq!(res.outcome, ResolveOutcome::Resolved(NodeId::from_raw(17)));
    }

    #[test]
    fn test_data_id_beats_texts() {
        let events = [RecordingEvent::new(
            3,
            json!({"id": 7, "texts": [{"id": 42, "text": "the-token"}]}),
        )];
        let res = resolve(&events, &Query::parse("the-token"), &empty_registry());
        assert_eq!(res.outcome, ResolveOutcome::Resolved(NodeId::from_raw(7)));
    }

    #[test]
    fn test_node_id_fallback() {
        let events = [RecordingEvent::new(
            3,
            json!({"node": {"id": 55, "tagName": "needle-tag"}}),
        )];
        let res = resolve(&events, &Query::parse("needle-tag"), &empty_registry());
        assert_eq!(res.outcome, ResolveOutcome::Resolved(NodeId::from_raw(55)));
    }

    #[test]
    fn test_unextracted() {
        // Token appears in the payload but nowhere an id can be pulled from.
        let events = [RecordingEvent::new(3, json!({"href": "page-with-token"}))];
        let res = resolve(&events, &Query::parse("page-with-token"), &empty_registry());
        assert_eq!(res.matched, vec![0]);
        assert_eq!(res.outcome, ResolveOutcome::Unextracted);
        assert_eq!(res.outcome.target(), None);
    }

    #[test]
    fn test_no_match() {
        let events = [RecordingEvent::new(3, json!({"id": 1}))];
        let res = resolve(&events, &Query::parse("absent"), &empty_registry());
        assert!(res.matched.is_empty());
        assert_eq!(res.outcome, ResolveOutcome::NoMatch);
    }

    #[test]
    fn test_snapshot_only_annotation() {
        let registry = RegistryBuilder::new().build(&[RecordingEvent::new(
            2,
            json!({"node": {"id": 292, "tagName": "div"}}),
        )]);
        // No event carries data.id == 292; the id is known only from the tree.
        let events = [RecordingEvent::new(3, json!({"id": 1}))];
        let res = resolve(&events, &Query::parse("292"), &registry);
        assert!(res.matched.is_empty());
        assert_eq!(res.outcome, ResolveOutcome::SnapshotOnly(NodeId::from_raw(292)));
        assert_eq!(res.outcome.target(), Some(NodeId::from_raw(292)));
    }

    #[test]
    fn test_matched_indices_unique_per_event() {
        // A numeric query never falls through to token matching, so an event
        // is counted once even when both checks would hit.
        let events = [RecordingEvent::new(3, json!({"id": 5, "text": "5"}))];
        let res = resolve(&events, &Query::parse("5"), &empty_registry());
        assert_eq!(res.matched, vec![0]);
    }

    #[test]
    fn test_extraction_uses_first_match_only() {
        let events = [
            RecordingEvent::new(3, json!({"texts": [{"id": 1, "text": "tok-here"}]})),
            RecordingEvent::new(3, json!({"texts": [{"id": 2, "text": "tok-here"}]})),
        ];
        let res = resolve(&events, &Query::parse("tok-here"), &empty_registry());
        assert_eq!(res.matched, vec![0, 1]);
        assert_eq!(res.outcome, ResolveOutcome::Resolved(NodeId::from_raw(1)));
    }

    #[test]
    fn test_numeric_input_value_coerced() {
        // "2.5" classifies as a token (not a u64), and the input value is a
        // JSON number; the containment check must coerce it.
        let events = [RecordingEvent::new(
            3,
            json!({"inputs": [{"id": 3, "value": 2.5}]}),
        )];
        let res = resolve(&events, &Query::parse("2.5"), &empty_registry());
        assert_eq!(res.matched, vec![0]);
        assert_eq!(res.outcome, ResolveOutcome::Resolved(NodeId::from_raw(3)));
    }
}
