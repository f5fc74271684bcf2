//! The rrweb event envelope.
//!
//! An rrweb recording is an ordered JSON array of `{type, data, timestamp}`
//! objects. The numeric `type` tag differs between rrweb versions, so the
//! kind mapping is deliberately version-tolerant; the `data` payload is kept
//! as raw JSON because its shape is open-ended and consumers only ever pick
//! individual fields out of it.

use domscope_core::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event kind - what an event contributes to DOM reconstruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Entire DOM tree captured at a point in time (raw type 0 or 2)
    FullSnapshot,
    /// Additions/changes relative to the last known state (raw type 1)
    Incremental,
    /// Informational kinds that carry no node structure (meta, custom, ...)
    Other,
}

impl EventKind {
    /// Classify a raw rrweb `type` tag.
    ///
    /// Full snapshots are tagged 0 or 2 depending on rrweb version.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        match raw {
            0 | 2 => Self::FullSnapshot,
            1 => Self::Incremental,
            _ => Self::Other,
        }
    }

    /// Whether this kind carries node structure
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(self, Self::FullSnapshot | Self::Incremental)
    }
}

/// One decoded rrweb event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingEvent {
    /// Raw rrweb event type tag
    #[serde(rename = "type")]
    pub raw_type: i64,
    /// Variant payload; shape depends on the type tag
    #[serde(default)]
    pub data: Value,
    /// Capture timestamp in milliseconds, when the producer recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl RecordingEvent {
    /// Create an event from a raw type tag and payload
    #[must_use]
    pub fn new(raw_type: i64, data: Value) -> Self {
        Self {
            raw_type,
            data,
            timestamp: None,
        }
    }

    /// Classified kind of this event
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        EventKind::from_raw(self.raw_type)
    }

    /// The `data.id` field, when present and id-shaped
    #[must_use]
    pub fn data_id(&self) -> Option<NodeId> {
        self.data.get("id").and_then(NodeId::from_json)
    }

    /// The full-snapshot root node, when this event carries one
    #[must_use]
    pub fn snapshot_root(&self) -> Option<&Value> {
        if self.kind() != EventKind::FullSnapshot {
            return None;
        }
        self.data.get("node")
    }

    /// The incremental `adds` list, when this event carries one
    #[must_use]
    pub fn adds(&self) -> Option<&Vec<Value>> {
        if self.kind() != EventKind::Incremental {
            return None;
        }
        self.data.get("adds").and_then(Value::as_array)
    }

    /// Conservative containment check: does the token appear anywhere in the
    /// event serialized back to JSON text?
    ///
    /// Format-agnostic on purpose; rrweb stashes text in too many payload
    /// shapes to enumerate.
    #[must_use]
    pub fn contains_token(&self, token: &str) -> bool {
        match serde_json::to_string(self) {
            Ok(s) => s.contains(token),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_from_raw() {
        assert_eq!(EventKind::from_raw(0), EventKind::FullSnapshot);
        assert_eq!(EventKind::from_raw(2), EventKind::FullSnapshot);
        assert_eq!(EventKind::from_raw(1), EventKind::Incremental);
        assert_eq!(EventKind::from_raw(3), EventKind::Other);
        assert_eq!(EventKind::from_raw(-1), EventKind::Other);
    }

    #[test]
    fn test_kind_is_structural() {
        assert!(EventKind::FullSnapshot.is_structural());
        assert!(EventKind::Incremental.is_structural());
        assert!(!EventKind::Other.is_structural());
    }

    #[test]
    fn test_event_deserialize() {
        let ev: RecordingEvent =
            serde_json::from_value(json!({"type": 2, "data": {"node": {"id": 1}}, "timestamp": 1000}))
                .unwrap();
        assert_eq!(ev.kind(), EventKind::FullSnapshot);
        assert!(ev.snapshot_root().is_some());
        assert_eq!(ev.timestamp, Some(1000.0));
    }

    #[test]
    fn test_event_without_data() {
        let ev: RecordingEvent = serde_json::from_value(json!({"type": 4})).unwrap();
        assert_eq!(ev.kind(), EventKind::Other);
        assert_eq!(ev.data_id(), None);
        assert_eq!(ev.snapshot_root(), None);
    }

    #[test]
    fn test_data_id() {
        let ev = RecordingEvent::new(3, json!({"id": 292, "x": 10}));
        assert_eq!(ev.data_id(), Some(NodeId::from_raw(292)));

        let ev = RecordingEvent::new(3, json!({"id": "not-a-number"}));
        assert_eq!(ev.data_id(), None);
    }

    #[test]
    fn test_snapshot_root_only_on_snapshots() {
        let ev = RecordingEvent::new(1, json!({"node": {"id": 5}}));
        assert_eq!(ev.snapshot_root(), None);

        let ev = RecordingEvent::new(0, json!({"node": {"id": 5}}));
        assert_eq!(ev.snapshot_root(), Some(&json!({"id": 5})));
    }

    #[test]
    fn test_adds_only_on_incremental() {
        let adds = json!([{"parentId": 1, "node": {"id": 9}}]);
        let ev = RecordingEvent::new(1, json!({"adds": adds}));
        assert_eq!(ev.adds().map(Vec::len), Some(1));

        let ev = RecordingEvent::new(2, json!({"adds": adds}));
        assert_eq!(ev.adds(), None);
    }

    #[test]
    fn test_contains_token() {
        let ev = RecordingEvent::new(
            3,
            json!({"texts": [{"id": 42, "text": "abcxyz-token-123-rest"}]}),
        );
        assert!(ev.contains_token("token-123"));
        assert!(!ev.contains_token("absent"));
    }
}
