//! Node registry construction.
//!
//! One pass over the event stream builds two maps: id -> most-recently-seen
//! node record and id -> parent id. Full snapshots contribute whole subtrees;
//! incremental mutations contribute `adds` entries. Both maps are read-only
//! once the pass completes.
//!
//! Invariants:
//! - node records are last-write-wins; a later snapshot overwrites, never
//!   merges
//! - a parent link, once set, is never cleared or replaced (first parent
//!   wins; conflicts are counted, not applied)
//! - a malformed event or node degrades coverage only; the pass never aborts

use domscope_core::NodeId;
use domscope_event::node::raw_children;
use domscope_event::{DomNode, EventKind, RecordingEvent};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, trace};

/// Registry build configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Maximum events to replay (0 = unlimited)
    pub max_events: usize,
}

/// Counters accumulated during the build pass.
///
/// Skips are first-class outcomes here, not swallowed exceptions, so tests
/// and the presentation layer can observe how much of a recording was usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Structural events (snapshot/incremental) that contributed nodes
    pub events_applied: usize,
    /// Structural events missing their expected payload, skipped whole
    pub events_skipped: usize,
    /// Node registrations performed, overwrites included
    pub nodes_registered: usize,
    /// Items skipped inside event payloads (missing id, bad shape)
    pub nodes_skipped: usize,
    /// Re-registrations that supplied a different parent than the stored one
    pub parent_conflicts: usize,
}

/// Outcome of registering one subtree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeOutcome {
    /// Nodes registered from this subtree
    pub registered: usize,
    /// Items skipped in this subtree
    pub skipped: usize,
}

/// The accumulated id -> node and id -> parent maps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRegistry {
    nodes: IndexMap<NodeId, DomNode>,
    parents: IndexMap<NodeId, NodeId>,
    stats: BuildStats,
}

impl NodeRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the most-recently-seen record for an id
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(&id)
    }

    /// Look up an id's parent, if one was ever supplied
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// Whether an id has a node record
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of distinct node ids seen
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no nodes were registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Build-pass counters
    #[must_use]
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Iterate registered ids in first-seen order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Register a raw serialized node and all its descendants.
    ///
    /// Descent uses an explicit queue with a per-walk visited set: sibling
    /// order is preserved, depth is bounded, and an id repeating inside one
    /// subtree cannot loop the walk. Items without a usable id are skipped
    /// without descending into their children, matching how recordings are
    /// anchored: a child of an unidentifiable node has no usable parent link.
    pub fn register_tree(&mut self, raw: &Value, parent: Option<NodeId>) -> TreeOutcome {
        let mut outcome = TreeOutcome::default();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut work: VecDeque<(&Value, Option<NodeId>)> = VecDeque::new();
        work.push_back((raw, parent));

        while let Some((item, parent_id)) = work.pop_front() {
            let Some(node) = DomNode::from_value(item) else {
                outcome.skipped += 1;
                continue;
            };
            let id = node.id;
            if !visited.insert(id) {
                trace!(%id, "id repeated within one subtree, skipping");
                outcome.skipped += 1;
                continue;
            }

            self.insert_node(node, parent_id);
            outcome.registered += 1;

            for child in raw_children(item) {
                work.push_back((child, Some(id)));
            }
        }

        self.stats.nodes_registered += outcome.registered;
        self.stats.nodes_skipped += outcome.skipped;
        outcome
    }

    fn insert_node(&mut self, node: DomNode, parent_id: Option<NodeId>) {
        let id = node.id;
        self.nodes.insert(id, node);

        if let Some(pid) = parent_id {
            match self.parents.get(&id) {
                None => {
                    self.parents.insert(id, pid);
                }
                Some(existing) if *existing != pid => {
                    // First parent wins; the conflict stays observable.
                    self.stats.parent_conflicts += 1;
                }
                Some(_) => {}
            }
            self.link_child(pid, id);
        }
    }

    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        if let Some(parent) = self.nodes.get_mut(&parent_id) {
            if !parent.children.contains(&child_id) {
                parent.children.push(child_id);
            }
        }
    }

    fn apply_event(&mut self, event: &RecordingEvent) {
        match event.kind() {
            EventKind::FullSnapshot => {
                if let Some(root) = event.snapshot_root() {
                    let outcome = self.register_tree(root, None);
                    trace!(
                        registered = outcome.registered,
                        skipped = outcome.skipped,
                        "applied full snapshot"
                    );
                    self.stats.events_applied += 1;
                } else {
                    self.stats.events_skipped += 1;
                }
            }
            EventKind::Incremental => {
                let Some(adds) = event.adds() else {
                    // Incremental events carrying only texts/inputs/moves
                    // contribute no new nodes.
                    self.stats.events_skipped += 1;
                    return;
                };
                self.stats.events_applied += 1;
                for add in adds {
                    let Some(node) = add.get("node") else {
                        self.stats.nodes_skipped += 1;
                        continue;
                    };
                    let parent = add.get("parentId").and_then(NodeId::from_json);
                    self.register_tree(node, parent);
                }
            }
            EventKind::Other => {}
        }
    }
}

/// Builds a [`NodeRegistry`] by replaying an event stream in order
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    config: BuildConfig,
}

impl RegistryBuilder {
    /// Create a builder with the default config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    #[must_use]
    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Replay the event stream and return the populated registry
    #[must_use]
    pub fn build(&self, events: &[RecordingEvent]) -> NodeRegistry {
        let mut registry = NodeRegistry::new();
        let limit = if self.config.max_events > 0 {
            self.config.max_events.min(events.len())
        } else {
            events.len()
        };

        for event in &events[..limit] {
            registry.apply_event(event);
        }

        debug!(
            nodes = registry.len(),
            events_applied = registry.stats().events_applied,
            nodes_skipped = registry.stats().nodes_skipped,
            "registry built"
        );
        registry
    }
}
