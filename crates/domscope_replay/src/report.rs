//! The assembled inspection report.
//!
//! Everything the presentation layer needs, as plain data: registry size and
//! build counters, matched event indices, the resolution outcome, and the
//! target's summary, dom path, ancestry, and children. Formatting belongs to
//! the consumer.

use crate::path::{ancestor_chain, direct_children, dom_path, summarize};
use crate::registry::{BuildStats, NodeRegistry};
use crate::resolve::{resolve, Query, ResolveOutcome};
use domscope_core::NodeId;
use domscope_event::RecordingEvent;
use serde::{Deserialize, Serialize};

/// Context reconstructed around a resolved target node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetContext {
    /// The resolved id
    pub id: NodeId,
    /// Whether the registry has a record for it; a node created after the
    /// last anchoring snapshot resolves but stays unknown
    pub known: bool,
    /// One-line summary of the target node
    pub summary: Option<String>,
    /// Selector-like root-to-target path
    pub dom_path: Option<String>,
    /// Summaries of the ancestor chain, root-first, target included
    pub ancestors: Vec<String>,
    /// Summaries of the target's direct children, possibly empty
    pub children: Vec<String>,
}

/// Full inspection report for one query against one recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectReport {
    /// The classified query that was resolved
    pub query: Query,
    /// Count of distinct node ids in the registry
    pub registry_size: usize,
    /// Build-pass counters (events applied, items skipped, ...)
    pub build_stats: BuildStats,
    /// Indices of matched events, in encounter order
    pub matched_indices: Vec<usize>,
    /// How the query resolved
    pub outcome: ResolveOutcome,
    /// The first matched event, pretty-printed for display
    pub matched_event: Option<String>,
    /// Target node context, when a target id was determined
    pub target: Option<TargetContext>,
}

impl InspectReport {
    /// Resolve a query and assemble the full report.
    #[must_use]
    pub fn build(events: &[RecordingEvent], query: Query, registry: &NodeRegistry) -> Self {
        let resolution = resolve(events, &query, registry);

        let matched_event = resolution
            .matched
            .first()
            .and_then(|&index| serde_json::to_string_pretty(&events[index]).ok());

        let target = resolution
            .outcome
            .target()
            .map(|id| TargetContext::build(registry, id));

        Self {
            query,
            registry_size: registry.len(),
            build_stats: registry.stats().clone(),
            matched_indices: resolution.matched,
            outcome: resolution.outcome,
            matched_event,
            target,
        }
    }
}

impl TargetContext {
    /// Reconstruct the context around one id.
    #[must_use]
    pub fn build(registry: &NodeRegistry, id: NodeId) -> Self {
        let known = registry.contains(id);
        let summary = registry.get(id).map(summarize);
        let ancestors = ancestor_chain(registry, id)
            .into_iter()
            .filter_map(|cid| registry.get(cid).map(summarize))
            .collect();
        let children = direct_children(registry, id)
            .into_iter()
            .map(summarize)
            .collect();
        Self {
            id,
            known,
            summary,
            dom_path: dom_path(registry, id),
            ancestors,
            children,
        }
    }
}
