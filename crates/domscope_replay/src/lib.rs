//! domscope replay engine
//!
//! Replays an rrweb event stream into a node registry (id -> node and
//! id -> parent maps), resolves a user query to a target node id, and
//! reconstructs the target's ancestry path and sibling context.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod path;
pub mod registry;
pub mod report;
pub mod resolve;

pub use path::{ancestor_chain, direct_children, dom_path, summarize};
pub use registry::{BuildConfig, BuildStats, NodeRegistry, RegistryBuilder, TreeOutcome};
pub use report::{InspectReport, TargetContext};
pub use resolve::{resolve, Query, Resolution, ResolveOutcome};
