//! domscope core types
//!
//! This crate contains pure types and logic with no I/O: the rrweb node
//! identifier shared by every other crate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod id;

// Re-exports
pub use id::NodeId;
