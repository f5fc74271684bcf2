//! domscope event model
//!
//! Decoded rrweb recording structures: the raw event envelope, the normalized
//! DOM node record, attribute normalization, and recording-file loading.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attrs;
pub mod event;
pub mod node;
pub mod recording;

pub use attrs::{normalize_attrs, node_attrs};
pub use event::{EventKind, RecordingEvent};
pub use node::DomNode;
pub use recording::{Recording, RecordingError};
