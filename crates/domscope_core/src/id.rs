//! Node identifiers.
//!
//! rrweb assigns every serialized DOM node a non-negative integer id that is
//! stable for the lifetime of one recording. It is the only key that links a
//! node across snapshots and incremental mutations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Node identifier - the rrweb serialized-node id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Create from a raw integer
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw integer value
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Coerce a JSON value into an id.
    ///
    /// Recordings produced by different rrweb versions store ids as integers,
    /// occasionally as floats with zero fraction. Anything else is `None`.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        let num = value.as_number()?;
        if let Some(raw) = num.as_u64() {
            return Some(Self(raw));
        }
        // Negative integers and fractional floats are never valid node ids.
        let f = num.as_f64()?;
        if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
            return Some(Self(f as u64));
        }
        None
    }

    /// Parse an id from user input.
    ///
    /// The whole trimmed string must be a non-negative integer; partial or
    /// fractional input is rejected so it can fall through to token matching.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        input.trim().parse::<u64>().ok().map(Self)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
