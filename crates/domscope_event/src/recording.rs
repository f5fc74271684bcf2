//! Recording files.
//!
//! Producers write the event stream as a JSON array, plus a gzip copy next
//! to it. Loading sniffs the gzip magic so either file works. Individual
//! items that fail to decode as events are skipped and counted - a corrupt
//! entry degrades coverage, not the whole recording.

use crate::event::RecordingEvent;
use flate2::read::GzDecoder;
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Recording load errors
#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    /// Could not read the file
    #[error("failed to read recording: {0}")]
    Io(#[from] std::io::Error),
    /// The payload is not a JSON document
    #[error("recording is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The payload is JSON but not an array of events
    #[error("recording is not a JSON array of events")]
    NotAnArray,
}

/// A fully-loaded, ordered event stream
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    events: Vec<RecordingEvent>,
    skipped: usize,
}

impl Recording {
    /// Wrap an already-decoded event sequence
    #[must_use]
    pub fn from_events(events: Vec<RecordingEvent>) -> Self {
        Self { events, skipped: 0 }
    }

    /// Decode a recording from a parsed JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error only when the document is not an array; items inside
    /// the array that fail to decode are skipped and counted.
    pub fn from_value(doc: Value) -> Result<Self, RecordingError> {
        let Value::Array(items) = doc else {
            return Err(RecordingError::NotAnArray);
        };
        let total = items.len();
        let mut events = Vec::with_capacity(total);
        let mut skipped = 0;
        for item in items {
            match serde_json::from_value::<RecordingEvent>(item) {
                Ok(event) => events.push(event),
                Err(err) => {
                    skipped += 1;
                    warn!(error = %err, "skipping undecodable recording item");
                }
            }
        }
        debug!(events = events.len(), skipped, "decoded recording");
        Ok(Self { events, skipped })
    }

    /// Decode a recording from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a JSON array.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RecordingError> {
        let doc: Value = serde_json::from_slice(bytes)?;
        Self::from_value(doc)
    }

    /// Load a recording from a `.json` or `.json.gz` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON array.
    pub fn load(path: &Path) -> Result<Self, RecordingError> {
        let mut file = File::open(path)?;
        let mut raw = Vec::new();
        file.read_to_end(&mut raw)?;
        if raw.starts_with(&GZIP_MAGIC) {
            let mut decoded = Vec::new();
            GzDecoder::new(raw.as_slice()).read_to_end(&mut decoded)?;
            raw = decoded;
        }
        Self::from_slice(&raw)
    }

    /// The decoded events, in capture order
    #[must_use]
    pub fn events(&self) -> &[RecordingEvent] {
        &self.events
    }

    /// Number of decoded events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the recording decoded to zero events
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of array items that failed to decode
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
