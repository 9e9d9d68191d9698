//! Event stream identities and records

use routenet_core::{Mrid, RouteNetworkEvent};
use serde::{Deserialize, Serialize};

/// Identity of a logical event stream (one per aggregate).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(String);

impl StreamId {
    /// Wrap a raw stream key.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Stream for a single network entity.
    pub fn for_entity(mrid: Mrid) -> Self {
        Self(format!("route-network-{mrid}"))
    }

    /// The raw stream key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StreamId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An event as stored: stream-scoped and versioned.
///
/// `version` is the number of events appended up to and including this one;
/// the first event of a stream has version 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub stream_id: StreamId,
    pub version: u64,
    pub event: RouteNetworkEvent,
}
