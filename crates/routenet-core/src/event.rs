//! Domain events for route network streams
//!
//! Events are appended to per-aggregate streams and are the source of truth
//! for downstream systems. Streams are append-only; deletions are modeled as
//! tombstone events, never as removal of history.

use crate::mrid::Mrid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The change a single domain event describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteNetworkChange {
    /// A node was added to the network
    NodeAdded {
        node_id: Mrid,
    },
    /// A segment was added, connected between two nodes
    SegmentAdded {
        segment_id: Mrid,
        from_node_id: Mrid,
        to_node_id: Mrid,
    },
    /// A node's geometry was modified
    NodeGeometryModified {
        node_id: Mrid,
    },
    /// A segment's geometry was modified
    SegmentGeometryModified {
        segment_id: Mrid,
    },
    /// An existing segment was replaced by two segments sharing a node
    SegmentSplit {
        retired_segment_id: Mrid,
        at_node_id: Mrid,
        new_segment_ids: [Mrid; 2],
    },
    /// Tombstone: the node is gone from the live network
    NodeMarkedForDeletion {
        node_id: Mrid,
    },
    /// Tombstone: the segment is gone from the live network
    SegmentMarkedForDeletion {
        segment_id: Mrid,
    },
}

impl RouteNetworkChange {
    /// Identity of the primary entity the change concerns.
    pub fn entity_id(&self) -> Mrid {
        match self {
            Self::NodeAdded { node_id }
            | Self::NodeGeometryModified { node_id }
            | Self::NodeMarkedForDeletion { node_id } => *node_id,
            Self::SegmentAdded { segment_id, .. }
            | Self::SegmentGeometryModified { segment_id }
            | Self::SegmentMarkedForDeletion { segment_id } => *segment_id,
            Self::SegmentSplit {
                retired_segment_id, ..
            } => *retired_segment_id,
        }
    }

    /// Whether this change removes the entity from the live network.
    pub fn is_tombstone(&self) -> bool {
        matches!(
            self,
            Self::NodeMarkedForDeletion { .. } | Self::SegmentMarkedForDeletion { .. }
        )
    }
}

/// A single record in an event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteNetworkEvent {
    /// Globally unique event identity
    pub event_id: Mrid,
    /// When the event was produced
    pub event_ts: DateTime<Utc>,
    /// The described change
    pub change: RouteNetworkChange,
}

impl RouteNetworkEvent {
    /// Create an event for a change, stamped now.
    pub fn new(change: RouteNetworkChange) -> Self {
        Self {
            event_id: Mrid::new(),
            event_ts: Utc::now(),
            change,
        }
    }

    /// Create an event with an explicit timestamp.
    pub fn at(change: RouteNetworkChange, event_ts: DateTime<Utc>) -> Self {
        Self {
            event_id: Mrid::new(),
            event_ts,
            change,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id() {
        let node_id = Mrid::new();
        let change = RouteNetworkChange::NodeAdded { node_id };
        assert_eq!(change.entity_id(), node_id);

        let retired = Mrid::new();
        let split = RouteNetworkChange::SegmentSplit {
            retired_segment_id: retired,
            at_node_id: Mrid::new(),
            new_segment_ids: [Mrid::new(), Mrid::new()],
        };
        assert_eq!(split.entity_id(), retired);
    }

    #[test]
    fn test_tombstones() {
        assert!(RouteNetworkChange::NodeMarkedForDeletion { node_id: Mrid::new() }.is_tombstone());
        assert!(
            RouteNetworkChange::SegmentMarkedForDeletion { segment_id: Mrid::new() }
                .is_tombstone()
        );
        assert!(!RouteNetworkChange::NodeAdded { node_id: Mrid::new() }.is_tombstone());
    }

    #[test]
    fn test_event_serialization_roundtrip() {
        let event = RouteNetworkEvent::new(RouteNetworkChange::SegmentAdded {
            segment_id: Mrid::new(),
            from_node_id: Mrid::new(),
            to_node_id: Mrid::new(),
        });
        let json = serde_json::to_string(&event).unwrap();
        let back: RouteNetworkEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
