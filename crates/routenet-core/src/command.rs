//! Outbound broker commands
//!
//! Wire representation of the commands published to the
//! `event.route-network` topic. Field names are PascalCase on the wire, as
//! consumed by the downstream network service.

use crate::mrid::Mrid;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Topic all route network commands are published to.
pub const ROUTE_NETWORK_TOPIC: &str = "event.route-network";

/// Announces a node added to the route network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteNodeAddedCommand {
    /// Always `"RouteNodeAddedCommand"`
    pub event_type: String,
    pub event_id: Mrid,
    pub event_ts: DateTime<Utc>,
    pub cmd_id: Mrid,
    pub node_id: Mrid,
    /// Binary-encoded point geometry
    pub geometry: Bytes,
}

impl RouteNodeAddedCommand {
    pub fn new(cmd_id: Mrid, node_id: Mrid, geometry: Bytes, event_ts: DateTime<Utc>) -> Self {
        Self {
            event_type: "RouteNodeAddedCommand".to_string(),
            event_id: Mrid::new(),
            event_ts,
            cmd_id,
            node_id,
            geometry,
        }
    }
}

/// Announces a segment added between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteSegmentAddedCommand {
    /// Always `"RouteSegmentAddedCommand"`
    pub event_type: String,
    pub event_id: Mrid,
    pub event_ts: DateTime<Utc>,
    pub cmd_id: Mrid,
    pub segment_id: Mrid,
    pub from_node_id: Mrid,
    pub to_node_id: Mrid,
    /// Binary-encoded line geometry
    pub geometry: Bytes,
}

impl RouteSegmentAddedCommand {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cmd_id: Mrid,
        segment_id: Mrid,
        from_node_id: Mrid,
        to_node_id: Mrid,
        geometry: Bytes,
        event_ts: DateTime<Utc>,
    ) -> Self {
        Self {
            event_type: "RouteSegmentAddedCommand".to_string(),
            event_id: Mrid::new(),
            event_ts,
            cmd_id,
            segment_id,
            from_node_id,
            to_node_id,
            geometry,
        }
    }
}

/// A command ready for publication.
///
/// Commands produced by one reconciliation share a `cmd_id` so consumers can
/// correlate the full effect of a single edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteNetworkCommand {
    NodeAdded(RouteNodeAddedCommand),
    SegmentAdded(RouteSegmentAddedCommand),
}

impl RouteNetworkCommand {
    /// The wire-level event type discriminator.
    pub fn event_type(&self) -> &str {
        match self {
            Self::NodeAdded(c) => &c.event_type,
            Self::SegmentAdded(c) => &c.event_type,
        }
    }

    /// The correlation id shared by all commands of one edit.
    pub fn cmd_id(&self) -> Mrid {
        match self {
            Self::NodeAdded(c) => c.cmd_id,
            Self::SegmentAdded(c) => c.cmd_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_command_wire_format() {
        let cmd = RouteNodeAddedCommand::new(
            Mrid::new(),
            Mrid::new(),
            Bytes::from_static(&[1, 1, 0, 0, 0]),
            Utc::now(),
        );
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"EventType\":\"RouteNodeAddedCommand\""));
        assert!(json.contains("\"NodeId\""));
        assert!(json.contains("\"CmdId\""));
    }

    #[test]
    fn test_segment_command_wire_format() {
        let cmd = RouteSegmentAddedCommand::new(
            Mrid::new(),
            Mrid::new(),
            Mrid::new(),
            Mrid::new(),
            Bytes::from_static(&[1, 2, 0, 0, 0]),
            Utc::now(),
        );
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"EventType\":\"RouteSegmentAddedCommand\""));
        assert!(json.contains("\"FromNodeId\""));
        assert!(json.contains("\"ToNodeId\""));
    }

    #[test]
    fn test_commands_of_one_edit_share_cmd_id() {
        let cmd_id = Mrid::new();
        let a = RouteNetworkCommand::NodeAdded(RouteNodeAddedCommand::new(
            cmd_id,
            Mrid::new(),
            Bytes::new(),
            Utc::now(),
        ));
        let b = RouteNetworkCommand::SegmentAdded(RouteSegmentAddedCommand::new(
            cmd_id,
            Mrid::new(),
            Mrid::new(),
            Mrid::new(),
            Bytes::new(),
            Utc::now(),
        ));
        assert_eq!(a.cmd_id(), b.cmd_id());
        assert_ne!(a.event_type(), b.event_type());
    }
}
