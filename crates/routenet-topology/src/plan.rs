//! Reconciliation plans
//!
//! The ordered set of topology changes one validated edit produces.
//! Commands carry the minted identities so downstream consumers reference
//! the same entities the database will eventually persist. A plan is pure
//! data; applying it to the store and appending its events are separate
//! steps, both all-or-nothing.

use chrono::{DateTime, Utc};
use routenet_core::{
    Mrid, RouteNetworkChange, RouteNetworkCommand, RouteNetworkEvent, RouteNode,
    RouteNodeAddedCommand, RouteSegment, RouteSegmentAddedCommand,
};
use routenet_geometry::wkb;

/// One new segment resulting from a plan, with its endpoint nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPart {
    pub segment: RouteSegment,
    pub from_node: Mrid,
    pub to_node: Mrid,
}

/// A single topology change.
#[derive(Debug, Clone, PartialEq)]
pub enum TopologyCommand {
    /// A node is added to the network
    AddNode { node: RouteNode },
    /// A segment is added between two nodes
    AddSegment {
        segment: RouteSegment,
        from_node: Mrid,
        to_node: Mrid,
    },
    /// An existing segment is replaced by two parts sharing a node; the
    /// replaced identity is retired
    SplitSegment {
        retired: RouteSegment,
        at_node: Mrid,
        parts: [SegmentPart; 2],
    },
    /// An existing node's geometry changed, identity unchanged
    MoveNode { node: RouteNode },
    /// An existing segment's geometry changed, identity unchanged
    MoveSegment {
        segment: RouteSegment,
        from_node: Mrid,
        to_node: Mrid,
    },
}

/// The full effect of one reconciled edit, in application order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationPlan {
    pub commands: Vec<TopologyCommand>,
}

impl ReconciliationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: TopologyCommand) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Number of splits in the plan.
    pub fn split_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, TopologyCommand::SplitSegment { .. }))
            .count()
    }

    /// Number of added nodes in the plan.
    pub fn added_node_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, TopologyCommand::AddNode { .. }))
            .count()
    }

    /// Domain events describing this plan, in order.
    pub fn events(&self) -> Vec<RouteNetworkEvent> {
        self.commands
            .iter()
            .map(|command| match command {
                TopologyCommand::AddNode { node } => {
                    RouteNetworkEvent::new(RouteNetworkChange::NodeAdded { node_id: node.mrid })
                }
                TopologyCommand::AddSegment {
                    segment,
                    from_node,
                    to_node,
                } => RouteNetworkEvent::new(RouteNetworkChange::SegmentAdded {
                    segment_id: segment.mrid,
                    from_node_id: *from_node,
                    to_node_id: *to_node,
                }),
                TopologyCommand::SplitSegment {
                    retired,
                    at_node,
                    parts,
                } => RouteNetworkEvent::new(RouteNetworkChange::SegmentSplit {
                    retired_segment_id: retired.mrid,
                    at_node_id: *at_node,
                    new_segment_ids: [parts[0].segment.mrid, parts[1].segment.mrid],
                }),
                TopologyCommand::MoveNode { node } => RouteNetworkEvent::new(
                    RouteNetworkChange::NodeGeometryModified { node_id: node.mrid },
                ),
                TopologyCommand::MoveSegment { segment, .. } => RouteNetworkEvent::new(
                    RouteNetworkChange::SegmentGeometryModified {
                        segment_id: segment.mrid,
                    },
                ),
            })
            .collect()
    }

    /// Outbound broker commands for this plan.
    ///
    /// All commands of the plan share `cmd_id` so consumers can correlate
    /// the full effect of the edit. A split contributes its two replacement
    /// segments.
    pub fn broker_commands(&self, cmd_id: Mrid, ts: DateTime<Utc>) -> Vec<RouteNetworkCommand> {
        let mut out = Vec::new();
        for command in &self.commands {
            match command {
                TopologyCommand::AddNode { node } => {
                    out.push(RouteNetworkCommand::NodeAdded(RouteNodeAddedCommand::new(
                        cmd_id,
                        node.mrid,
                        wkb::encode_point(&node.geometry),
                        ts,
                    )));
                }
                TopologyCommand::AddSegment {
                    segment,
                    from_node,
                    to_node,
                } => {
                    out.push(RouteNetworkCommand::SegmentAdded(
                        RouteSegmentAddedCommand::new(
                            cmd_id,
                            segment.mrid,
                            *from_node,
                            *to_node,
                            wkb::encode_line(&segment.geometry),
                            ts,
                        ),
                    ));
                }
                TopologyCommand::SplitSegment { parts, .. } => {
                    for part in parts {
                        out.push(RouteNetworkCommand::SegmentAdded(
                            RouteSegmentAddedCommand::new(
                                cmd_id,
                                part.segment.mrid,
                                part.from_node,
                                part.to_node,
                                wkb::encode_line(&part.segment.geometry),
                                ts,
                            ),
                        ));
                    }
                }
                // geometry modifications surface as domain events only;
                // the broker contract carries added entities
                TopologyCommand::MoveNode { .. } | TopologyCommand::MoveSegment { .. } => {}
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Point};
    use routenet_core::EditAttributes;

    fn node_at(x: f64, y: f64) -> RouteNode {
        RouteNode::new(Mrid::new(), Point::new(x, y), EditAttributes::default()).unwrap()
    }

    fn segment(coords: Vec<(f64, f64)>) -> RouteSegment {
        RouteSegment::new(
            Mrid::new(),
            LineString::from(coords),
            EditAttributes::default(),
        )
        .unwrap()
    }

    fn split_plan() -> (ReconciliationPlan, RouteSegment) {
        let retired = segment(vec![(0.0, 0.0), (10.0, 10.0)]);
        let node = node_at(5.0, 5.0);
        let part_a = segment(vec![(0.0, 0.0), (5.0, 5.0)]);
        let part_b = segment(vec![(5.0, 5.0), (10.0, 10.0)]);
        let mut plan = ReconciliationPlan::new();
        plan.push(TopologyCommand::AddNode { node: node.clone() });
        plan.push(TopologyCommand::SplitSegment {
            retired: retired.clone(),
            at_node: node.mrid,
            parts: [
                SegmentPart {
                    segment: part_a,
                    from_node: Mrid::new(),
                    to_node: node.mrid,
                },
                SegmentPart {
                    segment: part_b,
                    from_node: node.mrid,
                    to_node: Mrid::new(),
                },
            ],
        });
        (plan, retired)
    }

    #[test]
    fn test_split_events_retire_the_original() {
        let (plan, retired) = split_plan();
        let events = plan.events();
        assert_eq!(events.len(), 2);
        match &events[1].change {
            RouteNetworkChange::SegmentSplit {
                retired_segment_id,
                new_segment_ids,
                ..
            } => {
                assert_eq!(*retired_segment_id, retired.mrid);
                assert_ne!(new_segment_ids[0], new_segment_ids[1]);
            }
            other => panic!("expected split, got {other:?}"),
        }
    }

    #[test]
    fn test_split_produces_two_segment_commands() {
        let (plan, _) = split_plan();
        let cmd_id = Mrid::new();
        let commands = plan.broker_commands(cmd_id, Utc::now());
        assert_eq!(commands.len(), 3); // one node, two replacement segments
        assert!(commands.iter().all(|c| c.cmd_id() == cmd_id));
        let segments = commands
            .iter()
            .filter(|c| c.event_type() == "RouteSegmentAddedCommand")
            .count();
        assert_eq!(segments, 2);
    }

    #[test]
    fn test_plan_counts() {
        let (plan, _) = split_plan();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.split_count(), 1);
        assert_eq!(plan.added_node_count(), 1);
        assert!(!plan.is_empty());
    }
}
