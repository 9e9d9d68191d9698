//! Edit classification
//!
//! Turns one CDC envelope plus the row's shadow state into a typed edit
//! the processor can act on. The shadow is the preferred baseline for
//! update diffs; the envelope's own before-image is the fallback when the
//! row has never been seen.

use crate::envelope::{EditKind, RouteNetworkEditOperation, RouteRow};
use crate::shadow::ShadowRow;
use bytes::Bytes;
use routenet_core::{EditAttributes, Mrid, Result, RouteNetError, RouteNode, RouteSegment};
use routenet_geometry::wkb::{self, WkbGeometry};
use tracing::debug;

/// What the envelope means for the network.
#[derive(Debug, Clone, PartialEq)]
pub enum EditIntent {
    InsertNode(RouteNode),
    InsertSegment(RouteSegment),
    /// Geometry of an existing node changed
    MoveNode(RouteNode),
    /// Geometry of an existing segment changed
    MoveSegment(RouteSegment),
    /// Only attribute columns changed; refresh the shadow, no topology work
    RefreshAttributes(Mrid),
    DeleteNode(Mrid),
    DeleteSegment(Mrid),
    /// The row is byte-identical to its last known state
    Noop,
}

/// A classified envelope: the intent plus the shadow state to record once
/// the edit is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedEdit {
    pub intent: EditIntent,
    /// New shadow state; `None` for deletes (the shadow entry is removed)
    pub shadow_after: Option<ShadowRow>,
}

/// Classify one envelope against the row's last known state.
pub fn classify(
    op: &RouteNetworkEditOperation,
    shadow: Option<&ShadowRow>,
) -> Result<ClassifiedEdit> {
    match op.kind {
        EditKind::Insert => classify_insert(op),
        EditKind::Update => classify_update(op, shadow),
        EditKind::Delete => classify_delete(op, shadow),
    }
}

fn classify_insert(op: &RouteNetworkEditOperation) -> Result<ClassifiedEdit> {
    let row = op
        .after_row()?
        .ok_or_else(|| RouteNetError::codec("insert envelope without an after row"))?;
    let coord = op
        .after_coord
        .clone()
        .ok_or_else(|| RouteNetError::codec("insert envelope without an after geometry"))?;

    let intent = match entity_from(&row, &coord)? {
        Entity::Node(node) => EditIntent::InsertNode(node),
        Entity::Segment(segment) => EditIntent::InsertSegment(segment),
    };
    Ok(ClassifiedEdit {
        intent,
        shadow_after: Some(ShadowRow::from_row(&row, coord)),
    })
}

fn classify_update(
    op: &RouteNetworkEditOperation,
    shadow: Option<&ShadowRow>,
) -> Result<ClassifiedEdit> {
    let row = op
        .after_row()?
        .ok_or_else(|| RouteNetError::codec("update envelope without an after row"))?;
    let coord = op
        .after_coord
        .clone()
        .ok_or_else(|| RouteNetError::codec("update envelope without an after geometry"))?;

    // a soft-delete flag flip is a delete, whatever else changed
    if row.marked_to_be_deleted {
        return classify_tombstone(&row, &coord);
    }

    let baseline: Option<Bytes> = shadow
        .map(|s| s.coord.clone())
        .or_else(|| op.before_coord.clone());

    let geometry_changed = match &baseline {
        Some(known) => known != &coord,
        // never seen before: treat the update as carrying new geometry
        None => true,
    };

    if geometry_changed {
        let intent = match entity_from(&row, &coord)? {
            Entity::Node(node) => EditIntent::MoveNode(node),
            Entity::Segment(segment) => EditIntent::MoveSegment(segment),
        };
        return Ok(ClassifiedEdit {
            intent,
            shadow_after: Some(ShadowRow::from_row(&row, coord)),
        });
    }

    let attributes_changed = shadow.map(|s| s.attributes_differ(&row)).unwrap_or(true);
    if attributes_changed {
        debug!(mrid = %row.mrid, "attribute-only update");
        return Ok(ClassifiedEdit {
            intent: EditIntent::RefreshAttributes(row.mrid),
            shadow_after: Some(ShadowRow::from_row(&row, coord)),
        });
    }

    Ok(ClassifiedEdit {
        intent: EditIntent::Noop,
        shadow_after: None,
    })
}

fn classify_delete(
    op: &RouteNetworkEditOperation,
    shadow: Option<&ShadowRow>,
) -> Result<ClassifiedEdit> {
    let row = op
        .before_row()?
        .ok_or_else(|| RouteNetError::codec("delete envelope without a before row"))?;
    let coord = op
        .before_coord
        .clone()
        .or_else(|| shadow.map(|s| s.coord.clone()))
        .ok_or_else(|| {
            RouteNetError::codec(format!(
                "delete of {} carries no geometry and the row has no shadow",
                row.mrid
            ))
        })?;
    classify_tombstone(&row, &coord)
}

fn classify_tombstone(row: &RouteRow, coord: &Bytes) -> Result<ClassifiedEdit> {
    let intent = match wkb::decode(coord)? {
        WkbGeometry::Point(_) => EditIntent::DeleteNode(row.mrid),
        WkbGeometry::LineString(_) => EditIntent::DeleteSegment(row.mrid),
    };
    Ok(ClassifiedEdit {
        intent,
        shadow_after: None,
    })
}

enum Entity {
    Node(RouteNode),
    Segment(RouteSegment),
}

fn entity_from(row: &RouteRow, coord: &Bytes) -> Result<Entity> {
    let attributes = EditAttributes {
        work_task_mrid: row.work_task_mrid,
        username: row.username.clone(),
        application_name: row.application_name.clone(),
    };
    match wkb::decode(coord)? {
        WkbGeometry::Point(p) => Ok(Entity::Node(RouteNode::new(row.mrid, p, attributes)?)),
        WkbGeometry::LineString(l) => {
            Ok(Entity::Segment(RouteSegment::new(row.mrid, l, attributes)?))
        }
    }
}
