//! Geographic database port
//!
//! Read and mutation access to the authoritative network topology. The port
//! performs no locking of its own; cross-edit consistency comes from the
//! concurrency gate around each reconciliation plus per-stream optimistic
//! versioning on append.

use async_trait::async_trait;
use geo_types::{LineString, Point};
use routenet_core::{Mrid, Result, RouteNode, RouteSegment};

/// Spatial queries and mutations against the authoritative topology store.
#[async_trait]
pub trait GeoDatabase: Send + Sync {
    /// Nodes whose location coincides with the point within the tolerance.
    async fn nodes_intersecting_point(
        &self,
        point: &Point<f64>,
        tolerance: f64,
    ) -> Result<Vec<RouteNode>>;

    /// Nodes lying on the line's interior, excluding its two endpoints.
    ///
    /// Distinct from the endpoint queries: a node touching the line at an
    /// endpoint connects to it, a node on the interior splits it.
    async fn nodes_intersecting_interior(
        &self,
        line: &LineString<f64>,
        tolerance: f64,
    ) -> Result<Vec<RouteNode>>;

    /// Segments passing through the point.
    ///
    /// With `include_edges` the result also contains segments whose
    /// endpoint (edge) coincides with the point; without it only segments
    /// crossed on their interior are returned.
    async fn segments_intersecting_point(
        &self,
        point: &Point<f64>,
        tolerance: f64,
        include_edges: bool,
    ) -> Result<Vec<RouteSegment>>;

    /// Segments intersecting the line, optionally excluding one segment
    /// (the segment being updated must not collide with itself).
    async fn segments_intersecting_line(
        &self,
        line: &LineString<f64>,
        tolerance: f64,
        exclude: Option<Mrid>,
    ) -> Result<Vec<RouteSegment>>;

    /// The two geometries an existing segment divides into at a node
    /// location on its interior. The tolerance bounds the snap of the split
    /// point onto the line.
    async fn split_segment_geometries(
        &self,
        segment: &RouteSegment,
        at: &Point<f64>,
        tolerance: f64,
    ) -> Result<(LineString<f64>, LineString<f64>)>;

    /// Persist a new node.
    async fn insert_node(&self, node: &RouteNode) -> Result<()>;

    /// Persist a new segment.
    async fn insert_segment(&self, segment: &RouteSegment) -> Result<()>;

    /// Replace a node's geometry.
    async fn update_node_geometry(&self, mrid: Mrid, geometry: &Point<f64>) -> Result<()>;

    /// Replace a segment's geometry.
    async fn update_segment_geometry(&self, mrid: Mrid, geometry: &LineString<f64>) -> Result<()>;

    /// Mark a node superseded/deleted; its identity is retired, not reused.
    async fn mark_node_deleted(&self, mrid: Mrid) -> Result<()>;

    /// Mark a segment superseded/deleted; its identity is retired, not reused.
    async fn mark_segment_deleted(&self, mrid: Mrid) -> Result<()>;
}
