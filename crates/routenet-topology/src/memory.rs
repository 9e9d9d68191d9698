//! In-memory geographic database
//!
//! Backs tests and embedded use. Mutations keep superseded entities around
//! with a deleted flag so retired identities stay resolvable; queries only
//! see live entities.

use crate::port::GeoDatabase;
use async_trait::async_trait;
use geo_types::{LineString, Point};
use parking_lot::RwLock;
use routenet_core::{Mrid, Result, RouteNetError, RouteNode, RouteSegment};
use routenet_geometry::predicates;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Row<T> {
    entity: T,
    deleted: bool,
}

/// In-memory [`GeoDatabase`] implementation.
#[derive(Debug, Default)]
pub struct MemoryGeoDatabase {
    nodes: RwLock<HashMap<Mrid, Row<RouteNode>>>,
    segments: RwLock<HashMap<Mrid, Row<RouteSegment>>>,
}

impl MemoryGeoDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-deleted) nodes.
    pub fn live_node_count(&self) -> usize {
        self.nodes.read().values().filter(|r| !r.deleted).count()
    }

    /// Number of live (non-deleted) segments.
    pub fn live_segment_count(&self) -> usize {
        self.segments.read().values().filter(|r| !r.deleted).count()
    }

    /// Fetch a node regardless of deletion state.
    pub fn node(&self, mrid: Mrid) -> Option<RouteNode> {
        self.nodes.read().get(&mrid).map(|r| r.entity.clone())
    }

    /// Fetch a segment regardless of deletion state.
    pub fn segment(&self, mrid: Mrid) -> Option<RouteSegment> {
        self.segments.read().get(&mrid).map(|r| r.entity.clone())
    }

    /// Whether the segment identity has been retired.
    pub fn segment_is_deleted(&self, mrid: Mrid) -> bool {
        self.segments
            .read()
            .get(&mrid)
            .map(|r| r.deleted)
            .unwrap_or(false)
    }
}

#[async_trait]
impl GeoDatabase for MemoryGeoDatabase {
    async fn nodes_intersecting_point(
        &self,
        point: &Point<f64>,
        tolerance: f64,
    ) -> Result<Vec<RouteNode>> {
        Ok(self
            .nodes
            .read()
            .values()
            .filter(|r| !r.deleted)
            .filter(|r| predicates::points_within(r.entity.geometry, *point, tolerance))
            .map(|r| r.entity.clone())
            .collect())
    }

    async fn nodes_intersecting_interior(
        &self,
        line: &LineString<f64>,
        tolerance: f64,
    ) -> Result<Vec<RouteNode>> {
        Ok(self
            .nodes
            .read()
            .values()
            .filter(|r| !r.deleted)
            .filter(|r| predicates::point_on_interior(line, r.entity.geometry, tolerance))
            .map(|r| r.entity.clone())
            .collect())
    }

    async fn segments_intersecting_point(
        &self,
        point: &Point<f64>,
        tolerance: f64,
        include_edges: bool,
    ) -> Result<Vec<RouteSegment>> {
        Ok(self
            .segments
            .read()
            .values()
            .filter(|r| !r.deleted)
            .filter(|r| {
                if include_edges {
                    predicates::point_on_line(&r.entity.geometry, *point, tolerance)
                } else {
                    predicates::point_on_interior(&r.entity.geometry, *point, tolerance)
                }
            })
            .map(|r| r.entity.clone())
            .collect())
    }

    async fn segments_intersecting_line(
        &self,
        line: &LineString<f64>,
        tolerance: f64,
        exclude: Option<Mrid>,
    ) -> Result<Vec<RouteSegment>> {
        Ok(self
            .segments
            .read()
            .values()
            .filter(|r| !r.deleted)
            .filter(|r| Some(r.entity.mrid) != exclude)
            .filter(|r| {
                line.0.iter().any(|c| {
                    predicates::point_on_line(&r.entity.geometry, Point(*c), tolerance)
                }) || r
                    .entity
                    .geometry
                    .0
                    .iter()
                    .any(|c| predicates::point_on_line(line, Point(*c), tolerance))
            })
            .map(|r| r.entity.clone())
            .collect())
    }

    async fn split_segment_geometries(
        &self,
        segment: &RouteSegment,
        at: &Point<f64>,
        tolerance: f64,
    ) -> Result<(LineString<f64>, LineString<f64>)> {
        predicates::split_line_at_point(&segment.geometry, *at, tolerance).ok_or_else(|| {
            RouteNetError::intersection_query(format!(
                "point ({}, {}) does not lie on the interior of segment {}",
                at.x(),
                at.y(),
                segment.mrid
            ))
        })
    }

    async fn insert_node(&self, node: &RouteNode) -> Result<()> {
        self.nodes.write().insert(
            node.mrid,
            Row {
                entity: node.clone(),
                deleted: false,
            },
        );
        Ok(())
    }

    async fn insert_segment(&self, segment: &RouteSegment) -> Result<()> {
        self.segments.write().insert(
            segment.mrid,
            Row {
                entity: segment.clone(),
                deleted: false,
            },
        );
        Ok(())
    }

    async fn update_node_geometry(&self, mrid: Mrid, geometry: &Point<f64>) -> Result<()> {
        let mut nodes = self.nodes.write();
        let row = nodes
            .get_mut(&mrid)
            .ok_or_else(|| RouteNetError::geo_database(format!("unknown node {mrid}")))?;
        row.entity = row.entity.with_geometry(*geometry)?;
        Ok(())
    }

    async fn update_segment_geometry(&self, mrid: Mrid, geometry: &LineString<f64>) -> Result<()> {
        let mut segments = self.segments.write();
        let row = segments
            .get_mut(&mrid)
            .ok_or_else(|| RouteNetError::geo_database(format!("unknown segment {mrid}")))?;
        row.entity = row.entity.with_geometry(geometry.clone())?;
        Ok(())
    }

    async fn mark_node_deleted(&self, mrid: Mrid) -> Result<()> {
        let mut nodes = self.nodes.write();
        let row = nodes
            .get_mut(&mrid)
            .ok_or_else(|| RouteNetError::geo_database(format!("unknown node {mrid}")))?;
        row.deleted = true;
        Ok(())
    }

    async fn mark_segment_deleted(&self, mrid: Mrid) -> Result<()> {
        let mut segments = self.segments.write();
        let row = segments
            .get_mut(&mrid)
            .ok_or_else(|| RouteNetError::geo_database(format!("unknown segment {mrid}")))?;
        row.deleted = true;
        Ok(())
    }
}
