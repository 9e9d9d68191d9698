//! Route network entities
//!
//! `RouteNode` and `RouteSegment` are immutable values: an edit never
//! mutates an entity in place, it produces a new value carrying the same
//! `Mrid`. Construction goes through factory functions that reject
//! degenerate geometry up front; tolerance-dependent rules are applied
//! separately by the geometry validator.

use crate::error::{Result, RouteNetError, ValidationRule};
use crate::mrid::Mrid;
use geo_types::{LineString, Point};

/// Attributes shared by nodes and segments, sourced from the editing tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditAttributes {
    /// Work task the edit belongs to, if any
    pub work_task_mrid: Option<Mrid>,
    /// Operator who made the edit
    pub username: Option<String>,
    /// Editing application that produced the edit
    pub application_name: Option<String>,
}

/// A point of the route network where segments can connect.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteNode {
    /// Global identity
    pub mrid: Mrid,
    /// Point geometry
    pub geometry: Point<f64>,
    /// Edit provenance
    pub attributes: EditAttributes,
}

impl RouteNode {
    /// Construct a node, rejecting non-finite coordinates.
    pub fn new(mrid: Mrid, geometry: Point<f64>, attributes: EditAttributes) -> Result<Self> {
        if !geometry.x().is_finite() || !geometry.y().is_finite() {
            return Err(RouteNetError::validation(
                ValidationRule::NonFiniteCoordinate,
                format!("route node {mrid} has a non-finite coordinate"),
            ));
        }
        Ok(Self {
            mrid,
            geometry,
            attributes,
        })
    }

    /// A copy of this node with a different geometry, same identity.
    pub fn with_geometry(&self, geometry: Point<f64>) -> Result<Self> {
        Self::new(self.mrid, geometry, self.attributes.clone())
    }
}

/// A cable route between exactly two endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    /// Global identity
    pub mrid: Mrid,
    /// Line geometry; first and last coordinate are the logical endpoints
    pub geometry: LineString<f64>,
    /// Edit provenance
    pub attributes: EditAttributes,
}

impl RouteSegment {
    /// Construct a segment, rejecting degenerate lines.
    ///
    /// A segment needs at least two coordinates and all of them finite.
    /// Simplicity, closedness and tolerance rules are the validator's job.
    pub fn new(mrid: Mrid, geometry: LineString<f64>, attributes: EditAttributes) -> Result<Self> {
        if geometry.0.len() < 2 {
            return Err(RouteNetError::validation(
                ValidationRule::IsValid,
                format!("route segment {mrid} has fewer than two coordinates"),
            ));
        }
        if geometry.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(RouteNetError::validation(
                ValidationRule::NonFiniteCoordinate,
                format!("route segment {mrid} has a non-finite coordinate"),
            ));
        }
        Ok(Self {
            mrid,
            geometry,
            attributes,
        })
    }

    /// Start point of the segment.
    pub fn start(&self) -> Point<f64> {
        Point(self.geometry.0[0])
    }

    /// End point of the segment.
    pub fn end(&self) -> Point<f64> {
        Point(self.geometry.0[self.geometry.0.len() - 1])
    }

    /// A copy of this segment with a different geometry, same identity.
    pub fn with_geometry(&self, geometry: LineString<f64>) -> Result<Self> {
        Self::new(self.mrid, geometry, self.attributes.clone())
    }
}
