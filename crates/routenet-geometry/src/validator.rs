//! Geometry validation rules
//!
//! Stateless predicates applied to every edited geometry before any
//! topology work. Ordinary invalidity is a rejected result carrying the
//! rule name, never a panic; the rejection is logged once at the decision
//! point and the message is dropped from further processing (retrying an
//! unchanged invalid input cannot succeed).

use crate::predicates;
use geo_types::{LineString, Point};
use routenet_core::{Result, RouteNetError, ValidationRule};
use tracing::warn;

/// Validator for edited route geometries.
#[derive(Debug, Clone, Copy)]
pub struct GeometryValidator {
    tolerance: f64,
}

impl GeometryValidator {
    /// Create a validator for the configured tolerance.
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// The tolerance this validator applies.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Check a node geometry, reporting the violated rule on rejection.
    pub fn check_point(&self, point: &Point<f64>) -> Result<()> {
        if !point.x().is_finite() || !point.y().is_finite() {
            return reject(
                ValidationRule::NonFiniteCoordinate,
                format!("point ({}, {}) has a non-finite coordinate", point.x(), point.y()),
            );
        }
        Ok(())
    }

    /// `true` when the point passes all rules.
    pub fn point_is_valid(&self, point: &Point<f64>) -> bool {
        self.check_point(point).is_ok()
    }

    /// Check a segment geometry, reporting the violated rule on rejection.
    ///
    /// Rules are applied in a fixed order; the first violation wins:
    /// `IsValid`, `IsSimple`, `IsClosed`,
    /// `EndsCloserToEachOtherThanTolerance`,
    /// `EndsCloserToTheEdgeThanTolerance`.
    pub fn check_line(&self, line: &LineString<f64>) -> Result<()> {
        if line.0.len() < 2 {
            return reject(
                ValidationRule::IsValid,
                format!("line has {} coordinates, need at least 2", line.0.len()),
            );
        }
        if line.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return reject(ValidationRule::IsValid, "line has a non-finite coordinate");
        }

        if !predicates::is_simple(line) {
            return reject(ValidationRule::IsSimple, "line intersects itself");
        }

        if predicates::is_closed(line) {
            return reject(
                ValidationRule::IsClosed,
                "line starts and ends in the same coordinate",
            );
        }

        let ends = predicates::endpoint_distance(line);
        if ends < self.tolerance {
            return reject(
                ValidationRule::EndsCloserToEachOtherThanTolerance,
                format!(
                    "endpoints are {ends} apart, tolerance is {}",
                    self.tolerance
                ),
            );
        }

        if predicates::self_snap(line, self.tolerance) != *line {
            return reject(
                ValidationRule::EndsCloserToTheEdgeThanTolerance,
                "snapping the line to itself at the tolerance changes the geometry",
            );
        }

        Ok(())
    }

    /// `true` when the line passes all rules.
    pub fn line_is_valid(&self, line: &LineString<f64>) -> bool {
        self.check_line(line).is_ok()
    }
}

fn reject(rule: ValidationRule, detail: impl Into<String>) -> Result<()> {
    let detail = detail.into();
    warn!(rule = %rule, %detail, "geometry rejected");
    Err(RouteNetError::validation(rule, detail))
}
