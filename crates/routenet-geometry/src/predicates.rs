//! Geometric predicates
//!
//! Tolerance-aware helpers over `geo-types` shapes. All predicates are pure
//! and synchronous; nothing here suspends or touches a port.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo_types::{Coord, Line, LineString, Point};

/// Euclidean distance between two coordinates.
pub fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Two points coincide within the tolerance.
pub fn points_within(a: Point<f64>, b: Point<f64>, tolerance: f64) -> bool {
    distance(a.0, b.0) < tolerance
}

/// First and last coordinate are identical.
pub fn is_closed(line: &LineString<f64>) -> bool {
    line.0.first() == line.0.last()
}

/// Distance between the line's two logical endpoints.
pub fn endpoint_distance(line: &LineString<f64>) -> f64 {
    match (line.0.first(), line.0.last()) {
        (Some(a), Some(b)) => distance(*a, *b),
        _ => 0.0,
    }
}

/// The line does not intersect itself.
///
/// Adjacent segments share exactly one endpoint, and a closed line's first
/// and last segments share the closure point; any other contact between
/// two segments of the same line (a proper crossing, a touch away from the
/// shared vertex, or a collinear overlap) makes the line non-simple.
/// Closedness itself is a separate rule.
pub fn is_simple(line: &LineString<f64>) -> bool {
    let segments: Vec<Line<f64>> = line.lines().collect();
    let closed = is_closed(line);
    for i in 0..segments.len() {
        for j in (i + 1)..segments.len() {
            let shared_vertex = if j == i + 1 {
                Some(segments[i].end)
            } else if closed && i == 0 && j == segments.len() - 1 {
                Some(segments[i].start)
            } else {
                None
            };
            match line_intersection(segments[i], segments[j]) {
                None => {}
                Some(LineIntersection::SinglePoint {
                    intersection,
                    is_proper,
                }) => match shared_vertex {
                    // the shared vertex is expected; anything else is not
                    Some(vertex) => {
                        if is_proper || intersection != vertex {
                            return false;
                        }
                    }
                    None => return false,
                },
                Some(LineIntersection::Collinear { .. }) => return false,
            }
        }
    }
    true
}

/// Collapse vertices closer than the tolerance to their predecessor.
///
/// Endpoints are preserved exactly: trailing vertices inside the snap radius
/// of the final endpoint collapse into it rather than displacing it. A line
/// is clean under the configured tolerance iff `self_snap(line, tol) == line`.
pub fn self_snap(line: &LineString<f64>, tolerance: f64) -> LineString<f64> {
    let coords = &line.0;
    if coords.len() <= 2 {
        return line.clone();
    }
    let mut kept: Vec<Coord<f64>> = vec![coords[0]];
    for c in &coords[1..coords.len() - 1] {
        if distance(*kept.last().expect("kept is non-empty"), *c) >= tolerance {
            kept.push(*c);
        }
    }
    let last = coords[coords.len() - 1];
    while kept.len() > 1 && distance(*kept.last().expect("kept is non-empty"), last) < tolerance {
        kept.pop();
    }
    kept.push(last);
    LineString::from(kept)
}

/// Closest point on a segment and the projection parameter in [0, 1].
fn project_on_segment(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> (Coord<f64>, f64) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0)
    };
    (
        Coord {
            x: a.x + t * dx,
            y: a.y + t * dy,
        },
        t,
    )
}

/// Distance from a point to the nearest point on the line.
pub fn distance_to_line(line: &LineString<f64>, p: Point<f64>) -> f64 {
    line.lines()
        .map(|seg| distance(project_on_segment(seg.start, seg.end, p.0).0, p.0))
        .fold(f64::INFINITY, f64::min)
}

/// The point lies on the line within the tolerance.
pub fn point_on_line(line: &LineString<f64>, p: Point<f64>, tolerance: f64) -> bool {
    distance_to_line(line, p) < tolerance
}

/// The point coincides with one of the line's two logical endpoints.
pub fn point_on_endpoint(line: &LineString<f64>, p: Point<f64>, tolerance: f64) -> bool {
    let start = Point(line.0[0]);
    let end = Point(line.0[line.0.len() - 1]);
    points_within(start, p, tolerance) || points_within(end, p, tolerance)
}

/// The point lies on the line's interior: on the line but on neither endpoint.
pub fn point_on_interior(line: &LineString<f64>, p: Point<f64>, tolerance: f64) -> bool {
    point_on_line(line, p, tolerance) && !point_on_endpoint(line, p, tolerance)
}

/// Arc-length position along the line of the point's closest projection.
pub fn position_along(line: &LineString<f64>, p: Point<f64>) -> f64 {
    let mut best_dist = f64::INFINITY;
    let mut best_pos = 0.0;
    let mut walked = 0.0;
    for seg in line.lines() {
        let (proj, t) = project_on_segment(seg.start, seg.end, p.0);
        let d = distance(proj, p.0);
        let seg_len = distance(seg.start, seg.end);
        if d < best_dist {
            best_dist = d;
            best_pos = walked + t * seg_len;
        }
        walked += seg_len;
    }
    best_pos
}

/// Split a line at a point on its interior.
///
/// Both halves start/end exactly in the split point so the two new segments
/// share it as a common endpoint. Returns `None` when the point is not on
/// the interior (off the line, or coinciding with an endpoint).
pub fn split_line_at_point(
    line: &LineString<f64>,
    p: Point<f64>,
    tolerance: f64,
) -> Option<(LineString<f64>, LineString<f64>)> {
    if !point_on_interior(line, p, tolerance) {
        return None;
    }

    let mut best: Option<(usize, Coord<f64>, f64)> = None;
    for (i, seg) in line.lines().enumerate() {
        let (proj, _) = project_on_segment(seg.start, seg.end, p.0);
        let d = distance(proj, p.0);
        if best.as_ref().map(|(_, _, bd)| d < *bd).unwrap_or(true) {
            best = Some((i, proj, d));
        }
    }
    let (seg_idx, _, _) = best?;
    let split_at = p.0;

    let mut first: Vec<Coord<f64>> = line.0[..=seg_idx]
        .iter()
        .copied()
        .filter(|c| distance(*c, split_at) >= tolerance)
        .collect();
    first.push(split_at);

    let mut second: Vec<Coord<f64>> = vec![split_at];
    second.extend(
        line.0[seg_idx + 1..]
            .iter()
            .copied()
            .filter(|c| distance(*c, split_at) >= tolerance),
    );

    if first.len() < 2 || second.len() < 2 {
        return None;
    }
    Some((LineString::from(first), LineString::from(second)))
}
