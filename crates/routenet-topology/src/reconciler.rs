//! Topology reconciliation
//!
//! Turns one validated geometric edit into the set of topology changes the
//! network needs: new nodes, new segments, and splits of existing segments.
//! Planning is pure - the reconciler reads through the [`GeoDatabase`] port
//! and produces a [`ReconciliationPlan`]; persistence happens separately in
//! [`TopologyReconciler::apply`]. A port failure during planning aborts the
//! reconciliation with zero commands.
//!
//! The single most important rule is the edge-vs-interior tie-break: an
//! intersection within tolerance of an existing segment's endpoint is a
//! touch and produces no split; an intersection strictly inside the span
//! replaces the segment with two parts sharing the intersecting node.

use crate::plan::{ReconciliationPlan, SegmentPart, TopologyCommand};
use crate::port::GeoDatabase;
use geo_types::Point;
use routenet_core::{
    EditAttributes, Mrid, ReconciliationConfig, Result, RouteNode, RouteSegment,
};
use routenet_geometry::predicates;
use std::sync::Arc;
use tracing::debug;

/// Plans topology changes for edited nodes and segments.
pub struct TopologyReconciler {
    gdb: Arc<dyn GeoDatabase>,
    config: ReconciliationConfig,
}

impl TopologyReconciler {
    pub fn new(gdb: Arc<dyn GeoDatabase>, config: ReconciliationConfig) -> Self {
        Self { gdb, config }
    }

    /// Plan the changes a new or moved node requires.
    ///
    /// A coincident live node is reused rather than duplicated. Every
    /// segment whose interior passes through the node's location is split;
    /// segments touching at an endpoint are left alone.
    pub async fn reconcile_node(&self, node: &RouteNode) -> Result<ReconciliationPlan> {
        let tol = self.config.tolerance;
        let mut plan = ReconciliationPlan::new();

        let existing = self
            .gdb
            .nodes_intersecting_point(&node.geometry, tol)
            .await?;
        let node_id = if let Some(hit) = existing.first() {
            debug!(mrid = %hit.mrid, "coincident node exists, reusing");
            hit.mrid
        } else {
            plan.push(TopologyCommand::AddNode { node: node.clone() });
            node.mrid
        };

        let crossed = self
            .gdb
            .segments_intersecting_point(&node.geometry, tol, true)
            .await?;
        for seg in crossed {
            if predicates::point_on_endpoint(&seg.geometry, node.geometry, tol) {
                debug!(segment = %seg.mrid, "node touches segment endpoint, no split");
                continue;
            }
            let split = self
                .plan_split(&mut plan, &seg, node.geometry, node_id)
                .await?;
            plan.push(split);
        }

        Ok(plan)
    }

    /// Plan the changes a new or redrawn segment requires.
    ///
    /// The three endpoint/interior query shapes are distinct on purpose: a
    /// node at the segment's start or end becomes its connection point
    /// (optionally snapping the drawn endpoint onto the node), while a node
    /// on the drawn interior subdivides the segment into chained parts.
    /// When updating an existing segment, `exclude` keeps it from
    /// colliding with itself.
    pub async fn reconcile_segment(
        &self,
        segment: &RouteSegment,
        exclude: Option<Mrid>,
    ) -> Result<ReconciliationPlan> {
        let tol = self.config.tolerance;
        let mut plan = ReconciliationPlan::new();

        let start_hits = self
            .gdb
            .nodes_intersecting_point(&segment.start(), tol)
            .await?;
        let end_hits = self
            .gdb
            .nodes_intersecting_point(&segment.end(), tol)
            .await?;

        let mut geometry = segment.geometry.clone();
        if self.config.enable_segment_ends_auto_snapping_to_route_node {
            if let Some(hit) = start_hits.first() {
                geometry.0[0] = hit.geometry.0;
            }
            if let Some(hit) = end_hits.first() {
                let last = geometry.0.len() - 1;
                geometry.0[last] = hit.geometry.0;
            }
        }
        let working = segment.with_geometry(geometry)?;

        let from_node = match start_hits.first() {
            Some(hit) => hit.mrid,
            None => self
                .mint_node(&mut plan, working.start(), &segment.attributes)?
                .mrid,
        };
        let to_node = match end_hits.first() {
            Some(hit) => hit.mrid,
            None => self
                .mint_node(&mut plan, working.end(), &segment.attributes)?
                .mrid,
        };

        let mut interior = self
            .gdb
            .nodes_intersecting_interior(&working.geometry, tol)
            .await?;
        interior.sort_by(|a, b| {
            let pa = predicates::position_along(&working.geometry, a.geometry);
            let pb = predicates::position_along(&working.geometry, b.geometry);
            pa.partial_cmp(&pb).unwrap_or(std::cmp::Ordering::Equal)
        });

        if interior.is_empty() {
            plan.push(TopologyCommand::AddSegment {
                segment: working.clone(),
                from_node,
                to_node,
            });
        } else {
            // the drawn identity is not persisted once subdivided; every
            // part gets a minted identity
            let mut remaining = working.geometry.clone();
            let mut prev_node = from_node;
            for hit in &interior {
                match predicates::split_line_at_point(&remaining, hit.geometry, tol) {
                    Some((head, tail)) => {
                        let part =
                            RouteSegment::new(Mrid::new(), head, segment.attributes.clone())?;
                        plan.push(TopologyCommand::AddSegment {
                            segment: part,
                            from_node: prev_node,
                            to_node: hit.mrid,
                        });
                        prev_node = hit.mrid;
                        remaining = tail;
                    }
                    None => {
                        debug!(node = %hit.mrid, "interior node collapsed into an earlier part boundary");
                    }
                }
            }
            let last = RouteSegment::new(Mrid::new(), remaining, segment.attributes.clone())?;
            plan.push(TopologyCommand::AddSegment {
                segment: last,
                from_node: prev_node,
                to_node,
            });
        }

        let crossed = self
            .gdb
            .segments_intersecting_line(&working.geometry, tol, exclude)
            .await?;
        for seg in crossed {
            for (endpoint, endpoint_node) in
                [(working.start(), from_node), (working.end(), to_node)]
            {
                if predicates::point_on_interior(&seg.geometry, endpoint, tol) {
                    let split = self
                        .plan_split(&mut plan, &seg, endpoint, endpoint_node)
                        .await?;
                    plan.push(split);
                    // one split per crossed segment per plan; a second
                    // endpoint on the same segment resolves on its own edit
                    break;
                }
            }
        }

        Ok(plan)
    }

    /// Plan the changes a node whose geometry moved requires.
    ///
    /// The identity already exists, so nothing is minted or reused for the
    /// node itself; segments crossed at the new location are split exactly
    /// as for a new node.
    pub async fn reconcile_moved_node(&self, node: &RouteNode) -> Result<ReconciliationPlan> {
        let tol = self.config.tolerance;
        let mut plan = ReconciliationPlan::new();
        plan.push(TopologyCommand::MoveNode { node: node.clone() });

        let crossed = self
            .gdb
            .segments_intersecting_point(&node.geometry, tol, true)
            .await?;
        for seg in crossed {
            if predicates::point_on_endpoint(&seg.geometry, node.geometry, tol) {
                continue;
            }
            let split = self
                .plan_split(&mut plan, &seg, node.geometry, node.mrid)
                .await?;
            plan.push(split);
        }
        Ok(plan)
    }

    /// Plan the changes a segment whose geometry moved requires.
    ///
    /// The redrawn geometry keeps its identity; its endpoints re-resolve
    /// against the network (minting nodes where none exist) and splits of
    /// other segments are planned where the new endpoints land on their
    /// interiors. The segment itself is excluded from collision queries.
    pub async fn reconcile_moved_segment(
        &self,
        segment: &RouteSegment,
    ) -> Result<ReconciliationPlan> {
        let tol = self.config.tolerance;
        let mut plan = ReconciliationPlan::new();

        let start_hits = self
            .gdb
            .nodes_intersecting_point(&segment.start(), tol)
            .await?;
        let end_hits = self
            .gdb
            .nodes_intersecting_point(&segment.end(), tol)
            .await?;

        let mut geometry = segment.geometry.clone();
        if self.config.enable_segment_ends_auto_snapping_to_route_node {
            if let Some(hit) = start_hits.first() {
                geometry.0[0] = hit.geometry.0;
            }
            if let Some(hit) = end_hits.first() {
                let last = geometry.0.len() - 1;
                geometry.0[last] = hit.geometry.0;
            }
        }
        let working = segment.with_geometry(geometry)?;

        let from_node = match start_hits.first() {
            Some(hit) => hit.mrid,
            None => self
                .mint_node(&mut plan, working.start(), &segment.attributes)?
                .mrid,
        };
        let to_node = match end_hits.first() {
            Some(hit) => hit.mrid,
            None => self
                .mint_node(&mut plan, working.end(), &segment.attributes)?
                .mrid,
        };

        plan.push(TopologyCommand::MoveSegment {
            segment: working.clone(),
            from_node,
            to_node,
        });

        let crossed = self
            .gdb
            .segments_intersecting_line(&working.geometry, tol, Some(segment.mrid))
            .await?;
        for seg in crossed {
            for (endpoint, endpoint_node) in
                [(working.start(), from_node), (working.end(), to_node)]
            {
                if predicates::point_on_interior(&seg.geometry, endpoint, tol) {
                    let split = self
                        .plan_split(&mut plan, &seg, endpoint, endpoint_node)
                        .await?;
                    plan.push(split);
                    break;
                }
            }
        }
        Ok(plan)
    }

    /// Persist a plan through the port, in plan order.
    pub async fn apply(&self, plan: &ReconciliationPlan) -> Result<()> {
        for command in &plan.commands {
            match command {
                TopologyCommand::AddNode { node } => self.gdb.insert_node(node).await?,
                TopologyCommand::AddSegment { segment, .. } => {
                    self.gdb.insert_segment(segment).await?
                }
                TopologyCommand::SplitSegment { retired, parts, .. } => {
                    self.gdb.mark_segment_deleted(retired.mrid).await?;
                    self.gdb.insert_segment(&parts[0].segment).await?;
                    self.gdb.insert_segment(&parts[1].segment).await?;
                }
                TopologyCommand::MoveNode { node } => {
                    self.gdb
                        .update_node_geometry(node.mrid, &node.geometry)
                        .await?
                }
                TopologyCommand::MoveSegment { segment, .. } => {
                    self.gdb
                        .update_segment_geometry(segment.mrid, &segment.geometry)
                        .await?
                }
            }
        }
        Ok(())
    }

    /// Plan the replacement of `seg` by two parts meeting in `at_node`.
    async fn plan_split(
        &self,
        plan: &mut ReconciliationPlan,
        seg: &RouteSegment,
        at: Point<f64>,
        at_node: Mrid,
    ) -> Result<TopologyCommand> {
        let tol = self.config.tolerance;
        let (head, tail) = self.gdb.split_segment_geometries(seg, &at, tol).await?;

        let from = self
            .resolve_or_mint_node(plan, seg.start(), &seg.attributes)
            .await?;
        let to = self
            .resolve_or_mint_node(plan, seg.end(), &seg.attributes)
            .await?;

        let part_head = RouteSegment::new(Mrid::new(), head, seg.attributes.clone())?;
        let part_tail = RouteSegment::new(Mrid::new(), tail, seg.attributes.clone())?;

        debug!(
            retired = %seg.mrid,
            head = %part_head.mrid,
            tail = %part_tail.mrid,
            "segment split planned"
        );

        Ok(TopologyCommand::SplitSegment {
            retired: seg.clone(),
            at_node,
            parts: [
                SegmentPart {
                    segment: part_head,
                    from_node: from,
                    to_node: at_node,
                },
                SegmentPart {
                    segment: part_tail,
                    from_node: at_node,
                    to_node: to,
                },
            ],
        })
    }

    /// Node id at the location: a node this plan already adds, a live node
    /// from the store, or a freshly minted one.
    async fn resolve_or_mint_node(
        &self,
        plan: &mut ReconciliationPlan,
        at: Point<f64>,
        attributes: &EditAttributes,
    ) -> Result<Mrid> {
        let tol = self.config.tolerance;
        for command in &plan.commands {
            if let TopologyCommand::AddNode { node } = command {
                if predicates::points_within(node.geometry, at, tol) {
                    return Ok(node.mrid);
                }
            }
        }
        let existing = self.gdb.nodes_intersecting_point(&at, tol).await?;
        if let Some(hit) = existing.first() {
            return Ok(hit.mrid);
        }
        Ok(self.mint_node(plan, at, attributes)?.mrid)
    }

    fn mint_node(
        &self,
        plan: &mut ReconciliationPlan,
        at: Point<f64>,
        attributes: &EditAttributes,
    ) -> Result<RouteNode> {
        let node = RouteNode::new(Mrid::new(), at, attributes.clone())?;
        plan.push(TopologyCommand::AddNode { node: node.clone() });
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGeoDatabase;
    use geo_types::LineString;
    use routenet_core::RouteNetworkChange;

    fn config(tolerance: f64) -> ReconciliationConfig {
        ReconciliationConfig::builder()
            .tolerance(tolerance)
            .build()
            .unwrap()
    }

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

    /// Seed a segment together with its endpoint nodes, the normal state of
    /// a consistent network.
    async fn seed_connected_segment(
        db: &MemoryGeoDatabase,
        coords: Vec<(f64, f64)>,
    ) -> RouteSegment {
        let seg = segment(coords);
        db.insert_node(&RouteNode::new(Mrid::new(), seg.start(), EditAttributes::default()).unwrap())
            .await
            .unwrap();
        db.insert_node(&RouteNode::new(Mrid::new(), seg.end(), EditAttributes::default()).unwrap())
            .await
            .unwrap();
        db.insert_segment(&seg).await.unwrap();
        seg
    }

    #[tokio::test]
    async fn test_node_on_interior_produces_exactly_one_split() {
        let db = Arc::new(MemoryGeoDatabase::new());
        let seg = seed_connected_segment(&db, vec![(0.0, 0.0), (10.0, 10.0)]).await;

        let reconciler = TopologyReconciler::new(db.clone(), config(0.1));
        let node = node_at(5.0, 5.0);
        let plan = reconciler.reconcile_node(&node).await.unwrap();

        assert_eq!(plan.split_count(), 1);
        assert_eq!(plan.added_node_count(), 1); // only the new node, no duplicates

        let split = plan
            .commands
            .iter()
            .find_map(|c| match c {
                TopologyCommand::SplitSegment { retired, parts, .. } => {
                    Some((retired.clone(), parts.clone()))
                }
                _ => None,
            })
            .expect("plan contains a split");
        let (retired, parts) = split;
        assert_eq!(retired.mrid, seg.mrid);
        assert_eq!(parts[0].segment.end(), Point::new(5.0, 5.0));
        assert_eq!(parts[1].segment.start(), Point::new(5.0, 5.0));
        assert_eq!(parts[0].segment.start(), Point::new(0.0, 0.0));
        assert_eq!(parts[1].segment.end(), Point::new(10.0, 10.0));

        // the split event retires the original identity
        let events = plan.events();
        assert!(events.iter().any(|e| matches!(
            &e.change,
            RouteNetworkChange::SegmentSplit { retired_segment_id, .. }
                if *retired_segment_id == seg.mrid
        )));
    }

    #[tokio::test]
    async fn test_node_at_endpoint_produces_no_split() {
        let db = Arc::new(MemoryGeoDatabase::new());
        seed_connected_segment(&db, vec![(0.0, 0.0), (10.0, 10.0)]).await;

        let reconciler = TopologyReconciler::new(db.clone(), config(0.1));
        let plan = reconciler
            .reconcile_node(&node_at(0.0, 0.0))
            .await
            .unwrap();
        assert_eq!(plan.split_count(), 0);
        // the coincident endpoint node is reused, not duplicated
        assert_eq!(plan.added_node_count(), 0);
    }

    #[tokio::test]
    async fn test_node_within_tolerance_of_endpoint_is_a_touch() {
        let db = Arc::new(MemoryGeoDatabase::new());
        seed_connected_segment(&db, vec![(0.0, 0.0), (10.0, 10.0)]).await;

        let reconciler = TopologyReconciler::new(db.clone(), config(0.1));
        let plan = reconciler
            .reconcile_node(&node_at(0.05, 0.05))
            .await
            .unwrap();
        assert_eq!(plan.split_count(), 0);
    }

    #[tokio::test]
    async fn test_new_segment_in_empty_network() {
        let db = Arc::new(MemoryGeoDatabase::new());
        let reconciler = TopologyReconciler::new(db.clone(), config(0.1));

        let seg = segment(vec![(0.0, 0.0), (10.0, 10.0)]);
        let plan = reconciler.reconcile_segment(&seg, None).await.unwrap();

        assert_eq!(plan.added_node_count(), 2); // both endpoints minted
        assert_eq!(plan.split_count(), 0);
        let added = plan
            .commands
            .iter()
            .filter_map(|c| match c {
                TopologyCommand::AddSegment { segment, .. } => Some(segment.mrid),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(added, vec![seg.mrid]); // identity preserved when unsplit
    }

    #[tokio::test]
    async fn test_segment_end_snaps_to_existing_node() {
        let db = Arc::new(MemoryGeoDatabase::new());
        let anchor = node_at(10.05, 10.0);
        db.insert_node(&anchor).await.unwrap();

        let reconciler = TopologyReconciler::new(db.clone(), config(0.1));
        let seg = segment(vec![(0.0, 0.0), (10.0, 10.0)]);
        let plan = reconciler.reconcile_segment(&seg, None).await.unwrap();

        let (added, to_node) = plan
            .commands
            .iter()
            .find_map(|c| match c {
                TopologyCommand::AddSegment {
                    segment, to_node, ..
                } => Some((segment.clone(), *to_node)),
                _ => None,
            })
            .expect("segment added");
        assert_eq!(to_node, anchor.mrid);
        assert_eq!(added.end(), anchor.geometry); // endpoint snapped onto the node
        assert_eq!(plan.added_node_count(), 1); // only the start node minted
    }

    #[tokio::test]
    async fn test_segment_through_existing_node_is_chained() {
        let db = Arc::new(MemoryGeoDatabase::new());
        let mid = node_at(5.0, 5.0);
        db.insert_node(&mid).await.unwrap();

        let reconciler = TopologyReconciler::new(db.clone(), config(0.1));
        let seg = segment(vec![(0.0, 0.0), (10.0, 10.0)]);
        let plan = reconciler.reconcile_segment(&seg, None).await.unwrap();

        let parts: Vec<(Mrid, Mrid)> = plan
            .commands
            .iter()
            .filter_map(|c| match c {
                TopologyCommand::AddSegment {
                    from_node, to_node, ..
                } => Some((*from_node, *to_node)),
                _ => None,
            })
            .collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].1, mid.mrid); // first part ends in the existing node
        assert_eq!(parts[1].0, mid.mrid); // second part starts there
        assert_eq!(plan.added_node_count(), 2); // endpoints only, mid reused
    }

    #[tokio::test]
    async fn test_segment_endpoint_on_existing_interior_splits_it() {
        let db = Arc::new(MemoryGeoDatabase::new());
        let existing = seed_connected_segment(&db, vec![(0.0, 10.0), (10.0, 10.0)]).await;

        let reconciler = TopologyReconciler::new(db.clone(), config(0.1));
        // drawn segment ends in the middle of the existing horizontal one
        let seg = segment(vec![(5.0, 0.0), (5.0, 10.0)]);
        let plan = reconciler.reconcile_segment(&seg, None).await.unwrap();

        assert_eq!(plan.split_count(), 1);
        let retired = plan
            .commands
            .iter()
            .find_map(|c| match c {
                TopologyCommand::SplitSegment { retired, .. } => Some(retired.mrid),
                _ => None,
            })
            .unwrap();
        assert_eq!(retired, existing.mrid);
    }

    #[tokio::test]
    async fn test_apply_persists_split_and_retires_original() {
        let db = Arc::new(MemoryGeoDatabase::new());
        let seg = seed_connected_segment(&db, vec![(0.0, 0.0), (10.0, 10.0)]).await;

        let reconciler = TopologyReconciler::new(db.clone(), config(0.1));
        let plan = reconciler
            .reconcile_node(&node_at(5.0, 5.0))
            .await
            .unwrap();
        reconciler.apply(&plan).await.unwrap();

        assert!(db.segment_is_deleted(seg.mrid));
        assert_eq!(db.live_segment_count(), 2);
        assert_eq!(db.live_node_count(), 3);
    }

    #[tokio::test]
    async fn test_moved_node_keeps_identity_and_splits_at_new_location() {
        let db = Arc::new(MemoryGeoDatabase::new());
        let seg = seed_connected_segment(&db, vec![(0.0, 0.0), (10.0, 10.0)]).await;
        let node = node_at(20.0, 20.0);
        db.insert_node(&node).await.unwrap();

        let reconciler = TopologyReconciler::new(db.clone(), config(0.1));
        let moved = node.with_geometry(Point::new(5.0, 5.0)).unwrap();
        let plan = reconciler.reconcile_moved_node(&moved).await.unwrap();

        assert_eq!(plan.added_node_count(), 0);
        assert_eq!(plan.split_count(), 1);
        assert!(plan.commands.iter().any(|c| matches!(
            c,
            TopologyCommand::MoveNode { node: n } if n.mrid == node.mrid
        )));

        reconciler.apply(&plan).await.unwrap();
        assert_eq!(db.node(node.mrid).unwrap().geometry, Point::new(5.0, 5.0));
        assert!(db.segment_is_deleted(seg.mrid));
    }

    #[tokio::test]
    async fn test_moved_segment_excludes_itself_from_collisions() {
        let db = Arc::new(MemoryGeoDatabase::new());
        let seg = seed_connected_segment(&db, vec![(0.0, 0.0), (10.0, 10.0)]).await;

        let reconciler = TopologyReconciler::new(db.clone(), config(0.1));
        let moved = seg
            .with_geometry(LineString::from(vec![(0.0, 0.0), (10.0, 12.0)]))
            .unwrap();
        let plan = reconciler.reconcile_moved_segment(&moved).await.unwrap();

        // no split of itself, identity kept, new far endpoint minted
        assert_eq!(plan.split_count(), 0);
        assert_eq!(plan.added_node_count(), 1);
        assert!(plan.commands.iter().any(|c| matches!(
            c,
            TopologyCommand::MoveSegment { segment, .. } if segment.mrid == seg.mrid
        )));
    }

    /// Port that fails every spatial query.
    struct FailingGeoDatabase;

    #[async_trait::async_trait]
    impl GeoDatabase for FailingGeoDatabase {
        async fn nodes_intersecting_point(
            &self,
            _point: &Point<f64>,
            _tolerance: f64,
        ) -> Result<Vec<RouteNode>> {
            Err(routenet_core::RouteNetError::intersection_query(
                "connection reset",
            ))
        }

        async fn nodes_intersecting_interior(
            &self,
            _line: &LineString<f64>,
            _tolerance: f64,
        ) -> Result<Vec<RouteNode>> {
            Err(routenet_core::RouteNetError::intersection_query(
                "connection reset",
            ))
        }

        async fn segments_intersecting_point(
            &self,
            _point: &Point<f64>,
            _tolerance: f64,
            _include_edges: bool,
        ) -> Result<Vec<RouteSegment>> {
            Err(routenet_core::RouteNetError::intersection_query(
                "connection reset",
            ))
        }

        async fn segments_intersecting_line(
            &self,
            _line: &LineString<f64>,
            _tolerance: f64,
            _exclude: Option<Mrid>,
        ) -> Result<Vec<RouteSegment>> {
            Err(routenet_core::RouteNetError::intersection_query(
                "connection reset",
            ))
        }

        async fn split_segment_geometries(
            &self,
            _segment: &RouteSegment,
            _at: &Point<f64>,
            _tolerance: f64,
        ) -> Result<(LineString<f64>, LineString<f64>)> {
            Err(routenet_core::RouteNetError::intersection_query(
                "connection reset",
            ))
        }

        async fn insert_node(&self, _node: &RouteNode) -> Result<()> {
            Ok(())
        }

        async fn insert_segment(&self, _segment: &RouteSegment) -> Result<()> {
            Ok(())
        }

        async fn update_node_geometry(&self, _mrid: Mrid, _geometry: &Point<f64>) -> Result<()> {
            Ok(())
        }

        async fn update_segment_geometry(
            &self,
            _mrid: Mrid,
            _geometry: &LineString<f64>,
        ) -> Result<()> {
            Ok(())
        }

        async fn mark_node_deleted(&self, _mrid: Mrid) -> Result<()> {
            Ok(())
        }

        async fn mark_segment_deleted(&self, _mrid: Mrid) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_port_failure_aborts_with_no_commands() {
        let reconciler = TopologyReconciler::new(Arc::new(FailingGeoDatabase), config(0.1));
        let err = reconciler
            .reconcile_node(&node_at(5.0, 5.0))
            .await
            .unwrap_err();
        assert!(err.is_retriable());
    }
}
