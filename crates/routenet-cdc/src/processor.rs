//! Edit processing pipeline
//!
//! One CDC message travels: classify against the shadow -> validate
//! geometry -> acquire the gate -> plan -> apply -> versioned append ->
//! publish. The gate covers the whole read-plan-write sequence; a
//! concurrency conflict on append triggers a full re-run (the topology may
//! have changed under us, so the plan is recomputed, never re-submitted),
//! bounded by the configured retry limit.

use crate::edit::{classify, ClassifiedEdit, EditIntent};
use crate::gate::ConcurrencyGate;
use crate::envelope::RouteNetworkEditOperation;
use crate::ports::{AreaNotifier, CommandPublisher, EquipmentChecker, WorkTaskLookup};
use crate::shadow::ShadowTable;
use chrono::Utc;
use routenet_core::{
    Mrid, ProcessingStats, ReconciliationConfig, Result, RouteNetError, RouteNetworkChange,
    RouteNetworkEvent, ProcessingStatsSnapshot, ROUTE_NETWORK_TOPIC,
};
use routenet_eventstore::{EventStore, EventVersioner, StreamId};
use routenet_geometry::GeometryValidator;
use routenet_topology::{GeoDatabase, TopologyReconciler};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything the processor talks to.
pub struct ProcessorPorts {
    pub geo_db: Arc<dyn GeoDatabase>,
    pub event_store: Arc<dyn EventStore>,
    pub shadow: Arc<dyn ShadowTable>,
    pub equipment: Arc<dyn EquipmentChecker>,
    pub work_tasks: Arc<dyn WorkTaskLookup>,
    pub publisher: Arc<dyn CommandPublisher>,
    pub notifier: Arc<dyn AreaNotifier>,
}

/// What processing one envelope amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Topology changed; events were appended and commands published
    Applied {
        stream: StreamId,
        version: u64,
        published: usize,
    },
    /// Only the shadow snapshot was refreshed
    ShadowRefreshed,
    /// The message changed nothing
    Noop,
}

/// Processes CDC envelopes into topology changes and domain events.
pub struct EditProcessor {
    validator: GeometryValidator,
    reconciler: TopologyReconciler,
    versioner: EventVersioner,
    gate: Arc<ConcurrencyGate>,
    geo_db: Arc<dyn GeoDatabase>,
    shadow: Arc<dyn ShadowTable>,
    equipment: Arc<dyn EquipmentChecker>,
    work_tasks: Arc<dyn WorkTaskLookup>,
    publisher: Arc<dyn CommandPublisher>,
    notifier: Arc<dyn AreaNotifier>,
    config: ReconciliationConfig,
    stats: ProcessingStats,
}

impl EditProcessor {
    pub fn new(config: ReconciliationConfig, ports: ProcessorPorts) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            validator: GeometryValidator::new(config.tolerance),
            reconciler: TopologyReconciler::new(ports.geo_db.clone(), config.clone()),
            versioner: EventVersioner::new(ports.event_store),
            gate: ConcurrencyGate::new(config.gate_permits),
            geo_db: ports.geo_db,
            shadow: ports.shadow,
            equipment: ports.equipment,
            work_tasks: ports.work_tasks,
            publisher: ports.publisher,
            notifier: ports.notifier,
            config,
            stats: ProcessingStats::new(),
        })
    }

    /// Current pipeline counters.
    pub fn stats(&self) -> ProcessingStatsSnapshot {
        self.stats.snapshot()
    }

    /// Process one CDC envelope end to end.
    pub async fn process(&self, op: &RouteNetworkEditOperation) -> Result<ProcessOutcome> {
        self.stats.record_processed();

        // writes this application made itself come back through the feed;
        // reprocessing them would loop forever
        if let Some(row) = op.after_row()? {
            if row.application_name.as_deref() == Some(self.config.application_name.as_str()) {
                debug!(seq_no = op.seq_no, mrid = %row.mrid, "own write ignored");
                return Ok(ProcessOutcome::Noop);
            }
        }

        let subject = self.subject_of(op)?;
        let shadow = match subject {
            Some(mrid) => self.shadow.get_shadow(mrid).await?,
            None => None,
        };
        let classified = classify(op, shadow.as_ref())?;

        let result = self.process_classified(op, &classified).await;
        match &result {
            Ok(ProcessOutcome::Applied { stream, version, published }) => {
                self.stats.record_applied();
                info!(seq_no = op.seq_no, %stream, version, published, "edit applied");
            }
            Ok(_) => {}
            Err(e) if matches!(e, RouteNetError::Validation { .. }) => {
                self.stats.record_rejected();
            }
            Err(_) => {
                self.stats.record_failed();
            }
        }
        result
    }

    async fn process_classified(
        &self,
        op: &RouteNetworkEditOperation,
        classified: &ClassifiedEdit,
    ) -> Result<ProcessOutcome> {
        match &classified.intent {
            EditIntent::Noop => Ok(ProcessOutcome::Noop),
            EditIntent::RefreshAttributes(_) => {
                if let Some(row) = &classified.shadow_after {
                    self.shadow.put_shadow(row.clone()).await?;
                }
                Ok(ProcessOutcome::ShadowRefreshed)
            }
            intent => {
                self.validate(intent)?;
                self.stats.record_validated();

                let mut attempt = 0;
                loop {
                    match self.apply_intent(op, classified).await {
                        Err(RouteNetError::ConcurrencyConflict { stream, expected })
                            if attempt < self.config.max_conflict_retries =>
                        {
                            attempt += 1;
                            self.stats.record_conflict_retry();
                            warn!(
                                seq_no = op.seq_no,
                                %stream,
                                expected,
                                attempt,
                                "concurrency conflict, re-running reconciliation"
                            );
                        }
                        other => return other,
                    }
                }
            }
        }
    }

    /// Validation is synchronous and happens before the gate; a rejected
    /// geometry never costs a permit.
    fn validate(&self, intent: &EditIntent) -> Result<()> {
        match intent {
            EditIntent::InsertNode(node) | EditIntent::MoveNode(node) => {
                self.validator.check_point(&node.geometry)
            }
            EditIntent::InsertSegment(segment) | EditIntent::MoveSegment(segment) => {
                self.validator.check_line(&segment.geometry)
            }
            _ => Ok(()),
        }
    }

    /// One gated read-plan-write pass.
    async fn apply_intent(
        &self,
        op: &RouteNetworkEditOperation,
        classified: &ClassifiedEdit,
    ) -> Result<ProcessOutcome> {
        let _permit = self.gate.acquire().await;

        let (plan_events, entity, plan) = match &classified.intent {
            EditIntent::InsertNode(node) => {
                let node = self.with_work_task(node.clone()).await?;
                let plan = self.reconciler.reconcile_node(&node).await?;
                (plan.events(), node.mrid, Some(plan))
            }
            EditIntent::InsertSegment(segment) => {
                let plan = self.reconciler.reconcile_segment(segment, None).await?;
                (plan.events(), segment.mrid, Some(plan))
            }
            EditIntent::MoveNode(node) => {
                let plan = self.reconciler.reconcile_moved_node(node).await?;
                (plan.events(), node.mrid, Some(plan))
            }
            EditIntent::MoveSegment(segment) => {
                let plan = self.reconciler.reconcile_moved_segment(segment).await?;
                (plan.events(), segment.mrid, Some(plan))
            }
            EditIntent::DeleteNode(mrid) => {
                let events = vec![RouteNetworkEvent::new(
                    RouteNetworkChange::NodeMarkedForDeletion { node_id: *mrid },
                )];
                (events, *mrid, None)
            }
            EditIntent::DeleteSegment(mrid) => {
                if self.equipment.has_related_equipment(*mrid).await? {
                    return Err(RouteNetError::external_service(format!(
                        "segment {mrid} has related equipment and cannot be deleted"
                    )));
                }
                let events = vec![RouteNetworkEvent::new(
                    RouteNetworkChange::SegmentMarkedForDeletion { segment_id: *mrid },
                )];
                (events, *mrid, None)
            }
            EditIntent::RefreshAttributes(_) | EditIntent::Noop => unreachable!(),
        };

        let stream = StreamId::for_entity(entity);

        // all events of one edit go to the store in a single conditional
        // append; an aborted reconciliation appends nothing
        let version = self.versioner.append(&stream, plan_events).await?;

        match &plan {
            Some(plan) => self.reconciler.apply(plan).await?,
            None => match &classified.intent {
                EditIntent::DeleteNode(mrid) => self.geo_db.mark_node_deleted(*mrid).await?,
                EditIntent::DeleteSegment(mrid) => {
                    self.geo_db.mark_segment_deleted(*mrid).await?
                }
                _ => {}
            },
        }

        match &classified.shadow_after {
            Some(row) => self.shadow.put_shadow(row.clone()).await?,
            None => self.shadow.remove_shadow(entity).await?,
        }

        let published = match &plan {
            Some(plan) => {
                let commands = plan.broker_commands(Mrid::new(), Utc::now());
                if !commands.is_empty() {
                    self.publisher
                        .publish(ROUTE_NETWORK_TOPIC, &commands)
                        .await?;
                }
                commands.len()
            }
            None => 0,
        };

        if self.config.send_geographical_area_updated_notification {
            // a failed notification never fails the edit
            if let Err(e) = self.notifier.area_updated(&[entity]).await {
                warn!(seq_no = op.seq_no, error = %e, "area notification failed");
            }
        }

        debug!(seq_no = op.seq_no, %stream, version, published, "edit pass complete");
        Ok(ProcessOutcome::Applied {
            stream,
            version,
            published,
        })
    }

    /// Fill in the operator's current work task when the edit lacks one.
    async fn with_work_task(
        &self,
        mut node: routenet_core::RouteNode,
    ) -> Result<routenet_core::RouteNode> {
        if node.attributes.work_task_mrid.is_none() {
            if let Some(username) = node.attributes.username.clone() {
                if let Some(task) = self.work_tasks.work_task_for_user(&username).await? {
                    node.attributes.work_task_mrid = Some(task.mrid);
                }
            }
        }
        Ok(node)
    }

    fn subject_of(&self, op: &RouteNetworkEditOperation) -> Result<Option<Mrid>> {
        Ok(op
            .after_row()?
            .or(op.before_row()?)
            .map(|row| row.mrid))
    }
}
