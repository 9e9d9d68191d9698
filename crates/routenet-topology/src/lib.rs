//! # routenet-topology - Topology Reconciliation
//!
//! Determines how one validated geometric edit affects the existing route
//! network:
//!
//! - [`GeoDatabase`] - the spatial query/mutation port, with
//!   [`MemoryGeoDatabase`] for tests and embedded use
//! - [`ReconciliationPlan`] / [`TopologyCommand`] - the planned changes
//! - [`TopologyReconciler`] - the planning and apply logic
//!
//! The reconciler owns the in-memory plan for the duration of one
//! reconciliation and caches no topology across reconciliations; the port
//! exclusively owns persisted state.

mod memory;
mod plan;
mod port;
mod reconciler;

pub use memory::MemoryGeoDatabase;
pub use plan::{ReconciliationPlan, SegmentPart, TopologyCommand};
pub use port::GeoDatabase;
pub use reconciler::TopologyReconciler;
