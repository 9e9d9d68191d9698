//! # routenet-core - Route Network Domain Model
//!
//! Core types shared by the reconciliation engine:
//!
//! - [`Mrid`] - Global entity identity
//! - [`RouteNode`] / [`RouteSegment`] - Immutable network entities
//! - [`RouteNetworkEvent`] - Domain events appended to streams
//! - [`RouteNetworkCommand`] - Outbound broker commands
//! - [`ReconciliationConfig`] - Explicit configuration value
//! - [`RouteNetError`] - Error taxonomy with retry classification
//!
//! ## Architecture
//!
//! ```text
//! CDC message ──▶ validate ──▶ reconcile ──▶ versioned append ──▶ publish
//!                 (geometry)   (topology      (event store)       (broker)
//!                               plan)
//! ```
//!
//! This crate holds no behavior beyond construction and classification; the
//! validator, reconciler, versioner and pipeline live in sibling crates.

mod command;
mod config;
mod error;
mod event;
mod mrid;
mod route;
mod stats;

pub use command::{
    RouteNetworkCommand, RouteNodeAddedCommand, RouteSegmentAddedCommand, ROUTE_NETWORK_TOPIC,
};
pub use config::{ReconciliationConfig, ReconciliationConfigBuilder};
pub use error::{ErrorCategory, Result, RouteNetError, ValidationRule};
pub use event::{RouteNetworkChange, RouteNetworkEvent};
pub use mrid::Mrid;
pub use route::{EditAttributes, RouteNode, RouteSegment};
pub use stats::{ProcessingStats, ProcessingStatsSnapshot};
