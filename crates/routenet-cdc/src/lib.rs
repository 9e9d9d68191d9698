//! # routenet-cdc - Change Data Capture Ingestion
//!
//! Feeds operator edits from the geographic database's change feed into
//! the reconciliation engine:
//!
//! - [`RouteNetworkEditOperation`] - the CDC envelope
//! - [`ShadowTable`] - last-known row snapshots for before/after diffing
//! - [`classify`] / [`EditIntent`] - typed interpretation of an envelope
//! - [`ConcurrencyGate`] - FIFO bounded concurrency around reconciliations
//! - [`EditProcessor`] - the per-message pipeline
//! - [`CdcConsumer`] - the cancellable feed loop
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌────────────┐
//! │ CDC feed │──▶│ classify │──▶│ validate  │──▶│ gate       │
//! └──────────┘   │ (shadow) │   │ (geometry)│   │ reconcile  │
//!                └──────────┘   └───────────┘   │ append     │
//!                                               │ publish    │
//!                                               └────────────┘
//! ```
//!
//! Within one logical stream the gate plus the versioner's optimistic
//! check linearize the effects of racing edits; unrelated streams proceed
//! independently.

mod consumer;
mod edit;
mod envelope;
mod gate;
mod ports;
mod processor;
mod shadow;

pub use consumer::{CdcConsumer, ShutdownHandle};
pub use edit::{classify, ClassifiedEdit, EditIntent};
pub use envelope::{EditKind, RouteNetworkEditOperation, RouteRow};
pub use gate::{ConcurrencyGate, GatePermit};
pub use ports::{
    AreaNotifier, CommandPublisher, EditAck, EquipmentChecker, WorkTask, WorkTaskLookup,
};
pub use processor::{EditProcessor, ProcessOutcome, ProcessorPorts};
pub use shadow::{MemoryShadowTable, ShadowRow, ShadowTable};
