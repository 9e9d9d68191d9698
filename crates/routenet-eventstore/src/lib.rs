//! # routenet-eventstore - Versioned Event Streams
//!
//! Append-only, per-aggregate event streams with optimistic concurrency:
//!
//! - [`StreamId`] / [`RecordedEvent`] - stream model
//! - [`EventStore`] - the store port, with [`MemoryEventStore`] for tests
//!   and embedded use
//! - [`EventVersioner`] - the version-checked append protocol
//!
//! Streams are created implicitly on first append, versions only increase,
//! and deletions are tombstone events; history is never removed.

mod store;
mod stream;
mod versioner;

pub use store::{EventStore, MemoryEventStore};
pub use stream::{RecordedEvent, StreamId};
pub use versioner::EventVersioner;
