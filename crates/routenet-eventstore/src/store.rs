//! Event store port
//!
//! The store owns stream bookkeeping: streams are created implicitly on
//! first append, versions only increase, and appends are conditioned on the
//! caller's expected version. The condition is enforced atomically so a
//! racing writer is rejected rather than silently interleaved.

use crate::stream::{RecordedEvent, StreamId};
use async_trait::async_trait;
use parking_lot::RwLock;
use routenet_core::{Result, RouteNetError, RouteNetworkEvent};
use std::collections::HashMap;
use tracing::debug;

/// Append-only, optimistically versioned event log.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append events, conditioned on `expected_version` being the version
    /// the first appended event will take (current version + 1).
    ///
    /// Returns the stream's new version. A mismatch fails with
    /// [`RouteNetError::ConcurrencyConflict`] and leaves the stream
    /// unchanged.
    async fn append(
        &self,
        stream: &StreamId,
        expected_version: u64,
        events: Vec<RouteNetworkEvent>,
    ) -> Result<u64>;

    /// Current version of the stream; `None` when no version is recorded.
    async fn current_version(&self, stream: &StreamId) -> Result<Option<u64>>;

    /// Whether the stream has ever been written.
    async fn stream_exists(&self, stream: &StreamId) -> Result<bool>;

    /// All events of the stream in append order.
    async fn read_stream(&self, stream: &StreamId) -> Result<Vec<RecordedEvent>>;
}

/// In-memory event store.
///
/// Backs tests and embedded use; the interior lock covers the whole
/// check-and-append so the version condition is atomic.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    streams: RwLock<HashMap<StreamId, Vec<RecordedEvent>>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of streams ever written.
    pub fn stream_count(&self) -> usize {
        self.streams.read().len()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn append(
        &self,
        stream: &StreamId,
        expected_version: u64,
        events: Vec<RouteNetworkEvent>,
    ) -> Result<u64> {
        if events.is_empty() {
            return Err(RouteNetError::other("refusing to append zero events"));
        }

        let mut streams = self.streams.write();
        let records = streams.entry(stream.clone()).or_default();
        let current = records.len() as u64;

        if expected_version != current + 1 {
            // roll back the implicit creation so a failed first append
            // leaves no empty stream behind
            if records.is_empty() {
                streams.remove(stream);
            }
            return Err(RouteNetError::concurrency_conflict(
                stream.to_string(),
                expected_version,
            ));
        }

        for (i, event) in events.into_iter().enumerate() {
            records.push(RecordedEvent {
                stream_id: stream.clone(),
                version: current + 1 + i as u64,
                event,
            });
        }
        let new_version = records.len() as u64;
        debug!(%stream, new_version, "events appended");
        Ok(new_version)
    }

    async fn current_version(&self, stream: &StreamId) -> Result<Option<u64>> {
        Ok(self
            .streams
            .read()
            .get(stream)
            .map(|records| records.len() as u64))
    }

    async fn stream_exists(&self, stream: &StreamId) -> Result<bool> {
        Ok(self.streams.read().contains_key(stream))
    }

    async fn read_stream(&self, stream: &StreamId) -> Result<Vec<RecordedEvent>> {
        Ok(self
            .streams
            .read()
            .get(stream)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use routenet_core::{Mrid, RouteNetworkChange};

    fn node_added() -> RouteNetworkEvent {
        RouteNetworkEvent::new(RouteNetworkChange::NodeAdded { node_id: Mrid::new() })
    }

    #[tokio::test]
    async fn test_first_append_yields_version_one() {
        let store = MemoryEventStore::new();
        let stream = StreamId::from("x");
        let version = store.append(&stream, 1, vec![node_added()]).await.unwrap();
        assert_eq!(version, 1);
        assert_eq!(store.current_version(&stream).await.unwrap(), Some(1));
        assert!(store.stream_exists(&stream).await.unwrap());
    }

    #[tokio::test]
    async fn test_versions_are_monotonic() {
        let store = MemoryEventStore::new();
        let stream = StreamId::from("x");
        assert_eq!(store.append(&stream, 1, vec![node_added()]).await.unwrap(), 1);
        assert_eq!(store.append(&stream, 2, vec![node_added()]).await.unwrap(), 2);

        let events = store.read_stream(&stream).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].version, 1);
        assert_eq!(events[1].version, 2);
    }

    #[tokio::test]
    async fn test_stale_expectation_is_rejected_and_store_unchanged() {
        let store = MemoryEventStore::new();
        let stream = StreamId::from("x");
        store.append(&stream, 1, vec![node_added()]).await.unwrap();
        store.append(&stream, 2, vec![node_added()]).await.unwrap();

        let err = store.append(&stream, 2, vec![node_added()]).await.unwrap_err();
        assert!(matches!(err, RouteNetError::ConcurrencyConflict { .. }));
        assert_eq!(store.current_version(&stream).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_failed_first_append_leaves_no_stream() {
        let store = MemoryEventStore::new();
        let stream = StreamId::from("x");
        assert!(store.append(&stream, 5, vec![node_added()]).await.is_err());
        assert!(!store.stream_exists(&stream).await.unwrap());
    }

    #[tokio::test]
    async fn test_multi_event_append_is_atomic() {
        let store = MemoryEventStore::new();
        let stream = StreamId::from("x");
        let version = store
            .append(&stream, 1, vec![node_added(), node_added(), node_added()])
            .await
            .unwrap();
        assert_eq!(version, 3);
        let versions: Vec<u64> = store
            .read_stream(&stream)
            .await
            .unwrap()
            .iter()
            .map(|r| r.version)
            .collect();
        assert_eq!(versions, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_unknown_stream_has_no_version() {
        let store = MemoryEventStore::new();
        let stream = StreamId::from("missing");
        assert_eq!(store.current_version(&stream).await.unwrap(), None);
        assert!(!store.stream_exists(&stream).await.unwrap());
        assert!(store.read_stream(&stream).await.unwrap().is_empty());
    }
}
