//! Version-checked event appends
//!
//! The versioner owns the append protocol: it looks the current version up
//! from the store on every append (never a local cache, since another
//! writer may have advanced the stream) and submits the append conditioned
//! on that version.
//!
//! Two lookup outcomes that must never be collapsed:
//!
//! - the stream has never been written: the effective current version is 0
//!   and the first append takes version 1;
//! - the stream exists but the version lookup returns nothing: the store
//!   contradicts itself, and pretending version 0 would silently duplicate
//!   history. This surfaces as [`RouteNetError::StoreInconsistency`] and
//!   halts processing for the stream.

use crate::store::EventStore;
use crate::stream::StreamId;
use routenet_core::{Result, RouteNetError, RouteNetworkEvent};
use std::sync::Arc;
use tracing::{debug, warn};

/// Appends domain events with optimistic version checking.
pub struct EventVersioner {
    store: Arc<dyn EventStore>,
}

impl EventVersioner {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Append events to the stream, returning its new version.
    ///
    /// A concurrency conflict means another writer advanced the stream
    /// between the version read and this append; the caller recovers by
    /// re-running the whole reconciliation, not by re-appending the stale
    /// plan.
    pub async fn append(
        &self,
        stream: &StreamId,
        events: Vec<RouteNetworkEvent>,
    ) -> Result<u64> {
        if events.is_empty() {
            return self
                .store
                .current_version(stream)
                .await
                .map(|v| v.unwrap_or(0));
        }

        let current = if self.store.stream_exists(stream).await? {
            match self.store.current_version(stream).await? {
                Some(version) => version,
                None => {
                    warn!(%stream, "stream exists but has no version");
                    return Err(RouteNetError::store_inconsistency(format!(
                        "stream '{stream}' exists but its version could not be retrieved"
                    )));
                }
            }
        } else {
            0
        };

        let expected = current + 1;
        let new_version = self.store.append(stream, expected, events).await?;
        debug!(%stream, expected, new_version, "stream advanced");
        Ok(new_version)
    }
}
