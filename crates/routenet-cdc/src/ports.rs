//! External collaborator ports
//!
//! Narrow interfaces to everything outside the engine: the message broker,
//! the equipment and work-task services behind the API gateway, the area
//! notification channel and the CDC source's acknowledgement path. The
//! core never constructs network clients itself; implementations are
//! injected at startup.

use async_trait::async_trait;
use routenet_core::{Mrid, Result, RouteNetworkCommand};

/// Checks whether equipment is attached to a network entity.
///
/// A segment carrying equipment must not be deleted.
#[async_trait]
pub trait EquipmentChecker: Send + Sync {
    async fn has_related_equipment(&self, mrid: Mrid) -> Result<bool>;
}

/// A work task as reported by the work-order service.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkTask {
    pub mrid: Mrid,
    pub name: String,
    pub status: String,
}

/// Resolves the work task an operator is currently assigned to.
#[async_trait]
pub trait WorkTaskLookup: Send + Sync {
    async fn work_task_for_user(&self, username: &str) -> Result<Option<WorkTask>>;
}

/// Publishes outbound commands to the message broker.
#[async_trait]
pub trait CommandPublisher: Send + Sync {
    async fn publish(&self, topic: &str, commands: &[RouteNetworkCommand]) -> Result<()>;
}

/// Announces that a geographical area changed, for map-tile style caches.
#[async_trait]
pub trait AreaNotifier: Send + Sync {
    async fn area_updated(&self, affected: &[Mrid]) -> Result<()>;
}

/// Acknowledges a processed CDC message back to the source.
#[async_trait]
pub trait EditAck: Send + Sync {
    async fn ack(&self, seq_no: i64) -> Result<()>;
}
