//! CDC envelope
//!
//! Wire representation of one row-level change reported by the geographic
//! database's change feed. `seq_no` is assigned by the source log and
//! defines per-source ordering; `before`/`after` carry the row payload as
//! JSON strings and the geometry as separate binary columns.

use bytes::Bytes;
use routenet_core::{Mrid, Result, RouteNetError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row-level operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for EditKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditKind::Insert => write!(f, "insert"),
            EditKind::Update => write!(f, "update"),
            EditKind::Delete => write!(f, "delete"),
        }
    }
}

/// One change captured from the geographic database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteNetworkEditOperation {
    /// Monotonic sequence number from the source log
    pub seq_no: i64,
    /// Identity of the CDC record itself
    pub event_id: Uuid,
    /// Row payload before the change (UPDATE/DELETE)
    pub before: Option<String>,
    /// Binary geometry before the change
    pub before_coord: Option<Bytes>,
    /// Row payload after the change (INSERT/UPDATE)
    pub after: Option<String>,
    /// Binary geometry after the change
    pub after_coord: Option<Bytes>,
    /// Operation type
    #[serde(rename = "type")]
    pub kind: EditKind,
}

/// Attribute columns of a route row, as serialized into the envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRow {
    pub mrid: Mrid,
    #[serde(default)]
    pub work_task_mrid: Option<Mrid>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub application_name: Option<String>,
    #[serde(default)]
    pub marked_to_be_deleted: bool,
}

impl RouteNetworkEditOperation {
    /// Decode from the feed's JSON encoding.
    pub fn from_json(payload: &str) -> Result<Self> {
        serde_json::from_str(payload)
            .map_err(|e| RouteNetError::codec(format!("malformed CDC envelope: {e}")))
    }

    /// Parse the before-row payload.
    pub fn before_row(&self) -> Result<Option<RouteRow>> {
        parse_row(self.before.as_deref(), "before")
    }

    /// Parse the after-row payload.
    pub fn after_row(&self) -> Result<Option<RouteRow>> {
        parse_row(self.after.as_deref(), "after")
    }
}

fn parse_row(payload: Option<&str>, side: &str) -> Result<Option<RouteRow>> {
    match payload {
        None => Ok(None),
        Some(raw) => serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| RouteNetError::codec(format!("malformed {side} row payload: {e}"))),
    }
}
