//! Master resource identifiers
//!
//! Every network entity (node, segment, work task) and every emitted event
//! carries a globally unique `Mrid`.

use crate::error::{Result, RouteNetError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally unique identity of a route network entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mrid(Uuid);

impl Mrid {
    /// Mint a fresh identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse from the canonical hyphenated form.
    pub fn parse_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| RouteNetError::codec(format!("invalid mrid '{s}': {e}")))
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for Mrid {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Mrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Mrid {
    type Err = RouteNetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s)
    }
}

impl From<Uuid> for Mrid {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}
