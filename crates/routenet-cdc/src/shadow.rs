//! Shadow table
//!
//! A parallel "last known" snapshot of each authoritative row. The shadow
//! lets an update CDC message be interpreted as a semantic before/after
//! pair (geometry moved? attributes only? no change?) instead of two
//! unrelated row images.

use crate::envelope::RouteRow;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use routenet_core::{EditAttributes, Mrid, Result};
use std::collections::HashMap;

/// Last known state of one authoritative row.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowRow {
    pub mrid: Mrid,
    /// Binary geometry as last seen
    pub coord: Bytes,
    pub work_task_mrid: Option<Mrid>,
    pub username: Option<String>,
    pub application_name: Option<String>,
    /// The row has been tombstoned
    pub deleted: bool,
}

impl ShadowRow {
    /// Build a shadow row from an envelope row and its geometry column.
    pub fn from_row(row: &RouteRow, coord: Bytes) -> Self {
        Self {
            mrid: row.mrid,
            coord,
            work_task_mrid: row.work_task_mrid,
            username: row.username.clone(),
            application_name: row.application_name.clone(),
            deleted: row.marked_to_be_deleted,
        }
    }

    /// The edit provenance carried by this row.
    pub fn attributes(&self) -> EditAttributes {
        EditAttributes {
            work_task_mrid: self.work_task_mrid,
            username: self.username.clone(),
            application_name: self.application_name.clone(),
        }
    }

    /// Attribute columns differ from the given row.
    pub fn attributes_differ(&self, row: &RouteRow) -> bool {
        self.work_task_mrid != row.work_task_mrid
            || self.username != row.username
            || self.application_name != row.application_name
            || self.deleted != row.marked_to_be_deleted
    }
}

/// Port to the shadow store.
#[async_trait]
pub trait ShadowTable: Send + Sync {
    /// Last known state of the row, if any.
    async fn get_shadow(&self, mrid: Mrid) -> Result<Option<ShadowRow>>;

    /// Record the row's current state.
    async fn put_shadow(&self, row: ShadowRow) -> Result<()>;

    /// Forget the row.
    async fn remove_shadow(&self, mrid: Mrid) -> Result<()>;
}

/// In-memory shadow table for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryShadowTable {
    rows: RwLock<HashMap<Mrid, ShadowRow>>,
}

impl MemoryShadowTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl ShadowTable for MemoryShadowTable {
    async fn get_shadow(&self, mrid: Mrid) -> Result<Option<ShadowRow>> {
        Ok(self.rows.read().get(&mrid).cloned())
    }

    async fn put_shadow(&self, row: ShadowRow) -> Result<()> {
        self.rows.write().insert(row.mrid, row);
        Ok(())
    }

    async fn remove_shadow(&self, mrid: Mrid) -> Result<()> {
        self.rows.write().remove(&mrid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(mrid: Mrid, username: &str) -> RouteRow {
        RouteRow {
            mrid,
            work_task_mrid: None,
            username: Some(username.to_string()),
            application_name: None,
            marked_to_be_deleted: false,
        }
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let table = MemoryShadowTable::new();
        let mrid = Mrid::new();
        assert!(table.get_shadow(mrid).await.unwrap().is_none());

        let shadow = ShadowRow::from_row(&row(mrid, "operator"), Bytes::from_static(&[1]));
        table.put_shadow(shadow.clone()).await.unwrap();
        assert_eq!(table.get_shadow(mrid).await.unwrap(), Some(shadow));

        table.remove_shadow(mrid).await.unwrap();
        assert!(table.get_shadow(mrid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_attributes_differ() {
        let mrid = Mrid::new();
        let shadow = ShadowRow::from_row(&row(mrid, "alice"), Bytes::new());
        assert!(!shadow.attributes_differ(&row(mrid, "alice")));
        assert!(shadow.attributes_differ(&row(mrid, "bob")));

        let mut tombstoned = row(mrid, "alice");
        tombstoned.marked_to_be_deleted = true;
        assert!(shadow.attributes_differ(&tombstoned));
    }
}
