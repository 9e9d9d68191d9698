//! Shared test doubles for pipeline integration tests.

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;

/// Route test logs through the captured test writer; safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

use parking_lot::Mutex;
use routenet_cdc::{
    AreaNotifier, CommandPublisher, EditAck, EquipmentChecker, WorkTask, WorkTaskLookup,
};
use routenet_core::{Mrid, Result, RouteNetworkCommand};

pub struct NoEquipment;

#[async_trait]
impl EquipmentChecker for NoEquipment {
    async fn has_related_equipment(&self, _mrid: Mrid) -> Result<bool> {
        Ok(false)
    }
}

pub struct NoWorkTasks;

#[async_trait]
impl WorkTaskLookup for NoWorkTasks {
    async fn work_task_for_user(&self, _username: &str) -> Result<Option<WorkTask>> {
        Ok(None)
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub published: Mutex<Vec<(String, Vec<RouteNetworkCommand>)>>,
}

#[async_trait]
impl CommandPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, commands: &[RouteNetworkCommand]) -> Result<()> {
        self.published
            .lock()
            .push((topic.to_string(), commands.to_vec()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notified: Mutex<Vec<Vec<Mrid>>>,
}

#[async_trait]
impl AreaNotifier for RecordingNotifier {
    async fn area_updated(&self, affected: &[Mrid]) -> Result<()> {
        self.notified.lock().push(affected.to_vec());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingAck {
    pub acked: Mutex<Vec<i64>>,
}

#[async_trait]
impl EditAck for RecordingAck {
    async fn ack(&self, seq_no: i64) -> Result<()> {
        self.acked.lock().push(seq_no);
        Ok(())
    }
}
