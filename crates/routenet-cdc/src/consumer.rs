//! CDC consumer loop
//!
//! Pulls envelopes from the change feed and hands each to the processor as
//! an independent unit of work; the gate inside the processor bounds the
//! concurrency of the read-plan-write sequences. On shutdown the workers
//! stop pulling new messages and let in-flight work finish, so an aborted
//! run never leaves a partial append behind.

use crate::envelope::RouteNetworkEditOperation;
use crate::ports::EditAck;
use crate::processor::EditProcessor;
use routenet_core::ErrorCategory;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, error, info, warn};

/// Consumes the CDC feed with a bounded worker pool.
pub struct CdcConsumer {
    processor: Arc<EditProcessor>,
    ack: Arc<dyn EditAck>,
    workers: usize,
    shutdown_tx: watch::Sender<bool>,
}

impl CdcConsumer {
    pub fn new(processor: Arc<EditProcessor>, ack: Arc<dyn EditAck>, workers: usize) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            processor,
            ack,
            workers: workers.max(1),
            shutdown_tx,
        }
    }

    /// Request a graceful stop: no new messages are pulled, in-flight work
    /// completes.
    pub fn shutdown(&self) {
        info!("consumer shutdown requested");
        let _ = self.shutdown_tx.send(true);
    }

    /// A handle that can request shutdown from elsewhere.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    /// Run until the feed closes or shutdown is requested.
    pub async fn run(&self, feed: mpsc::Receiver<RouteNetworkEditOperation>) {
        let feed = Arc::new(Mutex::new(feed));
        let mut handles = Vec::with_capacity(self.workers);
        for worker_id in 0..self.workers {
            handles.push(tokio::spawn(worker_loop(
                worker_id,
                self.processor.clone(),
                self.ack.clone(),
                feed.clone(),
                self.shutdown_tx.subscribe(),
            )));
        }
        for handle in handles {
            let _ = handle.await;
        }
        info!("consumer drained");
    }
}

/// Requests consumer shutdown; clonable across tasks.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

enum Pull {
    Message(Box<RouteNetworkEditOperation>),
    FeedClosed,
    Shutdown,
}

async fn worker_loop(
    worker_id: usize,
    processor: Arc<EditProcessor>,
    ack: Arc<dyn EditAck>,
    feed: Arc<Mutex<mpsc::Receiver<RouteNetworkEditOperation>>>,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!(worker_id, "worker started");
    loop {
        if *shutdown.borrow() {
            break;
        }
        let pull = {
            let mut feed = feed.lock().await;
            tokio::select! {
                // the flag only ever flips to true; a dropped sender also
                // means the consumer is gone
                _ = shutdown.changed() => Pull::Shutdown,
                msg = feed.recv() => match msg {
                    Some(op) => Pull::Message(Box::new(op)),
                    None => Pull::FeedClosed,
                },
            }
        };

        match pull {
            Pull::Message(op) => handle_message(&processor, &ack, &op).await,
            Pull::FeedClosed => {
                debug!(worker_id, "feed closed");
                break;
            }
            Pull::Shutdown => {
                debug!(worker_id, "shutdown observed");
                break;
            }
        }
    }
    debug!(worker_id, "worker stopped");
}

async fn handle_message(
    processor: &Arc<EditProcessor>,
    ack: &Arc<dyn EditAck>,
    op: &RouteNetworkEditOperation,
) {
    let seq_no = op.seq_no;
    match processor.process(op).await {
        Ok(outcome) => {
            debug!(seq_no, ?outcome, "message processed");
            if let Err(e) = ack.ack(seq_no).await {
                warn!(seq_no, error = %e, "acknowledgement failed");
            }
        }
        Err(e) if e.category() == ErrorCategory::Validation => {
            // invalid geometry cannot succeed on redelivery; drop it and
            // surface the rule for operator correction
            warn!(seq_no, error = %e, "invalid edit dropped");
            if let Err(e) = ack.ack(seq_no).await {
                warn!(seq_no, error = %e, "acknowledgement failed");
            }
        }
        Err(e) if e.is_retriable() => {
            // leave unacknowledged so the source redelivers
            warn!(seq_no, error = %e, "transient failure, message will be redelivered");
        }
        Err(e) => {
            error!(seq_no, error = %e, fatal = e.is_fatal_for_stream(), "edit failed");
        }
    }
}
