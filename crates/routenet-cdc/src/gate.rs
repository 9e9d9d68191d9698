//! FIFO concurrency gate
//!
//! Bounded concurrency with strict admission ordering, stronger than a
//! plain counting semaphore: callers are granted access in exactly the
//! order they asked, regardless of release timing. A released permit is
//! handed directly to the oldest waiting ticket instead of going back to a
//! shared pool, so a late arrival can never overtake an earlier waiter.
//!
//! The gate is the sole mutual-exclusion mechanism around a
//! reconciliation's read-plan-write sequence; with one permit it serializes
//! reconciliations globally, with N permits it allows region-sharded
//! parallelism.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::trace;

struct GateState {
    permits: usize,
    waiters: VecDeque<oneshot::Sender<()>>,
}

/// Fair bounded-concurrency gate.
pub struct ConcurrencyGate {
    state: Mutex<GateState>,
}

impl ConcurrencyGate {
    /// Create a gate with the given permit count.
    pub fn new(permits: usize) -> Arc<Self> {
        assert!(permits > 0, "gate needs at least one permit");
        Arc::new(Self {
            state: Mutex::new(GateState {
                permits,
                waiters: VecDeque::new(),
            }),
        })
    }

    /// Acquire a permit.
    ///
    /// Resolves once a permit is free and every earlier acquire has
    /// resolved. The returned guard releases on drop.
    pub async fn acquire(self: &Arc<Self>) -> GatePermit {
        let ticket = {
            let mut state = self.state.lock();
            if state.waiters.is_empty() && state.permits > 0 {
                state.permits -= 1;
                None
            } else {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                Some(rx)
            }
        };

        if let Some(rx) = ticket {
            trace!("waiting for gate admission");
            // the sender side is only dropped if the gate itself is
            // dropped, in which case nothing runs anymore anyway
            let _ = rx.await;
        }

        GatePermit {
            gate: Arc::clone(self),
        }
    }

    /// Permits not currently held.
    pub fn available_permits(&self) -> usize {
        self.state.lock().permits
    }

    /// Tickets still waiting for admission.
    pub fn waiting(&self) -> usize {
        self.state.lock().waiters.len()
    }

    fn release(&self) {
        let mut state = self.state.lock();
        // hand the permit to the oldest still-pending ticket
        while let Some(tx) = state.waiters.pop_front() {
            if tx.send(()).is_ok() {
                return;
            }
            // that waiter gave up (future dropped); try the next one
        }
        state.permits += 1;
    }
}

/// Held admission to the gate; releases on drop.
pub struct GatePermit {
    gate: Arc<ConcurrencyGate>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.gate.release();
    }
}
