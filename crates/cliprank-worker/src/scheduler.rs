//! Bounded worker pool.
//!
//! Submitted units of work queue in an unbounded channel and are
//! dispatched FIFO onto a semaphore of `max_workers` permits, so at
//! most `max_workers` orchestrator runs execute at once and nothing is
//! ever dropped. The scheduler carries no business logic; all
//! precondition checks live in the service and orchestrators.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, Notify, Semaphore};
use tracing::{debug, warn};

type Unit = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub struct Scheduler {
    tx: Mutex<Option<mpsc::UnboundedSender<Unit>>>,
    pending: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl Scheduler {
    /// Start the dispatcher with a pool of `max_workers` slots.
    pub fn new(max_workers: usize) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Unit>();
        let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
        let pending = Arc::new(AtomicUsize::new(0));
        let idle = Arc::new(Notify::new());

        let dispatch_pending = pending.clone();
        let dispatch_idle = idle.clone();
        tokio::spawn(async move {
            while let Some(unit) = rx.recv().await {
                // Permits are taken in submission order, keeping the
                // pool FIFO for work queued faster than it drains.
                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    break;
                };
                let pending = dispatch_pending.clone();
                let idle = dispatch_idle.clone();
                tokio::spawn(async move {
                    unit.await;
                    drop(permit);
                    pending.fetch_sub(1, Ordering::SeqCst);
                    idle.notify_waiters();
                });
            }
            debug!("scheduler dispatcher stopped");
        });

        Self {
            tx: Mutex::new(Some(tx)),
            pending,
            idle,
        }
    }

    /// Enqueue a unit of work. Runs exactly once, as soon as a pool
    /// slot is free. Units submitted after `shutdown` are dropped.
    pub fn submit(&self, unit: impl Future<Output = ()> + Send + 'static) {
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let Some(tx) = tx else {
            warn!("scheduler shut down, unit dropped");
            return;
        };
        self.pending.fetch_add(1, Ordering::SeqCst);
        if tx.send(Box::pin(unit)).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            warn!("scheduler stopped, unit dropped");
        }
    }

    /// Stop admitting work. Already-queued units drain normally; use
    /// [`wait_idle`](Self::wait_idle) afterwards for a graceful stop.
    pub fn shutdown(&self) {
        self.tx.lock().unwrap_or_else(|e| e.into_inner()).take();
    }

    /// Number of units submitted but not yet finished.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Wait until every submitted unit has finished.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.pending.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}
