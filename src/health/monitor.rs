//! Per-target health monitoring.

use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info};

use crate::health::probe::Probe;
use crate::observability::metrics;

/// Watches one target's reachability with a replaceable probe.
///
/// The monitor owns exactly one background poll task at a time. `start`
/// seeds availability with an immediate probe before the task begins, and
/// `reconfigure`/`stop` fully join the running task before returning, so a
/// reader can never observe a result written by a replaced probe.
pub struct HealthMonitor {
    addr: SocketAddr,
    available: Arc<RwLock<bool>>,
    task: Mutex<Option<PollTask>>,
}

struct PollTask {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PollTask {
    /// Signal the poll loop and wait for it to exit.
    async fn cancel_and_join(self) {
        let _ = self.cancel.send(true);
        let _ = self.handle.await;
    }
}

impl HealthMonitor {
    /// Probe once to seed availability, then start periodic polling.
    pub async fn start(addr: SocketAddr, probe: Arc<dyn Probe>, period: Duration) -> Self {
        let available = Arc::new(RwLock::new(false));
        store_result(addr, &available, probe.check(addr).await);

        let monitor = Self {
            addr,
            available: available.clone(),
            task: Mutex::new(None),
        };
        *monitor.task.lock().await = Some(spawn_poll(addr, probe, period, available));
        monitor
    }

    /// Last recorded probe result. Never blocks on network I/O.
    pub fn is_available(&self) -> bool {
        *self
            .available
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the probe and period.
    ///
    /// The previous poll task is cancelled and joined before the new probe
    /// runs, then one immediate probe re-seeds availability and polling
    /// restarts on the new period.
    pub async fn reconfigure(&self, probe: Arc<dyn Probe>, period: Duration) {
        let mut slot = self.task.lock().await;
        if let Some(task) = slot.take() {
            task.cancel_and_join().await;
        }
        store_result(self.addr, &self.available, probe.check(self.addr).await);
        *slot = Some(spawn_poll(self.addr, probe, period, self.available.clone()));
    }

    /// Cancel the poll task and wait for it to exit. Idempotent.
    pub async fn stop(&self) {
        let mut slot = self.task.lock().await;
        if let Some(task) = slot.take() {
            task.cancel_and_join().await;
            info!(target = %self.addr, "health monitor stopped");
        }
    }
}

/// Spawn the poll loop for one target.
fn spawn_poll(
    addr: SocketAddr,
    probe: Arc<dyn Probe>,
    period: Duration,
    available: Arc<RwLock<bool>>,
) -> PollTask {
    let (cancel, mut cancelled) = watch::channel(false);

    let handle = tokio::spawn(async move {
        let mut ticker = time::interval(period);
        // The first interval tick fires immediately; the caller already
        // seeded availability with a synchronous probe, so skip it.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // The probe may block on network I/O for up to its
                    // timeout; it runs outside the lock so readers are
                    // never held up. Only the result store locks.
                    let up = probe.check(addr).await;
                    store_result(addr, &available, up);
                }
                _ = cancelled.changed() => {
                    break;
                }
            }
        }
    });

    PollTask { cancel, handle }
}

/// Record a probe result, logging availability transitions.
fn store_result(addr: SocketAddr, available: &RwLock<bool>, up: bool) {
    let mut slot = available.write().unwrap_or_else(PoisonError::into_inner);
    if *slot != up {
        info!(target = %addr, available = up, "target availability changed");
    } else {
        debug!(target = %addr, available = up, "health probe completed");
    }
    *slot = up;
    drop(slot);

    metrics::record_target_availability(addr, up);
}
