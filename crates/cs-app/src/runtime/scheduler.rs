//! Polling scheduler.
//!
//! Drives [`SyncProjects`] from a background task: once at start, then on
//! every interval tick and on every external trigger (the window-focus
//! equivalent). Ticks or triggers that arrive while a pass is running are
//! dropped, not queued. `stop()` cancels the task through a shutdown
//! signal, including a pass that is still in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::usecases::sync_projects::{SyncError, SyncOutcome, SyncProjects};

pub struct PollingScheduler {
    sync: Arc<SyncProjects>,
    period: Duration,
    running: AtomicBool,
    trigger: Arc<Notify>,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PollingScheduler {
    pub fn new(sync: Arc<SyncProjects>, period: Duration) -> Self {
        Self {
            sync,
            period,
            running: AtomicBool::new(false),
            trigger: Arc::new(Notify::new()),
            shutdown: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Spawn the polling task. Idempotent.
    pub async fn start(&self) -> Result<()> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let sync = self.sync.clone();
        let trigger = self.trigger.clone();
        let period = self.period;

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {}
                    _ = trigger.notified() => debug!("Sync triggered"),
                }

                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = run_pass(&sync) => {}
                }
            }

            debug!("Polling task exited");
        });

        *self.shutdown.lock().await = Some(shutdown_tx);
        *self.handle.lock().await = Some(handle);

        info!(interval_secs = self.period.as_secs(), "Polling scheduler started");
        Ok(())
    }

    /// Stop the polling task and wait for it to finish. Idempotent.
    pub async fn stop(&self) -> Result<()> {
        if !self.running.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        if let Some(shutdown) = self.shutdown.lock().await.take() {
            let _ = shutdown.send(true);
        }

        if let Some(handle) = self.handle.lock().await.take() {
            if let Err(err) = handle.await {
                warn!(error = %err, "Polling task ended abnormally");
            }
        }

        info!("Polling scheduler stopped");
        Ok(())
    }

    /// Ask the running task for an immediate pass. Dropped when a pass is
    /// already running or the scheduler is stopped.
    pub fn trigger(&self) {
        self.trigger.notify_waiters();
    }

    /// Run a pass on the caller's task, sharing the reentrancy lock with
    /// the polling task.
    pub async fn sync_now(&self, force: bool) -> Result<SyncOutcome, SyncError> {
        self.sync.execute(force).await
    }
}

async fn run_pass(sync: &SyncProjects) {
    match sync.execute(false).await {
        Ok(SyncOutcome::Updated { counts, .. }) => {
            debug!(total = counts.total(), "Scheduled sync applied changes")
        }
        Ok(outcome) => debug!(?outcome, "Scheduled sync finished"),
        Err(err) => warn!(error = %err, "Scheduled sync failed, retrying on next tick"),
    }
}
