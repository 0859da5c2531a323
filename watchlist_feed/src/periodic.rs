//! Cancellable periodic task.
//!
//! `PeriodicTask::spawn` runs a synchronous job on the current tokio runtime
//! once per period, first firing one full period after the spawn. Every
//! firing runs behind a gate that `cancel` also takes, which gives the
//! cancellation guarantee: once `cancel` returns, the job is not running and
//! will not run again.
//!
//! The job must not call `cancel` on its own task; the gate is not reentrant.
//! Dropping the handle stops future firings without waiting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::debug;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use watchlist_common::{Result, WatchError};

/// Handle to a running periodic job. Dropping it cancels the job.
pub struct PeriodicTask {
    cancelled: Arc<AtomicBool>,
    gate: Arc<Mutex<()>>,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Spawn `job` to run every `period`.
    ///
    /// Fails with `WatchError::Runtime` when called outside a tokio runtime.
    pub fn spawn<F>(period: Duration, mut job: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        if period.is_zero() {
            return Err(WatchError::Runtime("period must be greater than zero".to_string()));
        }
        let runtime = Handle::try_current().map_err(|e| WatchError::Runtime(e.to_string()))?;
        let cancelled = Arc::new(AtomicBool::new(false));
        let gate = Arc::new(Mutex::new(()));
        let task_cancelled = Arc::clone(&cancelled);
        let task_gate = Arc::clone(&gate);

        let handle = runtime.spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately.
            timer.tick().await;

            loop {
                timer.tick().await;
                let _firing = task_gate.lock().unwrap_or_else(PoisonError::into_inner);
                if task_cancelled.load(Ordering::SeqCst) {
                    break;
                }
                job();
            }
            debug!("Periodic task loop finished");
        });

        Ok(Self {
            cancelled,
            gate,
            handle,
        })
    }

    /// Stop the job. Idempotent; waits for an in-flight firing to complete.
    pub fn cancel(&self) {
        if self.stop() {
            let _wait = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Whether `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn stop(&self) -> bool {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.handle.abort();
        true
    }
}

impl Drop for PeriodicTask {
    // The last owner may be released from inside the job itself, so dropping
    // never waits on the gate.
    fn drop(&mut self) {
        self.stop();
    }
}
