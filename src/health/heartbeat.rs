//! Background heartbeat.
//!
//! # Responsibilities
//! - Run a probe pass on every tick of a fixed interval
//! - Record the time of the last completed beat
//! - Start and stop without ever running two beat tasks for one set

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::driver::Connection;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::replica::ReplicaSet;

struct BeatTask {
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

/// Heartbeat state owned by a replica set.
#[derive(Default)]
pub struct Heartbeat {
    task: Mutex<Option<BeatTask>>,
    last_beat: RwLock<Option<DateTime<Utc>>>,
}

impl Heartbeat {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a beat task is alive. A task that exited on its own does not count.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    pub fn last_beat(&self) -> Option<DateTime<Utc>> {
        *self.last_beat.read()
    }

    fn record_beat(&self, at: DateTime<Utc>) {
        *self.last_beat.write() = Some(at);
    }

    /// Spawn the beat task. Returns false when one is already running or
    /// `interval` is zero.
    ///
    /// The task holds only a weak reference, so dropping the last handle to
    /// the set also ends the task.
    pub fn start<C: Connection>(&self, set: &Arc<ReplicaSet<C>>, interval: Duration) -> bool {
        if interval.is_zero() {
            tracing::warn!(group = %set.group(), "Heartbeat interval must be non-zero, not starting");
            return false;
        }

        let mut task = self.task.lock();
        match task.as_ref() {
            Some(running) if !running.handle.is_finished() => {
                tracing::debug!(group = %set.group(), "Heartbeat already running");
                return false;
            }
            Some(_) => {
                tracing::warn!(group = %set.group(), "Previous heartbeat task exited, replacing it");
            }
            None => {}
        }

        let shutdown = Shutdown::new();
        let stop = shutdown.subscribe();
        let weak = Arc::downgrade(set);
        let handle = tokio::spawn(run(weak, interval, stop));

        tracing::info!(group = %set.group(), interval_ms = interval.as_millis() as u64, "Heartbeat started");
        *task = Some(BeatTask { shutdown, handle });
        true
    }

    /// Signal the beat task and wait for it to exit. Returns false when none was running.
    ///
    /// A pass already in flight finishes first; none starts afterwards.
    pub async fn stop(&self, group: &str) -> bool {
        let Some(task) = self.task.lock().take() else {
            return false;
        };

        task.shutdown.trigger();
        if let Err(e) = task.handle.await {
            tracing::warn!(group = %group, error = %e, "Heartbeat task ended abnormally");
        }
        tracing::info!(group = %group, "Heartbeat stopped");
        true
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.shutdown.trigger();
        }
    }
}

async fn run<C: Connection>(
    set: Weak<ReplicaSet<C>>,
    interval: Duration,
    mut stop: tokio::sync::broadcast::Receiver<()>,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; beats start one interval in.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = stop.recv() => {
                tracing::debug!("Heartbeat received stop signal, exiting loop");
                break;
            }
            _ = ticker.tick() => {
                let Some(set) = set.upgrade() else {
                    break;
                };
                if let Err(e) = set.probe().await {
                    tracing::debug!(group = %set.group(), error = %e, "Heartbeat probe reported a failure");
                }
                set.heartbeat.record_beat(Utc::now());
                metrics::record_beat(set.group());
            }
        }
    }
}
