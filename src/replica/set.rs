//! Replica set: the registry of configured connections and its routing entry points.
//!
//! # Responsibilities
//! - Open every configured target (position 0 is the primary)
//! - Own the shared partition and status records behind one lock
//! - Route reads round-robin over healthy replicas, writes to the primary
//! - Close every handle on shutdown

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;

use crate::driver::{Connection, Driver};
use crate::error::PoolError;
use crate::health::heartbeat::Heartbeat;
use crate::observability::metrics;
use crate::replica::partition::{Partition, PRIMARY};
use crate::replica::selector::RoundRobin;
use crate::replica::status::{connection_name, ConnectionStatus, StatusReport};
use crate::resilience::retries::RetryPolicy;

/// Group name used when the caller does not give one.
pub const DEFAULT_GROUP_NAME: &str = "replica_set";

/// Partition and status records. Mutated together, only by probe passes.
#[derive(Debug)]
pub(crate) struct SetState {
    pub(crate) partition: Partition,
    pub(crate) statuses: Vec<ConnectionStatus>,
}

/// One primary and zero or more replicas behind a single routing policy.
pub struct ReplicaSet<C> {
    pub(crate) group: String,
    pub(crate) conns: Vec<Arc<C>>,
    pub(crate) state: RwLock<SetState>,
    pub(crate) selector: RoundRobin,
    /// Serializes probe passes (heartbeat ticks and on-demand probes).
    pub(crate) probe_gate: AsyncMutex<()>,
    pub(crate) heartbeat: Heartbeat,
}

impl<C> std::fmt::Debug for ReplicaSet<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicaSet")
            .field("group", &self.group)
            .field("connections", &self.conns.len())
            .field("state", &*self.state.read())
            .finish()
    }
}

impl<C: Connection> ReplicaSet<C> {
    /// Open every target and run one probe pass.
    ///
    /// A failing initial probe leaves the set degraded, not unusable: the
    /// failure is logged and shows up in [`status`](Self::status).
    pub async fn open<D, S>(driver: &D, group: &str, targets: &[S]) -> Result<Arc<Self>, PoolError>
    where
        D: Driver<Conn = C>,
        S: AsRef<str>,
    {
        let set = Self::open_handles(driver, group, targets).await?;
        if let Err(e) = set.probe().await {
            tracing::warn!(group = %set.group, error = %e, "Initial probe reported a failure");
        }
        Ok(set)
    }

    /// Like [`open`](Self::open), but an initial probe failure is returned as
    /// the error after every handle has been closed.
    pub async fn open_strict<D, S>(
        driver: &D,
        group: &str,
        targets: &[S],
    ) -> Result<Arc<Self>, PoolError>
    where
        D: Driver<Conn = C>,
        S: AsRef<str>,
    {
        let set = Self::open_handles(driver, group, targets).await?;
        if let Err(e) = set.probe().await {
            if let Err(close_err) = close_handles(&set.group, &set.conns).await {
                tracing::warn!(group = %set.group, error = %close_err, "Close after failed probe also failed");
            }
            return Err(e);
        }
        Ok(set)
    }

    async fn open_handles<D, S>(
        driver: &D,
        group: &str,
        targets: &[S],
    ) -> Result<Arc<Self>, PoolError>
    where
        D: Driver<Conn = C>,
        S: AsRef<str>,
    {
        if targets.is_empty() {
            return Err(PoolError::NoTargets);
        }
        let group = if group.is_empty() { DEFAULT_GROUP_NAME } else { group };

        let mut conns = Vec::with_capacity(targets.len());
        for (index, target) in targets.iter().enumerate() {
            match driver.open(target.as_ref()).await {
                Ok(conn) => conns.push(Arc::new(conn)),
                Err(e) => {
                    let name = connection_name(index);
                    tracing::error!(group = %group, name = %name, error = %e, "Failed to open connection");
                    if let Err(close_err) = close_handles(group, &conns).await {
                        tracing::warn!(group = %group, error = %close_err, "Failed to close already-opened handle");
                    }
                    return Err(PoolError::Open {
                        name,
                        source: Box::new(e),
                    });
                }
            }
        }

        let len = conns.len();
        tracing::info!(group = %group, connections = len, replicas = len - 1, "Replica set opened");

        Ok(Arc::new(Self {
            group: group.to_string(),
            conns,
            state: RwLock::new(SetState {
                partition: Partition::new(len),
                statuses: (0..len).map(ConnectionStatus::new).collect(),
            }),
            selector: RoundRobin::new(),
            probe_gate: AsyncMutex::new(()),
            heartbeat: Heartbeat::new(),
        }))
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Number of configured connections.
    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }

    /// Handle at a configuration position.
    pub fn connection(&self, index: usize) -> Option<Arc<C>> {
        self.conns.get(index).cloned()
    }

    // --- Routing ---

    /// Index of the connection that serves the next read.
    pub fn select_read_target(&self) -> usize {
        let state = self.state.read();
        self.selector.select(&state.partition)
    }

    /// The primary handle. Writes and fresh reads go here regardless of health.
    pub fn primary(&self) -> Arc<C> {
        self.conns[PRIMARY].clone()
    }

    /// A handle for a read, chosen round-robin among healthy replicas.
    pub fn replica(&self) -> Arc<C> {
        let index = self.select_read_target();
        metrics::record_read(&self.group, &connection_name(index));
        self.conns[index].clone()
    }

    /// Run a read on a replica.
    pub async fn read<F, Fut, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(Arc<C>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        f(self.replica()).await
    }

    /// Run a read that must see the primary's data.
    pub async fn read_primary<F, Fut, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(Arc<C>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        f(self.primary()).await
    }

    /// Run a write on the primary. Never retried.
    pub async fn write<F, Fut, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(Arc<C>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        f(self.primary()).await
    }

    /// Run a write on the primary and panic if it fails.
    pub async fn must_write<F, Fut, T, E>(&self, f: F) -> T
    where
        F: FnOnce(Arc<C>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        match self.write(f).await {
            Ok(value) => value,
            Err(e) => panic!("{}: write on primary failed: {}", self.group, e),
        }
    }

    /// Run a read, retrying failures on freshly selected replicas.
    pub async fn read_with_retry<F, Fut, T, E>(&self, policy: &RetryPolicy, mut f: F) -> Result<T, E>
    where
        F: FnMut(Arc<C>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        policy.retry(|_attempt| f(self.replica())).await
    }

    // --- Partition observers ---

    /// Active indices, primary first when it is active.
    pub fn active_indices(&self) -> Vec<usize> {
        self.state.read().partition.active()
    }

    pub fn inactive_indices(&self) -> Vec<usize> {
        self.state.read().partition.inactive().to_vec()
    }

    pub fn active_count(&self) -> usize {
        self.state.read().partition.active_count()
    }

    /// Consistent copy of the whole partition.
    pub fn partition(&self) -> Partition {
        self.state.read().partition.clone()
    }

    // --- Heartbeat ---

    /// Start probing every `interval` in the background. No-op when already running.
    pub fn start_heartbeat(self: &Arc<Self>, interval: Duration) -> bool {
        self.heartbeat.start(self, interval)
    }

    /// Stop background probing. Once this returns no further probe pass runs.
    pub async fn stop_heartbeat(&self) -> bool {
        self.heartbeat.stop(&self.group).await
    }

    pub fn is_heartbeat_running(&self) -> bool {
        self.heartbeat.is_running()
    }

    // --- Status ---

    /// Per-connection status, probing first when no heartbeat keeps it fresh.
    pub async fn status(&self) -> Result<StatusReport, PoolError> {
        if self.conns.is_empty() {
            return Err(PoolError::NoConnections);
        }

        if !self.heartbeat.is_running() {
            if let Err(e) = self.probe().await {
                tracing::debug!(group = %self.group, error = %e, "On-demand probe reported a failure");
            }
        }

        let db_list = self.state.read().statuses.clone();
        Ok(StatusReport {
            db_list,
            heartbeat: self.heartbeat.is_running(),
            last_beat: self.heartbeat.last_beat(),
        })
    }

    /// Status records as they are now, without probing.
    pub fn connection_statuses(&self) -> Vec<ConnectionStatus> {
        self.state.read().statuses.clone()
    }

    /// Stop the heartbeat and close every handle.
    pub async fn close(&self) -> Result<(), PoolError> {
        self.stop_heartbeat().await;
        let result = close_handles(&self.group, &self.conns).await;
        tracing::info!(group = %self.group, "Replica set closed");
        result
    }
}

/// Close every handle, returning the first failure.
async fn close_handles<C: Connection>(group: &str, conns: &[Arc<C>]) -> Result<(), PoolError> {
    let mut first_error = None;
    for (index, conn) in conns.iter().enumerate() {
        if let Err(e) = conn.close().await {
            let name = connection_name(index);
            tracing::warn!(group = %group, name = %name, error = %e, "Failed to close connection");
            first_error.get_or_insert(PoolError::Close {
                name,
                source: Box::new(e),
            });
        }
    }
    first_error.map_or(Ok(()), Err)
}
