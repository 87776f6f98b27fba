//! Named replica sets.
//!
//! # Responsibilities
//! - Keep several replica sets side by side, keyed by group name
//! - Produce the status map (group name → status report)
//! - Start heartbeats and close every group on shutdown

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::driver::{Connection, Driver};
use crate::error::PoolError;
use crate::replica::set::ReplicaSet;
use crate::replica::status::StatusReport;

/// Registry of replica sets by group name.
pub struct GroupRegistry<C> {
    groups: DashMap<String, Arc<ReplicaSet<C>>>,
}

impl<C> Default for GroupRegistry<C> {
    fn default() -> Self {
        Self {
            groups: DashMap::new(),
        }
    }
}

impl<C: Connection> GroupRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a set and register it under its group name.
    ///
    /// An existing group with the same name is replaced; the old set is returned
    /// so the caller can close it.
    pub async fn open_group<D, S>(
        &self,
        driver: &D,
        name: &str,
        targets: &[S],
    ) -> Result<(Arc<ReplicaSet<C>>, Option<Arc<ReplicaSet<C>>>), PoolError>
    where
        D: Driver<Conn = C>,
        S: AsRef<str>,
    {
        let set = ReplicaSet::open(driver, name, targets).await?;
        let previous = self.insert(set.clone());
        Ok((set, previous))
    }

    /// Register an already-open set.
    pub fn insert(&self, set: Arc<ReplicaSet<C>>) -> Option<Arc<ReplicaSet<C>>> {
        self.groups.insert(set.group().to_string(), set)
    }

    pub fn get(&self, name: &str) -> Result<Arc<ReplicaSet<C>>, PoolError> {
        self.groups
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| PoolError::GroupNotFound(name.to_string()))
    }

    pub fn remove(&self, name: &str) -> Option<Arc<ReplicaSet<C>>> {
        self.groups.remove(name).map(|(_, set)| set)
    }

    /// Group names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn sets(&self) -> Vec<Arc<ReplicaSet<C>>> {
        // Collect first: DashMap shard guards must not be held across awaits.
        self.groups.iter().map(|e| e.value().clone()).collect()
    }

    /// Status of every group.
    pub async fn status(&self) -> Result<BTreeMap<String, StatusReport>, PoolError> {
        let mut out = BTreeMap::new();
        for set in self.sets() {
            let report = set.status().await?;
            out.insert(set.group().to_string(), report);
        }
        Ok(out)
    }

    /// Start a heartbeat on every group that does not have one.
    pub fn start_heartbeats(&self, interval: Duration) -> usize {
        self.sets()
            .iter()
            .filter(|set| set.start_heartbeat(interval))
            .count()
    }

    /// Close and unregister every group, returning the first failure.
    pub async fn close_all(&self) -> Result<(), PoolError> {
        let mut first_error = None;
        for set in self.sets() {
            self.groups.remove(set.group());
            if let Err(e) = set.close().await {
                tracing::warn!(group = %set.group(), error = %e, "Failed to close group");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
