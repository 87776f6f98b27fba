//! Health probe pass.
//!
//! # Responsibilities
//! - Ping every active connection; demote the ones that fail
//! - Ping every inactive connection; promote the ones that answer
//! - Keep status records in step with partition membership
//!
//! # Design Decisions
//! - Pings run without holding the state lock; each membership change is
//!   applied under the write lock as one update of partition and status
//! - Passes are serialized, so the membership lists walked by a pass cannot
//!   change underneath it
//! - A failing last active connection ends the pass at once: the error is
//!   returned and neither the partition nor its status record changes

use chrono::Utc;

use crate::driver::Connection;
use crate::error::PoolError;
use crate::observability::metrics;
use crate::replica::partition::Demotion;
use crate::replica::set::ReplicaSet;
use crate::replica::status::connection_name;

impl<C: Connection> ReplicaSet<C> {
    /// Run one probe pass and return the last error it observed.
    ///
    /// If the only active connection fails, its error is returned right away
    /// and the promotion phase is skipped.
    pub async fn probe(&self) -> Result<(), PoolError> {
        let _pass = self.probe_gate.lock().await;
        let mut last_error = None;

        // Active → inactive
        let active = self.state.read().partition.active();
        for index in active {
            let outcome = self.conns[index].ping().await;
            match self.apply_active_ping(index, outcome) {
                Ok(()) => {}
                Err((e, Demotion::LastActive)) => return Err(e),
                Err((e, _)) => last_error = Some(e),
            }
        }

        // Inactive → active
        let inactive = self.state.read().partition.inactive().to_vec();
        for index in inactive {
            let outcome = self.conns[index].ping().await;
            if let Err(e) = self.apply_inactive_ping(index, outcome) {
                last_error = Some(e);
            }
        }

        last_error.map_or(Ok(()), Err)
    }

    fn apply_active_ping(
        &self,
        index: usize,
        outcome: Result<(), C::Error>,
    ) -> Result<(), (PoolError, Demotion)> {
        let name = connection_name(index);
        let mut state = self.state.write();

        let e = match outcome {
            Ok(()) => {
                state.statuses[index].mark_up(Utc::now());
                tracing::debug!(group = %self.group, name = %name, "Probe passed");
                metrics::record_connection_up(&self.group, &name, true);
                return Ok(());
            }
            Err(e) => e,
        };

        metrics::record_probe_failure(&self.group, &name);
        let demotion = state.partition.demote(index);

        match demotion {
            Demotion::Demoted => {
                state.statuses[index].mark_down(format!("{}: {}", name, e));
                tracing::warn!(
                    group = %self.group,
                    name = %name,
                    index,
                    error = %e,
                    active = state.partition.active_count(),
                    "Connection demoted to inactive"
                );
                metrics::record_demotion(&self.group, &name);
                metrics::record_connection_up(&self.group, &name, false);
            }
            Demotion::LastActive => {
                tracing::error!(
                    group = %self.group,
                    name = %name,
                    index,
                    error = %e,
                    "Last active connection is failing, keeping it in rotation"
                );
            }
            Demotion::NotActive => {
                state.statuses[index].mark_down(format!("{}: {}", name, e));
            }
        }

        let err = PoolError::Probe {
            name,
            source: Box::new(e),
        };
        Err((err, demotion))
    }

    fn apply_inactive_ping(&self, index: usize, outcome: Result<(), C::Error>) -> Result<(), PoolError> {
        let name = connection_name(index);
        let mut state = self.state.write();

        match outcome {
            Ok(()) => {
                state.statuses[index].mark_up(Utc::now());
                if state.partition.promote(index) {
                    tracing::info!(
                        group = %self.group,
                        name = %name,
                        index,
                        active = state.partition.active_count(),
                        "Connection recovered, promoted to active"
                    );
                    metrics::record_promotion(&self.group, &name);
                }
                metrics::record_connection_up(&self.group, &name, true);
                Ok(())
            }
            Err(e) => {
                state.statuses[index].mark_down(format!("{}: {}", name, e));
                tracing::debug!(group = %self.group, name = %name, error = %e, "Inactive connection still failing");
                metrics::record_probe_failure(&self.group, &name);
                Err(PoolError::Probe {
                    name,
                    source: Box::new(e),
                })
            }
        }
    }
}
