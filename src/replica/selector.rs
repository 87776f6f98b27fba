//! Round-robin read selection.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::replica::partition::{Partition, PRIMARY};

/// Read selector.
/// Stores a wrapping counter to rotate through the active replicas.
///
/// The counter is not updated atomically with the partition it indexes: a
/// pick may combine a counter value with a slightly newer or older snapshot.
/// Balancing is eventual, which is all reads need.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicU64,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the rotation from a known position.
    pub fn starting_at(start: u64) -> Self {
        Self {
            counter: AtomicU64::new(start),
        }
    }

    /// Pick the connection index that serves the next read.
    ///
    /// Falls back to the primary when no replica is active. The counter only
    /// advances when there is a rotation to make.
    pub fn select(&self, partition: &Partition) -> usize {
        let replicas = partition.active_replicas();
        if replicas.is_empty() {
            return PRIMARY;
        }
        if replicas.len() == 1 {
            return replicas[0];
        }

        let ticket = self.counter.fetch_add(1, Ordering::Relaxed);
        replicas[(ticket % replicas.len() as u64) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_only_always_selects_primary() {
        let rr = RoundRobin::new();
        let p = Partition::new(1);
        for _ in 0..5 {
            assert_eq!(rr.select(&p), 0);
        }
    }

    #[test]
    fn test_round_robin_covers_each_replica_once() {
        let rr = RoundRobin::new();
        let p = Partition::new(4);

        let first: Vec<usize> = (0..3).map(|_| rr.select(&p)).collect();
        assert_eq!(first, vec![1, 2, 3]);

        let second: Vec<usize> = (0..3).map(|_| rr.select(&p)).collect();
        assert_eq!(second, vec![1, 2, 3]);
    }

    #[test]
    fn test_skips_demoted_replica() {
        let rr = RoundRobin::new();
        let mut p = Partition::new(3);
        p.demote(1);

        for _ in 0..4 {
            assert_eq!(rr.select(&p), 2);
        }
    }

    #[test]
    fn test_all_replicas_down_falls_back_to_primary() {
        let rr = RoundRobin::new();
        let mut p = Partition::new(3);
        p.demote(1);
        p.demote(2);
        assert_eq!(rr.select(&p), 0);
    }

    #[test]
    fn test_demoted_primary_does_not_pin_reads() {
        let rr = RoundRobin::new();
        let mut p = Partition::new(3);
        p.demote(0);

        let picks: Vec<usize> = (0..4).map(|_| rr.select(&p)).collect();
        assert_eq!(picks, vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_counter_wraps() {
        let rr = RoundRobin::starting_at(u64::MAX);
        let p = Partition::new(3);
        assert_eq!(rr.select(&p), 2);
        assert_eq!(rr.select(&p), 1);
    }
}
