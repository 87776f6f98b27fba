//! Active/inactive partition of a replica set.
//!
//! The primary (index 0) is tracked by its own flag instead of a slot in the
//! round-robin list, so demoting and re-promoting it can never shift replica
//! positions. Observers still see the familiar layout: the active list is the
//! primary (when active) followed by the active replicas in promotion order.
//!
//! Invariants, held after every mutation:
//! - active and inactive are disjoint and together cover `0..len`
//! - no index appears twice
//! - the active count never drops to zero

/// Index of the primary connection.
pub const PRIMARY: usize = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    len: usize,
    primary_active: bool,
    /// Active replica indices, in the order they (re)joined.
    replicas: Vec<usize>,
    /// Inactive indices, in the order they were demoted.
    inactive: Vec<usize>,
}

/// Result of a demotion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demotion {
    /// Moved to the inactive list.
    Demoted,
    /// Refused: it is the last active connection.
    LastActive,
    /// Already inactive.
    NotActive,
}

impl Partition {
    /// Every index starts active, in configured order.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            primary_active: len > 0,
            replicas: (1..len).collect(),
            inactive: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn active_count(&self) -> usize {
        usize::from(self.primary_active) + self.replicas.len()
    }

    pub fn is_primary_active(&self) -> bool {
        self.primary_active
    }

    /// Active replicas eligible for round-robin reads.
    pub fn active_replicas(&self) -> &[usize] {
        &self.replicas
    }

    /// Active indices, primary first.
    pub fn active(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.active_count());
        if self.primary_active {
            out.push(PRIMARY);
        }
        out.extend_from_slice(&self.replicas);
        out
    }

    pub fn inactive(&self) -> &[usize] {
        &self.inactive
    }

    pub fn is_active(&self, index: usize) -> bool {
        if index == PRIMARY {
            self.primary_active
        } else {
            self.replicas.contains(&index)
        }
    }

    /// Move an active index to the tail of the inactive list.
    pub fn demote(&mut self, index: usize) -> Demotion {
        if !self.is_active(index) {
            return Demotion::NotActive;
        }
        if self.active_count() <= 1 {
            return Demotion::LastActive;
        }

        if index == PRIMARY {
            self.primary_active = false;
        } else {
            self.replicas.retain(|&i| i != index);
        }
        self.inactive.push(index);
        Demotion::Demoted
    }

    /// Move an inactive index back into the active set.
    ///
    /// Replicas rejoin at the tail of the round-robin list. Returns false when
    /// the index was not inactive, so a promotion is never applied twice.
    pub fn promote(&mut self, index: usize) -> bool {
        let Some(pos) = self.inactive.iter().position(|&i| i == index) else {
            return false;
        };
        self.inactive.remove(pos);

        if index == PRIMARY {
            self.primary_active = true;
        } else {
            self.replicas.push(index);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(p: &Partition) {
        let mut all: Vec<usize> = p.active();
        all.extend_from_slice(p.inactive());
        all.sort_unstable();
        assert_eq!(all, (0..p.len()).collect::<Vec<_>>(), "partition must cover every index once");
        assert!(p.active_count() >= 1);
    }

    #[test]
    fn test_new_partition_all_active() {
        let p = Partition::new(3);
        assert_eq!(p.active(), vec![0, 1, 2]);
        assert!(p.inactive().is_empty());
        assert_eq!(p.active_count(), 3);
    }

    #[test]
    fn test_demote_and_promote_replica() {
        let mut p = Partition::new(3);

        assert_eq!(p.demote(1), Demotion::Demoted);
        assert_eq!(p.active(), vec![0, 2]);
        assert_eq!(p.inactive(), &[1]);
        assert_eq!(p.active_count(), 2);
        assert_covers(&p);

        assert!(p.promote(1));
        assert_eq!(p.active(), vec![0, 2, 1]);
        assert!(p.inactive().is_empty());
        assert_covers(&p);
    }

    #[test]
    fn test_last_active_is_never_demoted() {
        let mut p = Partition::new(1);
        assert_eq!(p.demote(0), Demotion::LastActive);
        assert_eq!(p.active(), vec![0]);

        let mut p = Partition::new(3);
        assert_eq!(p.demote(0), Demotion::Demoted);
        assert_eq!(p.demote(1), Demotion::Demoted);
        assert_eq!(p.demote(2), Demotion::LastActive);
        assert_eq!(p.active(), vec![2]);
        assert_covers(&p);
    }

    #[test]
    fn test_promotion_is_idempotent() {
        let mut p = Partition::new(3);
        assert!(!p.promote(2));
        assert_eq!(p.active(), vec![0, 1, 2]);

        p.demote(2);
        assert!(p.promote(2));
        assert!(!p.promote(2));
        assert_eq!(p.active(), vec![0, 1, 2]);
    }

    #[test]
    fn test_primary_keeps_head_position_after_rejoin() {
        let mut p = Partition::new(3);
        p.demote(0);
        assert_eq!(p.active(), vec![1, 2]);
        assert!(!p.is_primary_active());

        p.promote(0);
        assert_eq!(p.active(), vec![0, 1, 2]);
        assert_eq!(p.active_replicas(), &[1, 2]);
    }

    #[test]
    fn test_double_demote_is_noop() {
        let mut p = Partition::new(4);
        assert_eq!(p.demote(3), Demotion::Demoted);
        assert_eq!(p.demote(3), Demotion::NotActive);
        assert_eq!(p.inactive(), &[3]);
        assert_covers(&p);
    }
}
