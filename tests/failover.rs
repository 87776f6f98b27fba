//! Failover and routing behaviour of a replica set under injected failures.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use replica_router::driver::mock::{MockDriver, MockError};
use replica_router::{PoolError, RetryPolicy};

mod common;

#[tokio::test]
async fn test_replica_failure_and_recovery_scenario() {
    let driver = MockDriver::new();
    let set = common::open_mock_set(&driver, &["primary", "replicaA", "replicaB"]).await;

    assert_eq!(set.active_indices(), vec![0, 1, 2]);
    assert_eq!(set.active_count(), 3);

    driver.node("replicaA").set_healthy(false);
    assert!(set.probe().await.is_err());
    assert_eq!(set.active_indices(), vec![0, 2]);
    assert_eq!(set.inactive_indices(), vec![1]);
    assert_eq!(set.active_count(), 2);
    let status = &set.connection_statuses()[1];
    assert_eq!(status.name, "slave-1");
    assert!(!status.connected);
    assert!(status.error.is_some());

    driver.node("replicaA").set_healthy(true);
    assert!(set.probe().await.is_ok());
    assert_eq!(set.active_indices(), vec![0, 2, 1]);
    assert!(set.inactive_indices().is_empty());
    assert_eq!(set.active_count(), 3);
}

#[tokio::test]
async fn test_single_primary_failure_scenario() {
    let driver = MockDriver::new();
    let set = common::open_mock_set(&driver, &["primary"]).await;

    driver.node("primary").set_healthy(false);
    let err = set.probe().await.unwrap_err();
    assert!(matches!(err, PoolError::Probe { ref name, .. } if name == "master"));
    assert_eq!(set.active_indices(), vec![0]);
    assert_eq!(set.active_count(), 1);
    assert_eq!(set.select_read_target(), 0);
}

#[tokio::test]
async fn test_round_robin_visits_each_replica() {
    let driver = MockDriver::new();
    let set = common::open_mock_set(&driver, &["p", "r1", "r2", "r3"]).await;

    let picks: HashSet<usize> = (0..3).map(|_| set.select_read_target()).collect();
    assert_eq!(picks, HashSet::from([1, 2, 3]));

    let served: Vec<String> = {
        let mut out = Vec::new();
        for _ in 0..3 {
            out.push(set.read(|c| async move { c.query("SELECT 1").await }).await.unwrap());
        }
        out
    };
    let served: HashSet<String> = served.into_iter().collect();
    assert_eq!(served.len(), 3);
    assert!(!served.contains("p"));
}

#[tokio::test]
async fn test_primary_only_reads_stay_on_primary() {
    let driver = MockDriver::new();
    let set = common::open_mock_set(&driver, &["p"]).await;
    for _ in 0..5 {
        assert_eq!(set.select_read_target(), 0);
        let res = set.read(|c| async move { c.query("SELECT 1").await }).await;
        assert_eq!(res.unwrap(), "p");
    }
}

#[tokio::test]
async fn test_reads_fall_back_to_primary_when_replicas_down() {
    let driver = MockDriver::new();
    let set = common::open_mock_set(&driver, &["p", "r1", "r2"]).await;

    driver.node("r1").set_healthy(false);
    driver.node("r2").set_healthy(false);
    set.probe().await.unwrap_err();

    assert_eq!(set.active_indices(), vec![0]);
    for _ in 0..4 {
        assert_eq!(set.select_read_target(), 0);
    }
}

#[tokio::test]
async fn test_demoted_primary_still_receives_writes() {
    let driver = MockDriver::new();
    let set = common::open_mock_set(&driver, &["p", "r1", "r2"]).await;

    driver.node("p").set_healthy(false);
    set.probe().await.unwrap_err();
    assert_eq!(set.active_indices(), vec![1, 2]);

    // Reads rotate over both replicas instead of pinning one.
    let picks: HashSet<usize> = (0..4).map(|_| set.select_read_target()).collect();
    assert_eq!(picks, HashSet::from([1, 2]));

    let write = set.write(|c| async move { c.query("INSERT").await }).await;
    assert_eq!(write, Err(MockError::Down("p".into())));
    let fresh = set.read_primary(|c| async move { c.query("SELECT").await }).await;
    assert_eq!(fresh, Err(MockError::Down("p".into())));

    driver.node("p").set_healthy(true);
    set.probe().await.unwrap();
    assert_eq!(set.active_indices(), vec![0, 1, 2]);
}

#[tokio::test]
async fn test_active_set_never_empties() {
    let driver = MockDriver::new();
    let targets = ["p", "r1", "r2", "r3"];
    let set = common::open_mock_set(&driver, &targets).await;

    for t in targets {
        driver.node(t).set_healthy(false);
    }
    for _ in 0..3 {
        set.probe().await.unwrap_err();
        assert_eq!(set.active_count(), 1);
        assert_eq!(set.inactive_indices().len(), 3);
    }
}

#[tokio::test]
async fn test_partition_invariants_under_random_failures() {
    let driver = MockDriver::new();
    let targets = ["p", "r1", "r2", "r3", "r4"];
    let set = common::open_mock_set(&driver, &targets).await;
    let mut rng = rand::thread_rng();

    for _ in 0..200 {
        for t in targets {
            driver.node(t).set_healthy(rng.gen_bool(0.6));
        }
        let _ = set.probe().await;

        let partition = set.partition();
        let active = partition.active();
        let inactive = partition.inactive().to_vec();

        let active_set: HashSet<usize> = active.iter().copied().collect();
        let inactive_set: HashSet<usize> = inactive.iter().copied().collect();
        assert_eq!(active_set.len(), active.len(), "duplicate in active list");
        assert_eq!(inactive_set.len(), inactive.len(), "duplicate in inactive list");
        assert!(active_set.is_disjoint(&inactive_set));
        let all: HashSet<usize> = active_set.union(&inactive_set).copied().collect();
        assert_eq!(all, (0..targets.len()).collect::<HashSet<_>>());
        assert_eq!(partition.active_count(), active.len());
        assert!(partition.active_count() >= 1);

        if let Some(&head) = active.first() {
            if partition.is_primary_active() {
                assert_eq!(head, 0);
            }
        }
    }
}

#[tokio::test]
async fn test_read_retry_moves_to_next_replica() {
    let driver = MockDriver::new();
    let set = common::open_mock_set(&driver, &["p", "r1", "r2"]).await;

    // r1 dies between probes: still selected, but the retry lands on r2.
    driver.node("r1").set_healthy(false);
    let policy = RetryPolicy {
        max_attempts: 2,
        base_delay_ms: 1,
        max_delay_ms: 2,
    };

    for _ in 0..4 {
        let res = set
            .read_with_retry(&policy, |c| async move { c.query("SELECT").await })
            .await;
        assert_eq!(res.unwrap(), "r2");
    }
}

#[tokio::test]
async fn test_concurrent_reads_during_probes() {
    let driver = MockDriver::new();
    let targets = ["p", "r1", "r2", "r3"];
    let set = common::open_mock_set(&driver, &targets).await;

    let mut readers = Vec::new();
    for _ in 0..8 {
        let set = Arc::clone(&set);
        readers.push(tokio::spawn(async move {
            for _ in 0..500 {
                let index = set.select_read_target();
                assert!(index < 4);
                tokio::task::yield_now().await;
            }
        }));
    }

    for round in 0..50 {
        driver.node("r2").set_healthy(round % 2 == 0);
        driver.node("r3").set_healthy(round % 3 != 0);
        let _ = set.probe().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    for reader in readers {
        reader.await.unwrap();
    }
}

#[tokio::test]
async fn test_concurrent_probes_are_serialized() {
    let driver = MockDriver::new();
    let set = common::open_mock_set(&driver, &["p", "r1", "r2"]).await;
    driver.node("r1").set_healthy(false);

    let a = tokio::spawn({
        let set = Arc::clone(&set);
        async move { set.probe().await.is_err() }
    });
    let b = tokio::spawn({
        let set = Arc::clone(&set);
        async move { set.probe().await.is_err() }
    });
    assert!(a.await.unwrap());
    assert!(b.await.unwrap());

    assert_eq!(set.active_indices(), vec![0, 2]);
    assert_eq!(set.inactive_indices(), vec![1]);
}
