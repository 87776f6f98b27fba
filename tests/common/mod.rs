//! Shared helpers for integration tests.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use replica_router::driver::mock::{MockConnection, MockDriver};
use replica_router::ReplicaSet;

/// Open a set over mock targets; every target starts healthy.
pub async fn open_mock_set(driver: &MockDriver, targets: &[&str]) -> Arc<ReplicaSet<MockConnection>> {
    ReplicaSet::open(driver, "test", targets)
        .await
        .expect("mock set should open")
}

/// Poll `check` until it holds or `timeout` passes.
#[allow(dead_code)]
pub async fn wait_until<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
