//! In-process driver with switchable health.
//!
//! Every target name maps to a shared [`MockNode`]. Tests and demos flip a
//! node up or down and the next ping observes it, which makes failover
//! scenarios deterministic without a real database.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

use crate::driver::{Connection, Driver};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MockError {
    #[error("{0} is down")]
    Down(String),
    #[error("{0} refused to open")]
    OpenRefused(String),
    #[error("{0} is closed")]
    Closed(String),
}

/// Shared, switchable state behind one target.
#[derive(Debug)]
pub struct MockNode {
    target: String,
    healthy: AtomicBool,
    refuse_open: AtomicBool,
    closed: AtomicBool,
    pings: AtomicU64,
    queries: AtomicU64,
}

impl MockNode {
    fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            healthy: AtomicBool::new(true),
            refuse_open: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            pings: AtomicU64::new(0),
            queries: AtomicU64::new(0),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    /// Make the next `open` of this target fail.
    pub fn refuse_open(&self, refuse: bool) {
        self.refuse_open.store(refuse, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of pings received so far.
    pub fn pings(&self) -> u64 {
        self.pings.load(Ordering::SeqCst)
    }

    /// Number of queries served so far.
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }
}

/// Driver handing out [`MockConnection`]s.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    nodes: Arc<DashMap<String, Arc<MockNode>>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (or create) the control node for a target.
    pub fn node(&self, target: &str) -> Arc<MockNode> {
        self.nodes
            .entry(target.to_string())
            .or_insert_with(|| Arc::new(MockNode::new(target)))
            .clone()
    }
}

impl Driver for MockDriver {
    type Conn = MockConnection;

    async fn open(&self, target: &str) -> Result<MockConnection, MockError> {
        let node = self.node(target);
        if node.refuse_open.load(Ordering::SeqCst) {
            return Err(MockError::OpenRefused(target.to_string()));
        }
        node.closed.store(false, Ordering::SeqCst);
        Ok(MockConnection { node })
    }
}

/// Handle to a [`MockNode`].
#[derive(Debug)]
pub struct MockConnection {
    node: Arc<MockNode>,
}

impl MockConnection {
    pub fn node(&self) -> &Arc<MockNode> {
        &self.node
    }

    /// Serve a query: answers with the target name when the node is up.
    pub async fn query(&self, _sql: &str) -> Result<String, MockError> {
        if self.node.is_closed() {
            return Err(MockError::Closed(self.node.target.clone()));
        }
        if !self.node.is_healthy() {
            return Err(MockError::Down(self.node.target.clone()));
        }
        self.node.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.node.target.clone())
    }
}

impl Connection for MockConnection {
    type Error = MockError;

    async fn ping(&self) -> Result<(), MockError> {
        self.node.pings.fetch_add(1, Ordering::SeqCst);
        if self.node.is_closed() {
            return Err(MockError::Closed(self.node.target.clone()));
        }
        if self.node.is_healthy() {
            Ok(())
        } else {
            Err(MockError::Down(self.node.target.clone()))
        }
    }

    async fn close(&self) -> Result<(), MockError> {
        self.node.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
