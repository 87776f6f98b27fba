//! Database driver seam.
//!
//! # Data Flow
//! ```text
//! target descriptor (DSN)
//!     → Driver::open
//!     → Connection handle (owned by ReplicaSet, shared as Arc)
//!         → ping()   (health probe)
//!         → caller closures (query execution, opaque to the router)
//!         → close()  (shutdown)
//! ```
//!
//! # Design Decisions
//! - The router never interprets queries; execution happens in caller closures
//! - Handles must tolerate concurrent ping and execute calls
//! - Ping latency is bounded by the driver, not by the router

pub mod mock;
pub mod tcp;

use std::future::Future;

/// A single open database handle.
pub trait Connection: Send + Sync + 'static {
    /// Error produced by ping and close.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Check that the database behind this handle answers.
    fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Release the handle.
    fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Opens handles from target descriptors.
pub trait Driver: Send + Sync {
    type Conn: Connection;

    fn open(
        &self,
        target: &str,
    ) -> impl Future<Output = Result<Self::Conn, <Self::Conn as Connection>::Error>> + Send;
}
