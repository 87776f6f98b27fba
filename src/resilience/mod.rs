//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Read through ReplicaSet::read_with_retry:
//!     → replica selected
//!     → caller closure runs
//!     → On failure: retries.rs (attempt budget left?)
//!         → exponential delay + jitter
//!         → next replica selected, closure runs again
//! ```
//!
//! # Design Decisions
//! - Retries are opt-in and exist for reads only
//! - Writes are never retried: an ambiguous failure may already have applied
//! - Each attempt re-selects, so a dead replica is not hammered

pub mod retries;

pub use retries::RetryPolicy;
