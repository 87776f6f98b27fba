//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Probe passes, heartbeat, read routing produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Membership changes log at warn/info; steady state logs at debug
//! - Group and connection name on every event
//! - Metrics are cheap (atomic increments) and no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
