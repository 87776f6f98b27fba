//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Heartbeat (heartbeat.rs):
//!     Periodic timer
//!     → ReplicaSet::probe (one pass over every connection)
//!     → Partition + status records updated
//!     → last beat recorded
//!
//! No heartbeat running:
//!     Status request
//!     → on-demand probe pass before reporting
//! ```
//!
//! # Design Decisions
//! - One beat task per replica set, started and stopped explicitly
//! - Stop waits for the task to exit, so no pass runs after it returns
//! - A single failed ping demotes; recovery needs a single successful ping

pub mod heartbeat;

pub use heartbeat::Heartbeat;
