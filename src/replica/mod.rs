//! Replica set routing engine.
//!
//! # Data Flow
//! ```text
//! open(targets)
//!     → set.rs (open handles, seed partition with every index)
//!     → probe.rs (initial pass fills status)
//!
//! read request
//!     → selector.rs (round-robin over active replicas, primary fallback)
//!     → caller closure runs on the chosen handle
//!
//! write request
//!     → primary handle, no selection
//!
//! heartbeat tick / on-demand status
//!     → probe.rs (demote failing, promote recovered)
//!     → partition.rs + status.rs updated under one write lock
//! ```
//!
//! # Design Decisions
//! - Primary is positional (configuration index 0), never elected
//! - The primary is kept out of the round-robin list
//! - Partition and status share one reader-writer lock
//! - The selection counter is a separate atomic; balancing is eventual

pub mod groups;
pub mod partition;
pub mod probe;
pub mod selector;
pub mod set;
pub mod status;

pub use groups::GroupRegistry;
pub use partition::Partition;
pub use set::ReplicaSet;
pub use status::{ConnectionStatus, StatusReport};
