//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Open groups → Start heartbeats → Serve admin API
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop admin API → Stop heartbeats → Close every handle
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: a group that cannot be opened aborts startup
//! - Heartbeats stop before handles close, so no ping hits a closed handle

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
