//! Error types for replica set construction, probing and status.

use thiserror::Error;

/// Boxed driver error, so sets over different drivers share one error type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the routing engine.
///
/// Errors produced while *executing* a query are never wrapped here: the
/// closures passed to the routing entry points return their own error type
/// unchanged.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The target list was empty.
    #[error("no connection targets configured")]
    NoTargets,

    /// A target could not be opened. Handles opened before it have been closed.
    #[error("{name}: failed to open connection: {source}")]
    Open {
        name: String,
        #[source]
        source: BoxError,
    },

    /// A ping failed and the connection could not be demoted.
    #[error("{name}: {source}")]
    Probe {
        name: String,
        #[source]
        source: BoxError,
    },

    /// The set holds no connections. Unreachable after a successful open.
    #[error("no connection detected")]
    NoConnections,

    /// No group is registered under this name.
    #[error("group not found: {0}")]
    GroupNotFound(String),

    /// Closing a handle failed.
    #[error("{name}: failed to close connection: {source}")]
    Close {
        name: String,
        #[source]
        source: BoxError,
    },
}

impl PoolError {
    /// Name of the connection the error belongs to, if any.
    pub fn connection_name(&self) -> Option<&str> {
        match self {
            PoolError::Open { name, .. }
            | PoolError::Probe { name, .. }
            | PoolError::Close { name, .. } => Some(name),
            _ => None,
        }
    }
}
