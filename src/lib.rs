//! Client-side read/write routing over a primary and its replicas.
//!
//! A [`ReplicaSet`] owns one primary (configuration position 0) and any number
//! of replicas. Writes and fresh reads go to the primary; other reads rotate
//! across healthy replicas. A probe pass, run on demand or by the background
//! heartbeat, demotes connections that stop answering and promotes them again
//! once they recover.
//!
//! ```ignore
//! let driver = TcpDriver::new(Duration::from_secs(3));
//! let set = ReplicaSet::open(&driver, "orders", &["db1:5432", "db2:5432"]).await?;
//! set.start_heartbeat(Duration::from_secs(2));
//! let replica = set.replica();
//! ```

pub mod admin;
pub mod config;
pub mod driver;
pub mod error;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod replica;
pub mod resilience;

pub use config::schema::RouterConfig;
pub use driver::{Connection, Driver};
pub use error::PoolError;
pub use lifecycle::Shutdown;
pub use replica::{GroupRegistry, ReplicaSet, StatusReport};
pub use resilience::RetryPolicy;
