//! Per-connection status records and the status snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name given to configuration position `index`.
pub fn connection_name(index: usize) -> String {
    if index == 0 {
        "master".to_string()
    } else {
        format!("slave-{}", index)
    }
}

/// Health record for one connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub name: String,
    pub connected: bool,
    /// Last time a ping succeeded.
    pub last_active: Option<DateTime<Utc>>,
    /// Message of the last failed ping, cleared on success.
    pub error: Option<String>,
}

impl ConnectionStatus {
    pub fn new(index: usize) -> Self {
        Self {
            name: connection_name(index),
            connected: true,
            last_active: Some(Utc::now()),
            error: None,
        }
    }

    pub(crate) fn mark_up(&mut self, at: DateTime<Utc>) {
        self.connected = true;
        self.last_active = Some(at);
        self.error = None;
    }

    pub(crate) fn mark_down(&mut self, error: String) {
        self.connected = false;
        self.error = Some(error);
    }
}

/// Status snapshot of one replica set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub db_list: Vec<ConnectionStatus>,
    pub heartbeat: bool,
    pub last_beat: Option<DateTime<Utc>>,
}
