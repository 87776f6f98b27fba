//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the replica router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Replica groups, each a primary followed by its replicas.
    pub groups: Vec<GroupConfig>,

    /// Background heartbeat settings.
    pub heartbeat: HeartbeatConfig,

    /// Driver settings.
    pub driver: DriverConfig,

    /// Read retry settings.
    pub retries: RetryConfig,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// One replica group.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupConfig {
    /// Group name used in status output and the admin API.
    pub name: String,

    /// Connection targets. The first entry is the primary.
    pub targets: Targets,
}

/// Target list, either as an array or as one `;`-separated string.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Targets {
    List(Vec<String>),
    Joined(String),
}

impl Targets {
    /// Targets in configured order, trimmed. Blank entries are kept so
    /// validation can report them.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Targets::List(list) => list.iter().map(|t| t.trim().to_string()).collect(),
            Targets::Joined(joined) => parse_sources(joined),
        }
    }
}

/// Split a `;`-separated source list. A trailing separator is ignored.
pub fn parse_sources(sources: &str) -> Vec<String> {
    let trimmed = sources.trim().trim_end_matches(';');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split(';').map(|s| s.trim().to_string()).collect()
}

/// Heartbeat configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    /// Start a heartbeat for every group at startup.
    pub enabled: bool,

    /// Interval between probe passes in milliseconds.
    pub interval_ms: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 2000,
        }
    }
}

/// Driver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Bound on a single ping, in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 3000,
        }
    }
}

/// Retry configuration. Applies to reads only.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_attempts: 3,
            base_delay_ms: 50,
            max_delay_ms: 1000,
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8091".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9091".to_string(),
        }
    }
}
