//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check group names are present and unique
//! - Validate value ranges (intervals > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RouterConfig;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no replica groups configured")]
    NoGroups,

    #[error("group #{0} has an empty name")]
    EmptyGroupName(usize),

    #[error("group '{0}' is defined more than once")]
    DuplicateGroup(String),

    #[error("group '{0}' has no targets")]
    NoTargets(String),

    #[error("group '{group}' target #{position} is blank")]
    BlankTarget { group: String, position: usize },

    #[error("heartbeat.interval_ms must be greater than 0")]
    ZeroHeartbeatInterval,

    #[error("driver.connect_timeout_ms must be greater than 0")]
    ZeroConnectTimeout,

    #[error("retries.max_attempts must be at least 1")]
    ZeroRetryAttempts,

    #[error("retries.base_delay_ms ({base}) exceeds retries.max_delay_ms ({max})")]
    BackoffRange { base: u64, max: u64 },

    #[error("{field} is not a valid socket address: {value}")]
    BadAddress { field: &'static str, value: String },
}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.groups.is_empty() {
        errors.push(ValidationError::NoGroups);
    }

    let mut seen = HashSet::new();
    for (i, group) in config.groups.iter().enumerate() {
        if group.name.trim().is_empty() {
            errors.push(ValidationError::EmptyGroupName(i));
        } else if !seen.insert(group.name.as_str()) {
            errors.push(ValidationError::DuplicateGroup(group.name.clone()));
        }

        let targets = group.targets.to_vec();
        if targets.is_empty() {
            errors.push(ValidationError::NoTargets(group.name.clone()));
        }
        for (position, target) in targets.iter().enumerate() {
            if target.is_empty() {
                errors.push(ValidationError::BlankTarget {
                    group: group.name.clone(),
                    position,
                });
            }
        }
    }

    if config.heartbeat.interval_ms == 0 {
        errors.push(ValidationError::ZeroHeartbeatInterval);
    }
    if config.driver.connect_timeout_ms == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }

    if config.retries.enabled {
        if config.retries.max_attempts == 0 {
            errors.push(ValidationError::ZeroRetryAttempts);
        }
        if config.retries.base_delay_ms > config.retries.max_delay_ms {
            errors.push(ValidationError::BackoffRange {
                base: config.retries.base_delay_ms,
                max: config.retries.max_delay_ms,
            });
        }
    }

    if config.admin.enabled && config.admin.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadAddress {
            field: "admin.bind_address",
            value: config.admin.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::BadAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{GroupConfig, Targets};

    fn group(name: &str, targets: &[&str]) -> GroupConfig {
        GroupConfig {
            name: name.to_string(),
            targets: Targets::List(targets.iter().map(|t| t.to_string()).collect()),
        }
    }

    #[test]
    fn test_valid_config() {
        let mut config = RouterConfig::default();
        config.groups.push(group("orders", &["db1:5432", "db2:5432"]));
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = RouterConfig::default();
        config.groups.push(group("orders", &["db1:5432"]));
        config.groups.push(group("orders", &[]));
        config.groups.push(group("", &["db3:5432", " "]));
        config.heartbeat.interval_ms = 0;
        config.admin.bind_address = "not-an-address".into();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateGroup("orders".into())));
        assert!(errors.contains(&ValidationError::NoTargets("orders".into())));
        assert!(errors.contains(&ValidationError::EmptyGroupName(2)));
        assert!(errors.contains(&ValidationError::BlankTarget {
            group: String::new(),
            position: 1
        }));
        assert!(errors.contains(&ValidationError::ZeroHeartbeatInterval));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::BadAddress { field: "admin.bind_address", .. })));
    }

    #[test]
    fn test_empty_config_has_no_groups() {
        let errors = validate_config(&RouterConfig::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoGroups]);
    }

    #[test]
    fn test_retry_range_checked_only_when_enabled() {
        let mut config = RouterConfig::default();
        config.groups.push(group("orders", &["db1:5432"]));
        config.retries.base_delay_ms = 5000;
        assert!(validate_config(&config).is_ok());

        config.retries.enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::BackoffRange { base: 5000, max: 1000 }])
        );
    }
}
