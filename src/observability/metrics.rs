//! Metrics collection and exposition.
//!
//! # Metrics
//! - `replica_connection_up` (gauge): 1=connected, 0=failing, by group and name
//! - `replica_probe_failures_total` (counter): failed pings
//! - `replica_demotions_total` / `replica_promotions_total` (counter): membership changes
//! - `replica_reads_total` (counter): reads routed, by target connection
//! - `replica_heartbeat_beats_total` (counter): completed heartbeat passes

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_connection_up(group: &str, name: &str, up: bool) {
    gauge!("replica_connection_up", "group" => group.to_string(), "name" => name.to_string())
        .set(if up { 1.0 } else { 0.0 });
}

pub fn record_probe_failure(group: &str, name: &str) {
    counter!("replica_probe_failures_total", "group" => group.to_string(), "name" => name.to_string())
        .increment(1);
}

pub fn record_demotion(group: &str, name: &str) {
    counter!("replica_demotions_total", "group" => group.to_string(), "name" => name.to_string())
        .increment(1);
}

pub fn record_promotion(group: &str, name: &str) {
    counter!("replica_promotions_total", "group" => group.to_string(), "name" => name.to_string())
        .increment(1);
}

pub fn record_read(group: &str, name: &str) {
    counter!("replica_reads_total", "group" => group.to_string(), "name" => name.to_string())
        .increment(1);
}

pub fn record_beat(group: &str) {
    counter!("replica_heartbeat_beats_total", "group" => group.to_string()).increment(1);
}
