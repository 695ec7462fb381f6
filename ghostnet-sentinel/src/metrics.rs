//! Prometheus metrics installer and recording helpers.
//!
//! Every metric is registered once at [`install`] time and recorded through
//! the small helper functions below, so call sites never hand-roll a metric
//! name. The installer is a no-op when `metrics.enabled` is `false`, which
//! keeps the instrumentation calls themselves infallible either way.

use std::net::SocketAddr;
use std::str::FromStr;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsSettings;
use crate::error::{AppError, InfraError, Result};

/// Install the Prometheus exporter and register every metric this crate
/// emits. Returns `None` when metrics are disabled in configuration.
pub fn install(settings: &MetricsSettings) -> Result<Option<PrometheusHandle>> {
    if !settings.enabled {
        return Ok(None);
    }

    let addr = SocketAddr::from_str(&settings.socket_addr())
        .map_err(|err| AppError::Infra(InfraError::Config(config::ConfigError::Message(err.to_string()))))?;

    let handle = PrometheusBuilder::new()
        .with_http_listener(addr)
        .install_recorder()
        .map_err(|err| AppError::Infra(InfraError::Config(config::ConfigError::Message(err.to_string()))))?;

    describe_counter!(INGESTION_EVENTS_TOTAL, "Wallet events ingested, by wallet.");
    describe_counter!(INGESTION_FAILURES_TOTAL, "Ingestion tick failures, by wallet.");
    describe_histogram!(SCORING_LATENCY_SECONDS, "Time to score one wallet, in seconds.");
    describe_gauge!(ACTIVE_MONITORS, "Number of currently active wallet monitors.");
    describe_gauge!(HUB_CONNECTIONS, "Number of currently connected downstream clients.");
    describe_counter!(FLAG_WRITES_TOTAL, "Flag Registry write attempts, by outcome.");
    describe_counter!(BROADCASTS_TOTAL, "Hub broadcasts sent, by message type.");

    Ok(Some(handle))
}

const INGESTION_EVENTS_TOTAL: &str = "sentinel_ingestion_events_total";
const INGESTION_FAILURES_TOTAL: &str = "sentinel_ingestion_failures_total";
const SCORING_LATENCY_SECONDS: &str = "sentinel_scoring_latency_seconds";
const ACTIVE_MONITORS: &str = "sentinel_active_monitors";
const HUB_CONNECTIONS: &str = "sentinel_hub_connections";
const FLAG_WRITES_TOTAL: &str = "sentinel_flag_writes_total";
const BROADCASTS_TOTAL: &str = "sentinel_broadcasts_total";

/// Record that `count` events were ingested for `wallet`.
pub fn record_ingestion(wallet: &str, count: usize) {
    counter!(INGESTION_EVENTS_TOTAL, "wallet" => wallet.to_string()).increment(count as u64);
}

/// Record an ingestion tick failure for `wallet`.
pub fn record_ingestion_failure(wallet: &str) {
    counter!(INGESTION_FAILURES_TOTAL, "wallet" => wallet.to_string()).increment(1);
}

/// Record how long one scoring pass took.
pub fn record_scoring_latency(seconds: f64) {
    histogram!(SCORING_LATENCY_SECONDS).record(seconds);
}

/// Set the current number of active monitors.
pub fn set_active_monitors(count: usize) {
    gauge!(ACTIVE_MONITORS).set(count as f64);
}

/// Set the current number of Hub connections.
pub fn set_hub_connections(count: usize) {
    gauge!(HUB_CONNECTIONS).set(count as f64);
}

/// Record the outcome of one Flag Registry write attempt.
pub fn record_flag_write(outcome: &str) {
    counter!(FLAG_WRITES_TOTAL, "outcome" => outcome.to_string()).increment(1);
}

/// Record one Hub broadcast of `message_type`.
pub fn record_broadcast(message_type: &str) {
    counter!(BROADCASTS_TOTAL, "type" => message_type.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_settings_skip_installation() {
        let settings = MetricsSettings {
            enabled: false,
            host: "127.0.0.1".into(),
            port: 9090,
        };
        assert!(install(&settings).unwrap().is_none());
    }

    #[test]
    fn recording_helpers_do_not_panic_without_a_recorder() {
        record_ingestion("0xabc", 3);
        record_ingestion_failure("0xabc");
        record_scoring_latency(0.01);
        set_active_monitors(5);
        set_hub_connections(2);
        record_flag_write("success");
        record_broadcast("score_update");
    }
}
