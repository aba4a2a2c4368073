//! Prometheus metrics for webhook traffic.
//!
//! Metrics are exposed via a dedicated HTTP listener when `METRICS_PORT` is
//! non-zero. Recording functions are always safe to call: without an
//! installed exporter they are no-ops.
//!
//! # Available Metrics
//!
//! ## Counters
//! - `gmass_webhook_events_received_total` - Accepted events (label: event_type)
//! - `gmass_webhook_auth_failures_total` - Rejected requests (label: reason)
//! - `gmass_webhook_malformed_bodies_total` - Bodies that were not JSON (label: event_type)
//!
//! # Usage
//!
//! ```rust,ignore
//! use gmass_webhook::metrics::{init_metrics, record_event_received};
//!
//! init_metrics("0.0.0.0:9090".parse()?)?;
//! record_event_received(EventType::Opens);
//! ```

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{error, info};

use crate::models::EventType;

/// Metric names as constants for consistency.
pub mod names {
    pub const EVENTS_RECEIVED_TOTAL: &str = "gmass_webhook_events_received_total";
    pub const AUTH_FAILURES_TOTAL: &str = "gmass_webhook_auth_failures_total";
    pub const MALFORMED_BODIES_TOTAL: &str = "gmass_webhook_malformed_bodies_total";
}

/// Auth failure reasons used as the `reason` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingKey,
    InvalidKey,
}

impl AuthFailure {
    fn as_label(self) -> &'static str {
        match self {
            AuthFailure::MissingKey => "missing_key",
            AuthFailure::InvalidKey => "invalid_key",
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// Installs the global recorder and starts the exporter's HTTP listener on
/// `metrics_addr`.
///
/// # Errors
///
/// Returns a message if the exporter cannot be installed (e.g., the port is
/// taken or a recorder is already installed).
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::EVENTS_RECEIVED_TOTAL,
        "Total number of webhook events accepted"
    );
    describe_counter!(
        names::AUTH_FAILURES_TOTAL,
        "Total number of webhook requests rejected by API key authentication"
    );
    describe_counter!(
        names::MALFORMED_BODIES_TOTAL,
        "Total number of authenticated webhook requests with a non-JSON body"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

/// Record an accepted webhook event.
pub fn record_event_received(event_type: EventType) {
    counter!(names::EVENTS_RECEIVED_TOTAL, "event_type" => event_type.as_str()).increment(1);
}

/// Record a request rejected by the auth layer.
pub fn record_auth_failure(reason: AuthFailure) {
    counter!(names::AUTH_FAILURES_TOTAL, "reason" => reason.as_label()).increment(1);
}

/// Record a webhook whose body could not be parsed as JSON.
pub fn record_malformed_body(event_type: EventType) {
    counter!(names::MALFORMED_BODIES_TOTAL, "event_type" => event_type.as_str()).increment(1);
}
