use chrono::{DateTime, Utc};
use serde::Serialize;

/// Response for `GET /`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Always "active" while the server is accepting requests
    pub status: &'static str,
    /// "<service name> Webhook Server is running"
    pub message: String,
    /// Current timestamp
    pub timestamp: DateTime<Utc>,
}

impl StatusResponse {
    /// Build the running-status body for the given service name.
    pub fn active(service_name: &str) -> Self {
        Self {
            status: "active",
            message: format!("{service_name} Webhook Server is running"),
            timestamp: Utc::now(),
        }
    }
}

/// Response for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self { status: "healthy" }
    }
}

/// Acknowledgment returned for every accepted webhook.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub status: &'static str,
}

impl AckResponse {
    pub fn success() -> Self {
        Self { status: "success" }
    }
}
