//! JSON bodies the adapter produces on its own behalf.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reason reported while serving the degraded route table.
pub const REASON_ROUTES_INIT_FAILED: &str = "routes_init_failed";

/// Reason reported by the entry point when it cannot serve at all.
pub const REASON_INIT_FAILED: &str = "init_failed";

/// Message used when a registration failure carried no detail.
pub const DEFAULT_DEGRADED_MESSAGE: &str = "Route initialization failed";

/// Health report of a fully initialized application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub platform: String,
    pub timestamp: DateTime<Utc>,
    /// Same instant as `timestamp`, for clients reading the short key
    pub ts: DateTime<Utc>,
}

impl HealthReport {
    pub fn ok(platform: &str) -> Self {
        let now = Utc::now();
        Self {
            status: "OK".to_string(),
            platform: platform.to_string(),
            timestamp: now,
            ts: now,
        }
    }
}

/// Health report while route registration has failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradedHealth {
    pub status: String,
    pub reason: String,
    pub message: String,
}

impl DegradedHealth {
    pub fn new(message: &str) -> Self {
        Self {
            status: "DEGRADED".to_string(),
            reason: REASON_ROUTES_INIT_FAILED.to_string(),
            message: message.to_string(),
        }
    }
}

/// Catch-all body while route registration has failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unavailable {
    pub ok: bool,
    pub reason: String,
    pub message: String,
}

impl Unavailable {
    pub fn new(message: &str) -> Self {
        let message = if message.trim().is_empty() {
            DEFAULT_DEGRADED_MESSAGE
        } else {
            message
        };
        Self {
            ok: false,
            reason: REASON_ROUTES_INIT_FAILED.to_string(),
            message: message.to_string(),
        }
    }
}

/// Body returned by the entry point when building or delegating fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureEnvelope {
    pub ok: bool,
    pub reason: String,
    pub kind: String,
    pub message: String,
    pub path: Option<String>,
    pub has_database_url: bool,
    pub has_supabase: bool,
}
