//! Realtime analytics data types
//!
//! Wire types serialize with camelCase field names to preserve the public
//! dashboard contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sessions idle longer than this are dropped by the aggregation sweep
pub const SESSION_TTL_SECONDS: i64 = 300;

/// A live dashboard session
///
/// Created on the first activity ping, refreshed on every subsequent one,
/// and removed once `last_activity` falls behind the sweep cutoff. Held in
/// memory only; lifetime is bounded by process uptime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    /// Opaque session identifier chosen by the client
    pub session_id: String,
    /// Authenticated user, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Timestamp of the most recent ping
    pub last_activity: DateTime<Utc>,
    /// Page the session last reported
    pub current_page: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Activity ping payload used to create or refresh a session
#[derive(Debug, Clone, Default)]
pub struct ActivityPing {
    pub session_id: String,
    pub user_id: Option<String>,
    /// Defaults to "unknown" when the client does not report a page
    pub page: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Immutable copy of the running metrics
///
/// `response_time` is a fixed-weight smoothed value, not a true average:
/// each recorded duration is folded in as `(previous + duration) / 2`.
/// `error_rate` is updated as `(previous + 1) / total_requests` on failure
/// only, carried over unchanged from the system this service replaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Count of unexpired sessions as of the last sweep
    pub active_users: usize,
    /// Monotonic count of recorded requests, reset only on restart
    pub total_requests: u64,
    pub response_time: f64,
    pub error_rate: f64,
    /// Per-tool request counts
    pub tool_usage: HashMap<String, u64>,
    pub last_updated: DateTime<Utc>,
}

/// Per-tool share of all tool-usage events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolUsageStat {
    pub count: u64,
    /// Percentage of the total across all tools; the values over a
    /// non-empty map sum to 100
    pub percentage: f64,
}
