//! In-memory realtime analytics
//!
//! Tracks live dashboard sessions and running request metrics for the
//! analytics endpoints and the SSE stream. One service instance is
//! constructed at startup and shared through router state; nothing here
//! is persisted.

mod types;

pub use types::{ActiveSession, ActivityPing, MetricsSnapshot, ToolUsageStat, SESSION_TTL_SECONDS};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::events::{EventBus, HubEvent};

/// Seconds between aggregation sweeps / metrics broadcasts
pub const BROADCAST_INTERVAL_SECS: u64 = 5;

struct Inner {
    sessions: HashMap<String, ActiveSession>,
    active_users: usize,
    total_requests: u64,
    response_time: f64,
    error_rate: f64,
    tool_usage: HashMap<String, u64>,
    last_updated: DateTime<Utc>,
}

impl Inner {
    fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            active_users: self.active_users,
            total_requests: self.total_requests,
            response_time: self.response_time,
            error_rate: self.error_rate,
            tool_usage: self.tool_usage.clone(),
            last_updated: self.last_updated,
        }
    }

    /// Drop sessions idle past the TTL and refresh the active-user count.
    /// Returns how many sessions were removed.
    fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = now - ChronoDuration::seconds(SESSION_TTL_SECONDS);
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.last_activity >= cutoff);
        self.active_users = self.sessions.len();
        self.last_updated = now;
        before - self.sessions.len()
    }
}

/// Realtime session registry and metrics aggregator
///
/// All mutation happens in short critical sections; the lock is never
/// held across an await point or a bus emit.
pub struct RealtimeAnalytics {
    inner: RwLock<Inner>,
    event_bus: EventBus,
}

impl RealtimeAnalytics {
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            inner: RwLock::new(Inner {
                sessions: HashMap::new(),
                active_users: 0,
                total_requests: 0,
                response_time: 0.0,
                error_rate: 0.0,
                tool_usage: HashMap::new(),
                last_updated: Utc::now(),
            }),
            event_bus,
        }
    }

    /// Create or refresh a session from an activity ping
    pub async fn record_activity(&self, ping: ActivityPing) {
        self.record_activity_at(ping, Utc::now()).await;
    }

    /// Activity recording with an explicit clock, used by tests to age
    /// sessions past the sweep cutoff
    pub async fn record_activity_at(&self, ping: ActivityPing, now: DateTime<Utc>) {
        let page = ping.page.unwrap_or_else(|| "unknown".to_string());
        // Each ping replaces the whole entry; fields a later ping omits are
        // deliberately cleared, not carried over.
        let session = ActiveSession {
            session_id: ping.session_id.clone(),
            user_id: ping.user_id,
            last_activity: now,
            current_page: page.clone(),
            user_agent: ping.user_agent,
            ip_address: ping.ip_address,
        };
        let snapshot = {
            let mut inner = self.inner.write().await;
            inner.sessions.insert(ping.session_id.clone(), session);
            inner.sweep(now);
            inner.snapshot()
        };

        debug!(session_id = %ping.session_id, page = %page, "Session activity recorded");
        self.event_bus.emit_lossy(HubEvent::ActivityTracked {
            session_id: ping.session_id,
            page,
            timestamp: now,
        });
        self.event_bus.emit_lossy(HubEvent::MetricsUpdate {
            metrics: snapshot,
            timestamp: now,
        });
    }

    /// Record the outcome of one feature request
    ///
    /// Updates the running counters exactly as the dashboard expects:
    /// `response_time = (response_time + duration_ms) / 2`, and on failure
    /// `error_rate = (error_rate + 1) / total_requests`.
    pub async fn record_request(&self, tool: &str, duration_ms: f64, success: bool) {
        let now = Utc::now();
        let snapshot = {
            let mut inner = self.inner.write().await;
            inner.total_requests += 1;
            inner.response_time = (inner.response_time + duration_ms) / 2.0;
            if !success {
                inner.error_rate = (inner.error_rate + 1.0) / inner.total_requests as f64;
            }
            *inner.tool_usage.entry(tool.to_string()).or_insert(0) += 1;
            inner.last_updated = now;
            inner.snapshot()
        };

        debug!(tool, duration_ms, success, "Request recorded");
        self.event_bus.emit_lossy(HubEvent::RequestTracked {
            tool: tool.to_string(),
            duration_ms,
            success,
            timestamp: now,
        });
        self.event_bus.emit_lossy(HubEvent::MetricsUpdate {
            metrics: snapshot,
            timestamp: now,
        });
    }

    /// One aggregation pass: drop expired sessions, refresh the active-user
    /// count, and broadcast the resulting snapshot
    pub async fn tick(&self) {
        self.tick_at(Utc::now()).await;
    }

    pub async fn tick_at(&self, now: DateTime<Utc>) {
        let (removed, snapshot) = {
            let mut inner = self.inner.write().await;
            let removed = inner.sweep(now);
            (removed, inner.snapshot())
        };

        if removed > 0 {
            debug!(removed, "Expired sessions swept");
        }
        self.event_bus.emit_lossy(HubEvent::MetricsUpdate {
            metrics: snapshot,
            timestamp: now,
        });
    }

    /// Immutable copy of the current metrics
    pub async fn snapshot(&self) -> MetricsSnapshot {
        self.inner.read().await.snapshot()
    }

    /// Snapshot copy of all unexpired sessions
    pub async fn active_sessions(&self) -> Vec<ActiveSession> {
        self.inner.read().await.sessions.values().cloned().collect()
    }

    /// Number of unexpired sessions
    pub async fn session_count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    /// Per-tool usage counts and their share of the total
    pub async fn tool_usage_stats(&self) -> HashMap<String, ToolUsageStat> {
        let inner = self.inner.read().await;
        let total: u64 = inner.tool_usage.values().sum();
        inner
            .tool_usage
            .iter()
            .map(|(tool, &count)| {
                let percentage = if total > 0 {
                    (count as f64 / total as f64) * 100.0
                } else {
                    0.0
                };
                (tool.clone(), ToolUsageStat { count, percentage })
            })
            .collect()
    }
}

/// Spawn the periodic aggregation task
///
/// Ticks every [`BROADCAST_INTERVAL_SECS`] seconds for the life of the
/// process; subscribers that lag are dropped by the bus rather than
/// applying back-pressure here.
pub fn spawn_aggregation_tick(analytics: Arc<RealtimeAnalytics>) -> JoinHandle<()> {
    info!(
        interval_secs = BROADCAST_INTERVAL_SECS,
        "Starting analytics aggregation tick"
    );
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(BROADCAST_INTERVAL_SECS));
        loop {
            interval.tick().await;
            analytics.tick().await;
        }
    })
}
