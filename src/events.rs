//! Event types for the aihub event system
//!
//! Provides the shared event enum and the EventBus used to fan realtime
//! analytics updates out to SSE subscribers.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::analytics::MetricsSnapshot;

/// aihub event types
///
/// Events are broadcast via [`EventBus`] and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HubEvent {
    /// Current metrics snapshot, emitted by the aggregation tick and after
    /// every tracked request
    MetricsUpdate {
        metrics: MetricsSnapshot,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A feature request finished and was recorded
    RequestTracked {
        tool: String,
        duration_ms: f64,
        success: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A session activity ping was recorded
    ActivityTracked {
        session_id: String,
        page: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A user's usage counter was reset to zero
    LimitReset {
        user_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl HubEvent {
    /// Event type name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            HubEvent::MetricsUpdate { .. } => "MetricsUpdate",
            HubEvent::RequestTracked { .. } => "RequestTracked",
            HubEvent::ActivityTracked { .. } => "ActivityTracked",
            HubEvent::LimitReset { .. } => "LimitReset",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// Wraps tokio::broadcast, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use aihub::events::{EventBus, HubEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit(HubEvent::LimitReset {
///     user_id: "user_1".to_string(),
///     timestamp: chrono::Utc::now(),
/// }).ok();
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<HubEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    ///
    /// `capacity` is the number of events buffered before old events are
    /// dropped for lagging subscribers.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: HubEvent) -> Result<usize, broadcast::error::SendError<HubEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Used for periodic updates where it is acceptable that no client is
    /// currently connected.
    pub fn emit_lossy(&self, event: HubEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
