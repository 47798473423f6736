//! Server-Sent Events stream.
//!
//! Streams bus events to connected clients. A new connection first
//! receives the current metrics snapshot, then relays live events;
//! lagged subscribers are dropped by the bus without affecting others.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::Utc;
use futures::stream::{self, Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::events::HubEvent;
use crate::AppState;

const KEEP_ALIVE_SECS: u64 = 15;

/// GET /events - SSE event stream
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE client connected");

    // Subscribe before snapshotting so no update is missed in between.
    let rx = state.event_bus.subscribe();

    let initial = HubEvent::MetricsUpdate {
        metrics: state.analytics.snapshot().await,
        timestamp: Utc::now(),
    };
    let initial = stream::iter(to_sse_event(&initial).map(Ok));

    let live = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => to_sse_event(&event).map(Ok),
            Err(e) => {
                // Lagged or closed receiver; skip and keep streaming.
                warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    Sse::new(initial.chain(live)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(KEEP_ALIVE_SECS))
            .text("keep-alive"),
    )
}

fn to_sse_event(event: &HubEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Event::default().event(event.event_type()).data(json)),
        Err(e) => {
            warn!("Failed to serialize event: {}", e);
            None
        }
    }
}
