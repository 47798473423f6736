//! Liveness and status endpoints

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Service status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Unexpired dashboard sessions
    pub active_sessions: usize,
    /// Requests recorded since startup
    pub total_requests: u64,
    /// Connected SSE subscribers
    pub sse_subscribers: usize,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "aihub",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /status
pub async fn service_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let snapshot = state.analytics.snapshot().await;

    Json(StatusResponse {
        status: "ok",
        uptime_seconds: uptime.num_seconds().max(0) as u64,
        active_sessions: state.analytics.session_count().await,
        total_requests: snapshot.total_requests,
        sse_subscribers: state.event_bus.subscriber_count(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(service_status))
}
