//! aihub library interface
//!
//! AI feature gateway: proxies prompts to hosted inference providers
//! behind a per-user usage-limit gate, and tracks realtime usage
//! analytics served over polling and SSE endpoints.

pub mod analytics;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod files;
pub mod providers;
pub mod usage;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::analytics::RealtimeAnalytics;
use crate::events::EventBus;
use crate::providers::assemblyai::AssemblyAiClient;
use crate::providers::fallback::FallbackCatalog;
use crate::providers::huggingface::HuggingFaceClient;
use crate::usage::UsageGate;

/// Application state shared across handlers
///
/// Every service is constructed in `main` (or a test harness) and
/// injected here; nothing in the crate reaches for process-wide state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (usage counters, subscriptions)
    pub db: SqlitePool,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Session registry and metrics aggregator
    pub analytics: Arc<RealtimeAnalytics>,
    /// Free-tier usage enforcement
    pub gate: UsageGate,
    /// Hugging Face inference client
    pub hf: HuggingFaceClient,
    /// AssemblyAI LeMUR client
    pub lemur: AssemblyAiClient,
    /// Static fallback artifacts
    pub catalog: Arc<FallbackCatalog>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: SqlitePool,
        event_bus: EventBus,
        analytics: Arc<RealtimeAnalytics>,
        gate: UsageGate,
        hf: HuggingFaceClient,
        lemur: AssemblyAiClient,
        catalog: Arc<FallbackCatalog>,
    ) -> Self {
        Self {
            db,
            event_bus,
            analytics,
            gate,
            hf,
            lemur,
            catalog,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::feature_routes())
        .merge(api::analytics_routes())
        .merge(api::usage_routes())
        .merge(api::file_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
