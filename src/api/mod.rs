//! HTTP API handlers for aihub

pub mod analytics;
pub mod files;
pub mod generate;
pub mod health;
pub mod media;
pub mod sse;
pub mod usage;

pub use health::health_routes;
pub use sse::event_stream;
pub use usage::usage_routes;

use axum::Router;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Routes for the gated generation features.
pub fn feature_routes() -> Router<AppState> {
    generate::routes().merge(media::routes())
}

/// Realtime analytics routes.
pub fn analytics_routes() -> Router<AppState> {
    analytics::routes()
}

/// File processing routes.
pub fn file_routes() -> Router<AppState> {
    files::routes()
}

/// Pre-call gate check for a feature request.
///
/// Returns whether the caller holds an active subscription; a caller
/// that is neither subscribed nor under the free-tier ceiling gets the
/// 403 upgrade prompt.
pub(crate) async fn enforce_gate(state: &AppState, user_id: &str) -> ApiResult<bool> {
    let is_pro = state.gate.has_active_subscription(user_id).await;
    if !is_pro && !state.gate.check(user_id).await {
        tracing::info!(user_id = %user_id, "Free-tier ceiling reached");
        return Err(ApiError::LimitExceeded);
    }
    Ok(is_pro)
}

/// Post-call accounting for a feature request.
///
/// Increments the usage counter unless the caller is subscribed, and
/// records the outcome in the metrics aggregator. A fallback artifact
/// is still a successful response on both counts; `success` is false
/// only when the response itself reports failure. Counter write
/// failures are logged, not surfaced; the caller already has their
/// artifact.
pub(crate) async fn settle_request(
    state: &AppState,
    user_id: &str,
    is_pro: bool,
    tool: &str,
    duration_ms: f64,
    success: bool,
) {
    if !is_pro {
        if let Err(e) = state.gate.increment(user_id).await {
            tracing::error!(error = %e, user_id = %user_id, "Failed to increment usage counter");
        }
    }
    state.analytics.record_request(tool, duration_ms, success).await;
}
