//! Usage counter endpoints.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::events::HubEvent;
use crate::AppState;

/// Caller's standing against the free-tier ceiling.
#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub count: u32,
    pub limit: u32,
    pub remaining: u32,
    pub is_pro: bool,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
    pub message: &'static str,
}

/// GET /api/usage
pub async fn usage_status(
    State(state): State<AppState>,
    user: AuthUser,
) -> Json<UsageResponse> {
    Json(UsageResponse {
        count: state.gate.count(user.id()).await,
        limit: state.gate.limit(),
        remaining: state.gate.remaining(user.id()).await,
        is_pro: state.gate.has_active_subscription(user.id()).await,
    })
}

/// GET /api/limit-reset
pub async fn limit_reset(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ResetResponse>> {
    state.gate.reset(user.id()).await?;

    tracing::info!(user_id = %user.id(), "Usage counter reset");
    state.event_bus.emit_lossy(HubEvent::LimitReset {
        user_id: user.0,
        timestamp: Utc::now(),
    });

    Ok(Json(ResetResponse {
        success: true,
        message: "API limit reset successfully",
    }))
}

pub fn usage_routes() -> Router<AppState> {
    Router::new()
        .route("/api/usage", get(usage_status))
        .route("/api/limit-reset", get(limit_reset))
}
