//! Realtime analytics endpoints.
//!
//! The GET endpoint doubles as an activity ping: a `session_id` query
//! parameter refreshes the caller's session before the snapshot is
//! taken. The POST endpoint accepts either an activity ping or a
//! request outcome; the track endpoint takes the wider validated event
//! vocabulary and folds tool-usage events into the request metrics.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::analytics::{ActiveSession, ActivityPing, MetricsSnapshot, ToolUsageStat};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RealtimeQuery {
    #[serde(alias = "sessionId")]
    pub session_id: Option<String>,
    pub page: Option<String>,
}

/// Activity ping or request outcome; exactly one of `session_id` and
/// `tool_name` decides which.
#[derive(Debug, Deserialize)]
pub struct RealtimeUpdate {
    #[serde(alias = "sessionId")]
    pub session_id: Option<String>,
    pub page: Option<String>,
    #[serde(alias = "toolName")]
    pub tool_name: Option<String>,
    #[serde(alias = "durationMs")]
    pub duration_ms: Option<f64>,
    pub success: Option<bool>,
}

/// Closed vocabulary for the track endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsEventType {
    ToolUsage,
    UserLogin,
    UserSignup,
    PaymentSuccess,
    ApiRequest,
    ErrorOccurred,
    PerformanceMetric,
}

impl AnalyticsEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalyticsEventType::ToolUsage => "tool_usage",
            AnalyticsEventType::UserLogin => "user_login",
            AnalyticsEventType::UserSignup => "user_signup",
            AnalyticsEventType::PaymentSuccess => "payment_success",
            AnalyticsEventType::ApiRequest => "api_request",
            AnalyticsEventType::ErrorOccurred => "error_occurred",
            AnalyticsEventType::PerformanceMetric => "performance_metric",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    #[serde(alias = "eventType")]
    pub event_type: AnalyticsEventType,
    #[serde(alias = "userId")]
    pub user_id: Option<String>,
    #[serde(alias = "sessionId")]
    pub session_id: Option<String>,
    #[serde(alias = "toolName")]
    pub tool_name: Option<String>,
    #[serde(alias = "durationMs")]
    pub duration_ms: Option<f64>,
    pub success: Option<bool>,
    pub metadata: Option<Value>,
}

/// Snapshot payload for the polling dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeData {
    pub metrics: MetricsSnapshot,
    pub active_sessions: Vec<ActiveSession>,
    pub tool_usage_stats: HashMap<String, ToolUsageStat>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RealtimeResponse {
    pub success: bool,
    pub data: RealtimeData,
}

#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub success: bool,
}

/// GET /api/analytics/realtime
pub async fn realtime_snapshot(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    headers: HeaderMap,
    Query(query): Query<RealtimeQuery>,
) -> Json<RealtimeResponse> {
    if let Some(session_id) = query.session_id {
        let ping = ActivityPing {
            session_id,
            user_id: user.map(|u| u.0),
            page: query.page,
            user_agent: header_value(&headers, "user-agent"),
            ip_address: header_value(&headers, "x-forwarded-for"),
        };
        state.analytics.record_activity(ping).await;
    }

    Json(RealtimeResponse {
        success: true,
        data: RealtimeData {
            metrics: state.analytics.snapshot().await,
            active_sessions: state.analytics.active_sessions().await,
            tool_usage_stats: state.analytics.tool_usage_stats().await,
            timestamp: Utc::now(),
        },
    })
}

/// POST /api/analytics/realtime
pub async fn realtime_update(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    headers: HeaderMap,
    Json(update): Json<RealtimeUpdate>,
) -> ApiResult<Json<AckResponse>> {
    if let Some(tool_name) = update.tool_name {
        state
            .analytics
            .record_request(
                &tool_name,
                update.duration_ms.unwrap_or(0.0),
                update.success.unwrap_or(true),
            )
            .await;
    } else if let Some(session_id) = update.session_id {
        let ping = ActivityPing {
            session_id,
            user_id: user.map(|u| u.0),
            page: update.page,
            user_agent: header_value(&headers, "user-agent"),
            ip_address: header_value(&headers, "x-forwarded-for"),
        };
        state.analytics.record_activity(ping).await;
    } else {
        return Err(ApiError::BadRequest(
            "Either session_id or tool_name is required".to_string(),
        ));
    }

    Ok(Json(AckResponse { success: true }))
}

/// POST /api/analytics/track
pub async fn track_event(
    State(state): State<AppState>,
    Json(event): Json<TrackRequest>,
) -> Json<AckResponse> {
    match (event.event_type, &event.tool_name) {
        (AnalyticsEventType::ToolUsage, Some(tool_name)) => {
            state
                .analytics
                .record_request(
                    tool_name,
                    event.duration_ms.unwrap_or(0.0),
                    event.success.unwrap_or(true),
                )
                .await;
        }
        _ => {
            tracing::info!(
                event_type = event.event_type.as_str(),
                user_id = event.user_id.as_deref().unwrap_or("-"),
                session_id = event.session_id.as_deref().unwrap_or("-"),
                "Analytics event tracked"
            );
        }
    }

    Json(AckResponse { success: true })
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/analytics/realtime",
            get(realtime_snapshot).post(realtime_update),
        )
        .route("/api/analytics/track", post(track_event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_deserialize_from_snake_case_only() {
        let event: AnalyticsEventType = serde_json::from_str("\"tool_usage\"").unwrap();
        assert_eq!(event, AnalyticsEventType::ToolUsage);

        assert!(serde_json::from_str::<AnalyticsEventType>("\"page_view\"").is_err());
    }

    #[test]
    fn update_payload_accepts_both_naming_conventions() {
        let snake: RealtimeUpdate =
            serde_json::from_str(r#"{"session_id": "s1", "page": "/x"}"#).unwrap();
        assert_eq!(snake.session_id.as_deref(), Some("s1"));

        let camel: RealtimeUpdate =
            serde_json::from_str(r#"{"toolName": "chat", "durationMs": 12.5}"#).unwrap();
        assert_eq!(camel.tool_name.as_deref(), Some("chat"));
        assert_eq!(camel.duration_ms, Some(12.5));
    }
}
