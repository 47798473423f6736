//! Integration tests for the aihub API endpoints
//!
//! All tests run against an in-memory database with no provider keys
//! configured, so every generation feature answers from its fallback
//! path (demo mode).

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

use aihub::analytics::RealtimeAnalytics;
use aihub::db::subscriptions::{self, UserSubscription};
use aihub::events::EventBus;
use aihub::providers::assemblyai::AssemblyAiClient;
use aihub::providers::fallback::FallbackCatalog;
use aihub::providers::huggingface::HuggingFaceClient;
use aihub::usage::UsageGate;
use aihub::AppState;

const USER: &str = "user_test";

/// Test helper: app with an in-memory database and demo-mode clients
async fn create_test_app_with_limit(limit: u32, bypass: bool) -> (Router, sqlx::SqlitePool) {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    aihub::db::init_tables(&pool)
        .await
        .expect("Failed to initialize database schema");

    let event_bus = EventBus::new(100);
    let analytics = Arc::new(RealtimeAnalytics::new(event_bus.clone()));
    let gate = UsageGate::new(pool.clone(), limit, bypass);
    let hf = HuggingFaceClient::new(None).expect("client");
    let lemur = AssemblyAiClient::new(None).expect("client");
    let catalog = Arc::new(FallbackCatalog::default());

    let state = AppState::new(pool.clone(), event_bus, analytics, gate, hf, lemur, catalog);
    (aihub::build_router(state), pool)
}

async fn create_test_app() -> (Router, sqlx::SqlitePool) {
    create_test_app_with_limit(5, false).await
}

/// Test helper: send a request and parse the JSON response
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("authorization", format!("Bearer {}", user));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn messages_body(content: &str) -> Value {
    json!({ "messages": [{ "role": "user", "content": content }] })
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = send(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "aihub");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_status_endpoint() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = send(&app, "GET", "/status", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["uptime_seconds"].is_u64());
    assert_eq!(json["total_requests"], 0);
    assert_eq!(json["active_sessions"], 0);
}

#[tokio::test]
async fn test_gated_route_requires_identity() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/conversation",
        None,
        Some(messages_body("hello")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_conversation_demo_mode_serves_fallback() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/conversation",
        Some(USER),
        Some(messages_body("hello there")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["role"], "assistant");
    assert_eq!(json["fallback"], true);
    assert!(!json["content"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_conversation_rejects_empty_messages() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/conversation",
        Some(USER),
        Some(json!({ "messages": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_code_demo_mode_serves_language_snippet() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/code",
        Some(USER),
        Some(messages_body("write python fibonacci")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["fallback"], true);
    let content = json["content"].as_str().unwrap();
    assert!(content.starts_with("```python"));
    assert!(content.contains("fibonacci"));
}

#[tokio::test]
async fn test_content_demo_mode_serves_fallback_copy() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/content",
        Some(USER),
        Some(json!({ "prompt": "a post about rust", "content_type": "social" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["fallback"], true);
    assert!(!json["response"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_image_demo_mode_serves_fallback_urls() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/image",
        Some(USER),
        Some(json!({ "prompt": "a lighthouse", "amount": "2", "resolution": "512x512" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["fallback"], true);
    assert_eq!(json["images"].as_array().unwrap().len(), 2);
    assert!(json["images"][0].as_str().unwrap().starts_with("https://"));
}

#[tokio::test]
async fn test_image_defaults_absent_selectors() {
    let (app, _pool) = create_test_app().await;

    // Missing amount and resolution fall back to 1 and 512x512.
    let (status, json) = send(
        &app,
        "POST",
        "/api/image",
        Some(USER),
        Some(json!({ "prompt": "a lighthouse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["images"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_image_rejects_unparseable_selectors() {
    let (app, _pool) = create_test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/image",
        Some(USER),
        Some(json!({ "prompt": "a lighthouse", "amount": "lots", "resolution": "512x512" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/image",
        Some(USER),
        Some(json!({ "prompt": "a lighthouse", "amount": "2", "resolution": "square" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_simple_image_route_surfaces_errors() {
    let (app, _pool) = create_test_app().await;

    // No auth required on this route; demo mode keeps its original
    // 500 error contract instead of falling back.
    let (status, json) = send(
        &app,
        "POST",
        "/api/generate-image",
        None,
        Some(json!({ "prompt": "a red bicycle" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_music_demo_mode_serves_style_clip() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/music",
        Some(USER),
        Some(json!({ "prompt": "rainy night", "model": "musicgen", "style": "lofi" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["fallback"], true);
    assert!(json["music"].as_str().unwrap().ends_with("audio_out.wav"));
}

#[tokio::test]
async fn test_music_requires_model_and_style() {
    let (app, _pool) = create_test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/music",
        Some(USER),
        Some(json!({ "prompt": "rainy night" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_video_demo_mode_serves_fallback_clip() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/video",
        Some(USER),
        Some(json!({ "prompt": "a storm over the sea" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["fallback"], true);
    assert!(json["video"].as_str().unwrap().contains("giphy"));
}

#[tokio::test]
async fn test_speech_demo_mode_serves_apology() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/speech-to-text",
        Some(USER),
        Some(json!({ "audio": "UklGRg==" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(json["fallback"], true);
    assert!(!json["text"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_speech_rejects_malformed_audio() {
    let (app, _pool) = create_test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/speech-to-text",
        Some(USER),
        Some(json!({ "audio": "not base64 !!!" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_process_file_parses_csv() {
    let (app, _pool) = create_test_app().await;
    use base64::Engine as _;
    let data = base64::engine::general_purpose::STANDARD.encode("name,age\nAda,36\nGrace,45\n");

    let (status, json) = send(
        &app,
        "POST",
        "/api/process-file",
        Some(USER),
        Some(json!({ "filename": "users.csv", "data": data })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["rows"], 2);
    assert_eq!(json["data"][0]["name"], "Ada");
    assert_eq!(json["data"][1]["age"], "45");
}

#[tokio::test]
async fn test_process_file_rejects_other_formats() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/process-file",
        Some(USER),
        Some(json!({ "filename": "report.xlsx", "data": "AAAA" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Unsupported file format"));
}

#[tokio::test]
async fn test_free_tier_ceiling_returns_upgrade_prompt() {
    let (app, pool) = create_test_app_with_limit(1, false).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/conversation",
        Some(USER),
        Some(messages_body("first")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(
        &app,
        "POST",
        "/api/conversation",
        Some(USER),
        Some(messages_body("second")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"]["code"], "LIMIT_EXCEEDED");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("upgrade"));

    let count = aihub::db::usage::get_count(&pool, USER).await.unwrap();
    assert_eq!(count, Some(1));
}

#[tokio::test]
async fn test_bypass_flag_disables_enforcement() {
    let (app, pool) = create_test_app_with_limit(1, true).await;

    for i in 0..3 {
        let (status, _) = send(
            &app,
            "POST",
            "/api/conversation",
            Some(USER),
            Some(messages_body(&format!("message {}", i))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Increment is a no-op under bypass; no counter row is created.
    let count = aihub::db::usage::get_count(&pool, USER).await.unwrap();
    assert_eq!(count, None);
}

#[tokio::test]
async fn test_active_subscription_skips_the_counter() {
    let (app, pool) = create_test_app_with_limit(1, false).await;

    subscriptions::upsert(
        &pool,
        &UserSubscription {
            user_id: USER.to_string(),
            stripe_customer_id: Some("cus_123".to_string()),
            stripe_subscription_id: Some("sub_123".to_string()),
            stripe_price_id: Some("price_123".to_string()),
            stripe_current_period_end: Some(Utc::now() + Duration::days(30)),
        },
    )
    .await
    .unwrap();

    // Past the ceiling for a free user, but the subscriber sails through.
    for _ in 0..3 {
        let (status, _) = send(
            &app,
            "POST",
            "/api/video",
            Some(USER),
            Some(json!({ "prompt": "clouds" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(aihub::db::usage::get_count(&pool, USER).await.unwrap(), None);
}

#[tokio::test]
async fn test_usage_and_limit_reset_endpoints() {
    let (app, _pool) = create_test_app_with_limit(5, false).await;

    let (_, _) = send(
        &app,
        "POST",
        "/api/conversation",
        Some(USER),
        Some(messages_body("hello")),
    )
    .await;

    let (status, json) = send(&app, "GET", "/api/usage", Some(USER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["limit"], 5);
    assert_eq!(json["remaining"], 4);
    assert_eq!(json["is_pro"], false);

    let (status, json) = send(&app, "GET", "/api/limit-reset", Some(USER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "API limit reset successfully");

    let (_, json) = send(&app, "GET", "/api/usage", Some(USER), None).await;
    assert_eq!(json["count"], 0);
    assert_eq!(json["remaining"], 5);
}

#[tokio::test]
async fn test_realtime_get_pings_and_snapshots() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = send(
        &app,
        "GET",
        "/api/analytics/realtime?session_id=s1&page=/dashboard",
        Some(USER),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["metrics"]["activeUsers"], 1);
    let sessions = json["data"]["activeSessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["sessionId"], "s1");
    assert_eq!(sessions[0]["currentPage"], "/dashboard");
}

#[tokio::test]
async fn test_realtime_post_records_activity_and_requests() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/analytics/realtime",
        None,
        Some(json!({ "session_id": "s2", "page": "/music" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (status, _) = send(
        &app,
        "POST",
        "/api/analytics/realtime",
        None,
        Some(json!({ "tool_name": "music", "duration_ms": 42.0, "success": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, "GET", "/api/analytics/realtime", None, None).await;
    assert_eq!(json["data"]["metrics"]["totalRequests"], 1);
    assert_eq!(json["data"]["metrics"]["toolUsage"]["music"], 1);
    assert_eq!(json["data"]["toolUsageStats"]["music"]["percentage"], 100.0);
}

#[tokio::test]
async fn test_realtime_post_requires_a_recognized_payload() {
    let (app, _pool) = create_test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/analytics/realtime",
        None,
        Some(json!({ "page": "/music" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_track_folds_tool_usage_into_metrics() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/analytics/track",
        None,
        Some(json!({
            "event_type": "tool_usage",
            "tool_name": "conversation",
            "duration_ms": 120.0,
            "success": false
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (_, json) = send(&app, "GET", "/api/analytics/realtime", None, None).await;
    assert_eq!(json["data"]["metrics"]["totalRequests"], 1);
    assert_eq!(json["data"]["metrics"]["errorRate"], 1.0);

    // Non-tool events are accepted and logged only.
    let (status, _) = send(
        &app,
        "POST",
        "/api/analytics/track",
        None,
        Some(json!({ "event_type": "user_login", "user_id": USER })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, "GET", "/api/analytics/realtime", None, None).await;
    assert_eq!(json["data"]["metrics"]["totalRequests"], 1);
}

#[tokio::test]
async fn test_feature_requests_feed_the_metrics() {
    let (app, _pool) = create_test_app().await;

    let (_, _) = send(
        &app,
        "POST",
        "/api/conversation",
        Some(USER),
        Some(messages_body("hello")),
    )
    .await;

    let (_, json) = send(&app, "GET", "/status", None, None).await;
    assert_eq!(json["total_requests"], 1);

    let (_, json) = send(&app, "GET", "/api/analytics/realtime", None, None).await;
    // A demo-mode fallback is still a successful response, so the
    // error rate stays untouched.
    assert_eq!(json["data"]["metrics"]["toolUsage"]["conversation"], 1);
    assert_eq!(json["data"]["metrics"]["errorRate"], 0.0);
}

#[tokio::test]
async fn test_fallback_image_response_counts_as_success() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/image",
        Some(USER),
        Some(json!({ "prompt": "a lighthouse", "amount": "1", "resolution": "512x512" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["fallback"], true);

    let (_, json) = send(&app, "GET", "/api/analytics/realtime", None, None).await;
    assert_eq!(json["data"]["metrics"]["totalRequests"], 1);
    assert_eq!(json["data"]["metrics"]["errorRate"], 0.0);
}

#[tokio::test]
async fn test_failed_transcription_records_a_failure() {
    let (app, _pool) = create_test_app().await;

    // The speech response reports its own failure, and the metrics
    // follow it, unlike the other features' fallback paths.
    let (_, json) = send(
        &app,
        "POST",
        "/api/speech-to-text",
        Some(USER),
        Some(json!({ "audio": "UklGRg==" })),
    )
    .await;
    assert_eq!(json["success"], false);

    let (_, json) = send(&app, "GET", "/api/analytics/realtime", None, None).await;
    assert_eq!(json["data"]["metrics"]["totalRequests"], 1);
    assert_eq!(json["data"]["metrics"]["errorRate"], 1.0);
}
