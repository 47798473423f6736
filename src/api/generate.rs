//! Text generation endpoints: conversation, code, and written content.
//!
//! Every handler follows the same shape: authenticate, check the gate,
//! run the feature adapter (which never fails outward), then settle
//! usage accounting and metrics.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;

use crate::api::{enforce_gate, settle_request};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::providers::chat::{self, ChatMessage, ChatResponse};
use crate::providers::code;
use crate::providers::content::{self, ContentType};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MessagesRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub content_type: ContentType,
}

/// POST /api/conversation
pub async fn conversation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<MessagesRequest>,
) -> ApiResult<Json<ChatResponse>> {
    if request.messages.is_empty() {
        return Err(ApiError::BadRequest("Messages are required".to_string()));
    }
    let is_pro = enforce_gate(&state, user.id()).await?;

    let started = Instant::now();
    let response = chat::generate(&state.hf, &state.catalog, &request.messages).await;

    settle_request(
        &state,
        user.id(),
        is_pro,
        "conversation",
        elapsed_ms(started),
        true,
    )
    .await;

    Ok(Json(response))
}

/// POST /api/code
pub async fn code_generation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<MessagesRequest>,
) -> ApiResult<Json<ChatResponse>> {
    if request.messages.is_empty() {
        return Err(ApiError::BadRequest("Messages are required".to_string()));
    }
    let is_pro = enforce_gate(&state, user.id()).await?;

    let started = Instant::now();
    let response = code::generate(&state.hf, &state.catalog, &request.messages).await;

    settle_request(&state, user.id(), is_pro, "code", elapsed_ms(started), true).await;

    Ok(Json(response))
}

/// POST /api/content
pub async fn content_generation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ContentRequest>,
) -> ApiResult<Json<Value>> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("Prompt is required".to_string()));
    }
    let is_pro = enforce_gate(&state, user.id()).await?;

    let started = Instant::now();
    let response = content::generate(
        &state.lemur,
        &state.catalog,
        &request.prompt,
        request.content_type,
    )
    .await;

    settle_request(&state, user.id(), is_pro, "content", elapsed_ms(started), true).await;

    Ok(Json(response))
}

pub(crate) fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/conversation", post(conversation))
        .route("/api/code", post(code_generation))
        .route("/api/content", post(content_generation))
}
