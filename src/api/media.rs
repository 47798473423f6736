//! Media generation endpoints: image, music, video, speech-to-text.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::json;
use std::time::Instant;

use crate::api::generate::elapsed_ms;
use crate::api::{enforce_gate, settle_request};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::providers::image::{self, ImageResponse};
use crate::providers::music::{self, MusicModel, MusicResponse, MusicStyle};
use crate::providers::speech::{self, SpeechResponse};
use crate::providers::video::{self, VideoResponse};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    #[serde(default)]
    pub prompt: String,
    /// Image count, sent as a string by the dashboard's select control
    pub amount: Option<String>,
    pub resolution: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SimpleImageRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct MusicRequest {
    #[serde(default)]
    pub prompt: String,
    pub model: Option<MusicModel>,
    pub style: Option<MusicStyle>,
}

#[derive(Debug, Deserialize)]
pub struct VideoRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    /// Base64-encoded audio payload; a `data:` URI prefix is accepted
    #[serde(default)]
    pub audio: String,
}

/// POST /api/image
pub async fn image_generation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ImageRequest>,
) -> ApiResult<Json<ImageResponse>> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("Prompt is required".to_string()));
    }
    // Absent selectors take the dashboard's defaults; only a value that
    // is present but unparseable is rejected.
    let amount: u32 = request
        .amount
        .as_deref()
        .unwrap_or("1")
        .parse()
        .map_err(|_| ApiError::BadRequest("Amount must be a number".to_string()))?;
    let resolution = request.resolution.as_deref().unwrap_or("512x512");
    if image::parse_resolution(resolution).is_none() {
        return Err(ApiError::BadRequest(
            "Resolution must be in WxH form".to_string(),
        ));
    }

    let is_pro = enforce_gate(&state, user.id()).await?;

    let started = Instant::now();
    let amount = amount.clamp(1, 4);
    let response = image::generate(&state.hf, &state.catalog, &request.prompt, amount).await;

    // Fallback is still a successful response.
    settle_request(&state, user.id(), is_pro, "image", elapsed_ms(started), true).await;

    Ok(Json(response))
}

/// POST /api/generate-image
///
/// Ungated single-image route; predates the fallback policy and keeps
/// its original contract, surfacing provider failures as a 500.
pub async fn simple_image_generation(
    State(state): State<AppState>,
    Json(request): Json<SimpleImageRequest>,
) -> Response {
    if request.prompt.trim().is_empty() {
        return ApiError::BadRequest("Prompt is required".to_string()).into_response();
    }

    match image::generate_single(&state.hf, &request.prompt).await {
        Ok(image) => Json(json!({
            "success": true,
            "image": image,
            "message": "Image generated successfully!",
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Simple image generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "Failed to generate image",
                })),
            )
                .into_response()
        }
    }
}

/// POST /api/music
pub async fn music_generation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<MusicRequest>,
) -> ApiResult<Json<MusicResponse>> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("Prompt is required".to_string()));
    }
    let model = request
        .model
        .ok_or_else(|| ApiError::BadRequest("Model is required".to_string()))?;
    let style = request
        .style
        .ok_or_else(|| ApiError::BadRequest("Style is required".to_string()))?;

    let is_pro = enforce_gate(&state, user.id()).await?;

    let started = Instant::now();
    let response = music::generate(&state.hf, &state.catalog, &request.prompt, model, style).await;

    settle_request(&state, user.id(), is_pro, "music", elapsed_ms(started), true).await;

    Ok(Json(response))
}

/// POST /api/video
pub async fn video_generation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<VideoRequest>,
) -> ApiResult<Json<VideoResponse>> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("Prompt is required".to_string()));
    }
    let is_pro = enforce_gate(&state, user.id()).await?;

    let started = Instant::now();
    let response = video::generate(&state.hf, &state.catalog, &request.prompt).await;

    settle_request(&state, user.id(), is_pro, "video", elapsed_ms(started), true).await;

    Ok(Json(response))
}

/// POST /api/speech-to-text
pub async fn speech_to_text(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<SpeechRequest>,
) -> ApiResult<Json<SpeechResponse>> {
    if request.audio.is_empty() {
        return Err(ApiError::BadRequest("Audio data is required".to_string()));
    }
    let audio = decode_audio(&request.audio)?;

    let is_pro = enforce_gate(&state, user.id()).await?;

    let started = Instant::now();
    let response = speech::transcribe(&state.hf, &state.catalog, audio).await;

    // The transcription result carries its own success flag (false for
    // an empty transcription or a fallback apology); metrics follow it.
    settle_request(
        &state,
        user.id(),
        is_pro,
        "speech",
        elapsed_ms(started),
        response.success,
    )
    .await;

    Ok(Json(response))
}

fn decode_audio(data: &str) -> Result<Vec<u8>, ApiError> {
    let encoded = data
        .split_once("base64,")
        .map(|(_, b)| b)
        .unwrap_or(data);
    general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| ApiError::BadRequest("Invalid base64 audio data".to_string()))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/image", post(image_generation))
        .route("/api/generate-image", post(simple_image_generation))
        .route("/api/music", post(music_generation))
        .route("/api/video", post(video_generation))
        .route("/api/speech-to-text", post(speech_to_text))
}
