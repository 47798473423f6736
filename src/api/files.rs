//! File processing endpoint.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::files;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProcessFileRequest {
    #[serde(default)]
    pub filename: String,
    /// Base64 file content
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessFileResponse {
    pub success: bool,
    pub filename: String,
    pub rows: usize,
    pub data: Vec<Map<String, Value>>,
}

/// POST /api/process-file
///
/// Authenticated but not usage-gated: the work is local computation,
/// not an inference call.
pub async fn process_file(
    State(_state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<ProcessFileRequest>,
) -> ApiResult<Json<ProcessFileResponse>> {
    if request.filename.is_empty() || request.data.is_empty() {
        return Err(ApiError::BadRequest(
            "Filename and data are required".to_string(),
        ));
    }

    let processed = files::process(&request.filename, &request.data)?;

    Ok(Json(ProcessFileResponse {
        success: true,
        filename: processed.filename,
        rows: processed.rows,
        data: processed.data,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/process-file", post(process_file))
}
