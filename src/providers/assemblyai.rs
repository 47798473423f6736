//! AssemblyAI LeMUR client
//!
//! Covers the single LeMUR generation endpoint used by the content
//! feature. AssemblyAI expects the API key bare in the `Authorization`
//! header, without a `Bearer` scheme.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

const LEMUR_GENERATE_URL: &str = "https://api.assemblyai.com/lemur/v3/generate";
const LEMUR_MODEL: &str = "assemblyai/mistral-7b";
const USER_AGENT: &str = "aihub/0.1.0 (https://github.com/aihub/aihub)";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_TOKENS: u32 = 1000;

/// AssemblyAI client errors
#[derive(Debug, Error)]
pub enum LemurError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Serialize)]
struct LemurRequest<'a> {
    prompt: &'a str,
    model: &'static str,
    temperature: f64,
    system_prompt: &'a str,
    max_tokens: u32,
}

/// Client for the LeMUR generation endpoint.
#[derive(Debug, Clone)]
pub struct AssemblyAiClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
}

impl AssemblyAiClient {
    /// Create a client. `api_key: None` puts the client in demo mode
    /// where every call fails with `MissingApiKey`.
    pub fn new(api_key: Option<String>) -> Result<Self, LemurError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LemurError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Run a LeMUR generation and pass the provider's JSON through.
    ///
    /// The response shape ({request_id, response}) is owned by the
    /// provider; callers forward it rather than re-modeling it.
    pub async fn generate(
        &self,
        prompt: &str,
        system_prompt: &str,
        temperature: f64,
    ) -> Result<serde_json::Value, LemurError> {
        let api_key = self.api_key.as_deref().ok_or(LemurError::MissingApiKey)?;

        tracing::debug!(temperature, "Requesting LeMUR generation");

        let response = self
            .http_client
            .post(LEMUR_GENERATE_URL)
            .header(reqwest::header::AUTHORIZATION, api_key)
            .json(&LemurRequest {
                prompt,
                model: LEMUR_MODEL,
                temperature,
                system_prompt,
                max_tokens: MAX_TOKENS,
            })
            .send()
            .await
            .map_err(|e| LemurError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LemurError::ApiError(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| LemurError::ParseError(e.to_string()))
    }
}
