//! Hugging Face Inference API client
//!
//! Thin wrapper over the hosted inference endpoints
//! (`https://api-inference.huggingface.co/models/{model}`). One method per
//! task type; a single attempt per call, no retry. A client built without
//! an API key returns `HfError::MissingApiKey` from every call, which the
//! feature adapters translate into their fallback paths.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const INFERENCE_BASE_URL: &str = "https://api-inference.huggingface.co/models";
const USER_AGENT: &str = "aihub/0.1.0 (https://github.com/aihub/aihub)";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Hugging Face client errors
#[derive(Debug, Error)]
pub enum HfError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Empty response from model")]
    EmptyResponse,
}

/// Sampling parameters for text generation tasks.
///
/// Unset fields are omitted from the request so the model's defaults
/// apply.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TextGenerationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_new_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_full_text: Option<bool>,
}

/// Diffusion parameters for image generation tasks.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageGenerationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_inference_steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance_scale: Option<f64>,
}

#[derive(Serialize)]
struct InferenceRequest<'a, P: Serialize> {
    inputs: &'a str,
    parameters: &'a P,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct Transcription {
    text: String,
}

/// Binary artifact returned by a diffusion model.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Client for the hosted inference API.
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
}

impl HuggingFaceClient {
    /// Create a client. `api_key: None` puts the client in demo mode
    /// where every call fails with `MissingApiKey`.
    pub fn new(api_key: Option<String>) -> Result<Self, HfError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| HfError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, HfError> {
        self.api_key.as_deref().ok_or(HfError::MissingApiKey)
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/{}", INFERENCE_BASE_URL, model)
    }

    /// Run a text-generation model and return the first completion.
    pub async fn text_generation(
        &self,
        model: &str,
        inputs: &str,
        parameters: &TextGenerationParams,
    ) -> Result<String, HfError> {
        let api_key = self.api_key()?;

        tracing::debug!(model = %model, "Requesting text generation");

        let response = self
            .http_client
            .post(self.model_url(model))
            .bearer_auth(api_key)
            .json(&InferenceRequest { inputs, parameters })
            .send()
            .await
            .map_err(|e| HfError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(HfError::ApiError(status.as_u16(), error_text));
        }

        let completions: Vec<GeneratedText> = response
            .json()
            .await
            .map_err(|e| HfError::ParseError(e.to_string()))?;

        completions
            .into_iter()
            .next()
            .map(|c| c.generated_text)
            .ok_or(HfError::EmptyResponse)
    }

    /// Run a text-to-image model and return the rendered image bytes.
    pub async fn text_to_image(
        &self,
        model: &str,
        inputs: &str,
        parameters: &ImageGenerationParams,
    ) -> Result<GeneratedImage, HfError> {
        let api_key = self.api_key()?;

        tracing::debug!(model = %model, "Requesting text-to-image");

        let response = self
            .http_client
            .post(self.model_url(model))
            .bearer_auth(api_key)
            .json(&InferenceRequest { inputs, parameters })
            .send()
            .await
            .map_err(|e| HfError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(HfError::ApiError(status.as_u16(), error_text));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| HfError::NetworkError(e.to_string()))?;

        if bytes.is_empty() {
            return Err(HfError::EmptyResponse);
        }

        Ok(GeneratedImage {
            bytes: bytes.to_vec(),
            mime_type,
        })
    }

    /// Run a text-to-audio model and return the rendered clip bytes.
    pub async fn text_to_audio(&self, model: &str, inputs: &str) -> Result<Vec<u8>, HfError> {
        let api_key = self.api_key()?;

        tracing::debug!(model = %model, "Requesting text-to-audio");

        let response = self
            .http_client
            .post(self.model_url(model))
            .bearer_auth(api_key)
            .json(&serde_json::json!({ "inputs": inputs }))
            .send()
            .await
            .map_err(|e| HfError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(HfError::ApiError(status.as_u16(), error_text));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| HfError::NetworkError(e.to_string()))?;

        if bytes.is_empty() {
            return Err(HfError::EmptyResponse);
        }

        Ok(bytes.to_vec())
    }

    /// Run an automatic-speech-recognition model on raw audio bytes.
    ///
    /// An empty transcription is not an error here; the speech adapter
    /// gives it a dedicated response.
    pub async fn speech_to_text(&self, model: &str, audio: Vec<u8>) -> Result<String, HfError> {
        let api_key = self.api_key()?;

        tracing::debug!(model = %model, bytes = audio.len(), "Requesting transcription");

        let response = self
            .http_client
            .post(self.model_url(model))
            .bearer_auth(api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(audio)
            .send()
            .await
            .map_err(|e| HfError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(HfError::ApiError(status.as_u16(), error_text));
        }

        let transcription: Transcription = response
            .json()
            .await
            .map_err(|e| HfError::ParseError(e.to_string()))?;

        Ok(transcription.text)
    }
}
