//! Speech-to-text feature.
//!
//! Transcribes a decoded audio payload with Whisper. An empty
//! transcription gets a dedicated notice; provider failures degrade to
//! a canned apology message.

use serde::Serialize;

use super::fallback::FallbackCatalog;
use super::huggingface::HuggingFaceClient;

const SPEECH_MODEL: &str = "openai/whisper-large-v3";

const NO_SPEECH_NOTICE: &str = "No speech detected. Please try again with clearer audio.";

/// Transcription result.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechResponse {
    pub text: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

/// Transcribe raw audio bytes.
pub async fn transcribe(
    hf: &HuggingFaceClient,
    catalog: &FallbackCatalog,
    audio: Vec<u8>,
) -> SpeechResponse {
    match hf.speech_to_text(SPEECH_MODEL, audio).await {
        Ok(text) if text.trim().is_empty() => SpeechResponse {
            text: NO_SPEECH_NOTICE.to_string(),
            success: false,
            fallback: None,
            error: None,
        },
        Ok(text) => SpeechResponse {
            text,
            success: true,
            fallback: None,
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Transcription failed, serving fallback message");
            SpeechResponse {
                text: catalog.transcript(),
                success: false,
                fallback: Some(true),
                error: Some("Failed to transcribe audio"),
            }
        }
    }
}
