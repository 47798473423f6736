//! Music generation feature.
//!
//! The caller picks a model and a style; the style appends a fixed
//! enhancement phrase to the prompt. Output is a `data:audio/wav`
//! URI; failures degrade to a pre-rendered clip for the style.

use serde::{Deserialize, Serialize};

use super::fallback::FallbackCatalog;
use super::huggingface::{HfError, HuggingFaceClient};
use super::to_data_uri;

/// Selectable generation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicModel {
    Audioldm,
    Audioldm2,
    Musicgen,
}

impl MusicModel {
    fn model_id(self) -> &'static str {
        match self {
            MusicModel::Audioldm => "cvssp/audioldm",
            MusicModel::Audioldm2 => "cvssp/audioldm2",
            MusicModel::Musicgen => "facebook/musicgen-small",
        }
    }
}

/// Style selector; each style has a fixed prompt enhancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicStyle {
    Cinematic,
    Acoustic,
    Electronic,
    Ambient,
    Lofi,
}

impl MusicStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            MusicStyle::Cinematic => "cinematic",
            MusicStyle::Acoustic => "acoustic",
            MusicStyle::Electronic => "electronic",
            MusicStyle::Ambient => "ambient",
            MusicStyle::Lofi => "lofi",
        }
    }

    fn enhancement(self) -> &'static str {
        match self {
            MusicStyle::Cinematic => " - Orchestral, epic, movie soundtrack with strings and brass",
            MusicStyle::Acoustic => " - Acoustic guitar, soft, melodic, folk-inspired",
            MusicStyle::Electronic => " - Electronic beats, synthesizers, modern production",
            MusicStyle::Ambient => " - Atmospheric, relaxing, peaceful ambient music",
            MusicStyle::Lofi => " - Lo-fi hip hop beats, relaxed, chill",
        }
    }
}

/// Generated clip or fallback reference.
///
/// `fallback` is always present here; the original dashboard reads it
/// to decide whether to show the degraded-service notice.
#[derive(Debug, Clone, Serialize)]
pub struct MusicResponse {
    pub music: String,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

/// Generate a music clip for the prompt.
pub async fn generate(
    hf: &HuggingFaceClient,
    catalog: &FallbackCatalog,
    prompt: &str,
    model: MusicModel,
    style: MusicStyle,
) -> MusicResponse {
    let enhanced = format!("{}{}", prompt, style.enhancement());

    tracing::debug!(model = model.model_id(), style = style.as_str(), "Generating music");

    match hf.text_to_audio(model.model_id(), &enhanced).await {
        Ok(bytes) => MusicResponse {
            music: to_data_uri("audio/wav", &bytes),
            fallback: false,
            error: None,
        },
        Err(HfError::MissingApiKey) => {
            tracing::info!("No API key configured, serving fallback audio");
            MusicResponse {
                music: catalog.audio_for(style.as_str()),
                fallback: true,
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Music generation failed, serving fallback audio");
            MusicResponse {
                music: catalog.audio_for(style.as_str()),
                fallback: true,
                error: Some("Failed to generate with Hugging Face"),
            }
        }
    }
}
