//! Video generation feature.
//!
//! "Video" here is an animated-still contract carried over from the
//! original dashboard: one diffusion render with motion keywords
//! appended, returned as an image data URI. The model is picked at
//! random from the supported image models.

use rand::Rng;
use serde::Serialize;

use super::fallback::FallbackCatalog;
use super::huggingface::{HuggingFaceClient, ImageGenerationParams};
use super::image::IMAGE_MODELS;
use super::to_data_uri;

const MOTION_SUFFIX: &str = " animated, dynamic scene with motion blur, cinematic, 4k, detailed";

/// Rendered clip or fallback reference.
#[derive(Debug, Clone, Serialize)]
pub struct VideoResponse {
    pub video: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

fn random_model() -> &'static str {
    let mut rng = rand::thread_rng();
    IMAGE_MODELS[rng.gen_range(0..IMAGE_MODELS.len())]
}

/// Render one motion-enhanced frame for the prompt.
pub async fn generate(
    hf: &HuggingFaceClient,
    catalog: &FallbackCatalog,
    prompt: &str,
) -> VideoResponse {
    let model = random_model();
    let inputs = format!("{}{}", prompt, MOTION_SUFFIX);

    tracing::debug!(model = %model, "Generating video frame");

    match hf.text_to_image(model, &inputs, &ImageGenerationParams::default()).await {
        Ok(image) => VideoResponse {
            video: to_data_uri(&image.mime_type, &image.bytes),
            fallback: None,
            message: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Video generation failed, serving fallback clip");
            VideoResponse {
                video: catalog.video(),
                fallback: Some(true),
                message: Some(
                    "Using fallback video. The video generation service is currently experiencing issues.",
                ),
            }
        }
    }
}
