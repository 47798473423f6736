//! Image generation feature.
//!
//! Renders up to four images concurrently against the first model in
//! the supported list. The requested resolution is accepted for
//! contract compatibility but not forwarded; the hosted models emit
//! their trained size.

use base64::{engine::general_purpose, Engine as _};
use futures::future::try_join_all;
use serde::Serialize;

use super::fallback::FallbackCatalog;
use super::huggingface::{HfError, HuggingFaceClient, ImageGenerationParams};
use super::to_data_uri;

/// Models known to work on the hosted inference API, in preference
/// order; the first is used.
pub(crate) const IMAGE_MODELS: [&str; 3] = [
    "prompthero/openjourney",
    "runwayml/stable-diffusion-v1-5",
    "CompVis/stable-diffusion-v1-4",
];

const XL_MODEL: &str = "stabilityai/stable-diffusion-xl-base-1.0";

const MAX_IMAGES_PER_REQUEST: u32 = 4;

/// Rendered images or fallback references.
#[derive(Debug, Clone, Serialize)]
pub struct ImageResponse {
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// Parse a "WxH" resolution selector.
pub fn parse_resolution(resolution: &str) -> Option<(u32, u32)> {
    let (width, height) = resolution.split_once('x')?;
    Some((width.parse().ok()?, height.parse().ok()?))
}

/// Render `amount` images for the prompt, concurrently.
///
/// Any single failed render fails the batch into the fallback path;
/// the fallback set is capped at its own size rather than `amount`.
pub async fn generate(
    hf: &HuggingFaceClient,
    catalog: &FallbackCatalog,
    prompt: &str,
    amount: u32,
) -> ImageResponse {
    let count = amount.min(MAX_IMAGES_PER_REQUEST) as usize;
    let params = ImageGenerationParams {
        num_inference_steps: Some(30),
        guidance_scale: Some(7.5),
        ..Default::default()
    };

    let renders =
        try_join_all((0..count).map(|_| hf.text_to_image(IMAGE_MODELS[0], prompt, &params))).await;

    match renders {
        Ok(images) => ImageResponse {
            images: images
                .iter()
                .map(|i| to_data_uri(&i.mime_type, &i.bytes))
                .collect(),
            fallback: None,
            message: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Image generation failed, serving fallback images");
            ImageResponse {
                images: catalog.images(amount as usize),
                fallback: Some(true),
                message: Some(
                    "Using fallback images. The image generation service is currently experiencing issues.",
                ),
            }
        }
    }
}

/// One-shot render used by the ungated simple endpoint.
///
/// Predates the fallback policy: returns raw base64 (no data-URI
/// prefix) and surfaces failures to the caller instead of degrading.
pub async fn generate_single(hf: &HuggingFaceClient, prompt: &str) -> Result<String, HfError> {
    let params = ImageGenerationParams {
        negative_prompt: Some("blurry, low quality".to_string()),
        num_inference_steps: Some(30),
        ..Default::default()
    };

    let image = hf.text_to_image(XL_MODEL, prompt, &params).await?;
    Ok(general_purpose::STANDARD.encode(&image.bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolutions_parse_as_width_by_height() {
        assert_eq!(parse_resolution("512x512"), Some((512, 512)));
        assert_eq!(parse_resolution("1024x768"), Some((1024, 768)));
        assert_eq!(parse_resolution("square"), None);
        assert_eq!(parse_resolution("512x"), None);
        assert_eq!(parse_resolution("x512"), None);
    }

    #[tokio::test]
    async fn missing_key_serves_capped_fallback_images() {
        let hf = HuggingFaceClient::new(None).unwrap();
        let catalog = FallbackCatalog::default();

        let response = generate(&hf, &catalog, "a lighthouse at dusk", 2).await;
        assert_eq!(response.fallback, Some(true));
        assert_eq!(response.images.len(), 2);
        assert!(response.message.is_some());

        // More images requested than the fallback set holds.
        let response = generate(&hf, &catalog, "a lighthouse at dusk", 4).await;
        assert_eq!(response.images.len(), 3);
    }

    #[tokio::test]
    async fn single_render_surfaces_missing_key_as_an_error() {
        let hf = HuggingFaceClient::new(None).unwrap();

        assert!(matches!(
            generate_single(&hf, "a red bicycle").await,
            Err(HfError::MissingApiKey)
        ));
    }

    #[test]
    fn success_shape_omits_fallback_fields() {
        let response = ImageResponse {
            images: vec!["data:image/jpeg;base64,AAAA".to_string()],
            fallback: None,
            message: None,
        };
        let value = serde_json::to_value(&response).unwrap();

        assert!(value.get("fallback").is_none());
        assert!(value.get("message").is_none());
        assert_eq!(value["images"].as_array().unwrap().len(), 1);
    }
}
