//! Written-content generation feature, backed by AssemblyAI LeMUR.
//!
//! The content type selects the system prompt and temperature. On
//! success the provider's JSON is passed through untouched; on failure
//! the caller gets canned copy for the type.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::assemblyai::AssemblyAiClient;
use super::fallback::FallbackCatalog;

/// Content category; selects system prompt and temperature. Missing
/// values default to blog, unrecognized ones map to the general
/// variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Blog,
    Marketing,
    Social,
    #[serde(other)]
    General,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Blog => "blog",
            ContentType::Marketing => "marketing",
            ContentType::Social => "social",
            ContentType::General => "general",
        }
    }

    fn temperature(self) -> f64 {
        match self {
            ContentType::Blog => 0.7,
            ContentType::Marketing => 0.8,
            ContentType::Social => 0.9,
            ContentType::General => 0.7,
        }
    }

    fn system_prompt(self) -> &'static str {
        match self {
            ContentType::Blog => {
                "You are a professional blog writer. Create engaging, well-researched content that is optimized for SEO."
            }
            ContentType::Marketing => {
                "You are a marketing expert. Create compelling copy that drives conversions and engages the target audience."
            }
            ContentType::Social => {
                "You are a social media manager. Create engaging, shareable content optimized for social platforms."
            }
            ContentType::General => "You are a professional content creator.",
        }
    }
}

/// Generate written content for the prompt.
pub async fn generate(
    client: &AssemblyAiClient,
    catalog: &FallbackCatalog,
    prompt: &str,
    content_type: ContentType,
) -> Value {
    tracing::debug!(content_type = content_type.as_str(), "Generating content");

    match client
        .generate(prompt, content_type.system_prompt(), content_type.temperature())
        .await
    {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                error = %e,
                content_type = content_type.as_str(),
                "Content generation failed, serving fallback copy"
            );
            json!({
                "response": catalog.copy_for(content_type.as_str()),
                "fallback": true
            })
        }
    }
}
