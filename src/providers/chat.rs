//! Chat feature: single-turn completion against gpt2.
//!
//! The caller sends a message list; only the last entry feeds the
//! prompt. Any provider failure or empty completion degrades to a
//! canned assistant reply.

use serde::{Deserialize, Serialize};

use super::fallback::FallbackCatalog;
use super::huggingface::{HuggingFaceClient, TextGenerationParams};

const CHAT_MODEL: &str = "gpt2";

/// One entry of the caller's message list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Assistant reply, tagged when served from the fallback set.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub role: &'static str,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

impl ChatResponse {
    pub fn assistant(content: String) -> Self {
        Self {
            role: "assistant",
            content,
            fallback: None,
        }
    }

    pub fn fallback(content: String) -> Self {
        Self {
            role: "assistant",
            content,
            fallback: Some(true),
        }
    }
}

fn generation_params() -> TextGenerationParams {
    TextGenerationParams {
        max_new_tokens: Some(100),
        temperature: Some(0.7),
        top_p: Some(0.9),
        return_full_text: Some(false),
        ..Default::default()
    }
}

/// Generate an assistant reply for the last message in the list.
pub async fn generate(
    hf: &HuggingFaceClient,
    catalog: &FallbackCatalog,
    messages: &[ChatMessage],
) -> ChatResponse {
    let user_message = messages.last().map(|m| m.content.as_str()).unwrap_or("");
    let prompt = format!("User: {}\nAssistant:", user_message);

    match hf.text_generation(CHAT_MODEL, &prompt, &generation_params()).await {
        Ok(text) => {
            let cleaned = text.trim();
            if cleaned.is_empty() {
                tracing::warn!("Empty chat completion, serving fallback reply");
                ChatResponse::fallback(catalog.reply())
            } else {
                ChatResponse::assistant(cleaned.to_string())
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Chat generation failed, serving fallback reply");
            ChatResponse::fallback(catalog.reply())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_client() -> HuggingFaceClient {
        HuggingFaceClient::new(None).unwrap()
    }

    #[tokio::test]
    async fn missing_key_serves_fallback_reply() {
        let hf = demo_client();
        let catalog = FallbackCatalog::default();
        let messages = vec![ChatMessage {
            role: "user".to_string(),
            content: "hello there".to_string(),
        }];

        let response = generate(&hf, &catalog, &messages).await;

        assert_eq!(response.role, "assistant");
        assert_eq!(response.fallback, Some(true));
        assert!(!response.content.is_empty());
    }

    #[tokio::test]
    async fn empty_message_list_still_answers() {
        let hf = demo_client();
        let catalog = FallbackCatalog::default();

        let response = generate(&hf, &catalog, &[]).await;

        assert_eq!(response.fallback, Some(true));
        assert!(!response.content.is_empty());
    }

    #[test]
    fn success_response_omits_the_fallback_flag() {
        let response = ChatResponse::assistant("hi".to_string());
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["role"], "assistant");
        assert_eq!(value["content"], "hi");
        assert!(value.get("fallback").is_none());
    }

    #[test]
    fn fallback_response_carries_the_flag() {
        let response = ChatResponse::fallback("canned".to_string());
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["fallback"], true);
    }
}
