//! OpenAI-compatible chat-completions client.
//!
//! Speaks the `/v1/chat/completions` wire format: one user message whose
//! content array carries the instruction text, one `image_url` part per
//! inline image (base64 data URL), and any trailing text blocks.

use crate::config::VisionConfig;
use crate::error::{RaiderError, Result};
use crate::types::TokenUsage;
use crate::vision::{VisionModel, VisionReply, VisionRequest};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

/// Vision-model client for OpenAI-compatible endpoints.
pub struct OpenAiVision {
    client: reqwest::Client,
    config: VisionConfig,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl OpenAiVision {
    /// Create a client with the configured request deadline.
    pub fn new(config: VisionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RaiderError::network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn build_payload(&self, request: &VisionRequest) -> Value {
        let mut content = vec![json!({"type": "text", "text": request.instruction})];
        for image in &request.images {
            let encoded = BASE64.encode(&image.bytes);
            content.push(json!({
                "type": "image_url",
                "image_url": {"url": format!("data:{};base64,{}", image.mime_type, encoded)}
            }));
        }
        for text in &request.extra_text {
            content.push(json!({"type": "text", "text": text}));
        }

        json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": content}],
            "max_tokens": self.config.max_tokens,
        })
    }
}

#[async_trait]
impl VisionModel for OpenAiVision {
    async fn generate(&self, request: &VisionRequest) -> Result<VisionReply> {
        let payload = self.build_payload(request);

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RaiderError::network(format!(
                "vision endpoint returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| RaiderError::format_with_source("unparseable vision endpoint response", e))?;

        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RaiderError::format("vision endpoint response carries no choices"))?;

        Ok(VisionReply {
            text: choice.message.content,
            usage: chat.usage,
        })
    }
}
