//! HTTP client for a hosted reaction-diagram recognition service.
//!
//! Speaks a minimal prediction protocol: POST a base64-encoded image, get
//! back the list of predicted reactions. Matches RxnScribe-style model
//! servers that expose their `predict_image` call over HTTP.

use crate::config::RecognizerConfig;
use crate::error::{RaiderError, Result};
use crate::recognize::StructureRecognizer;
use crate::types::ReactionPrediction;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Structure recognizer backed by an HTTP prediction endpoint.
pub struct HttpRecognizer {
    client: reqwest::Client,
    config: RecognizerConfig,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<ReactionPrediction>,
}

impl HttpRecognizer {
    /// Create a client with the configured request deadline.
    pub fn new(config: RecognizerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RaiderError::network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl StructureRecognizer for HttpRecognizer {
    async fn predict(&self, image_bytes: &[u8]) -> Result<Vec<ReactionPrediction>> {
        let payload = json!({"image": BASE64.encode(image_bytes)});

        let response = self.client.post(&self.config.endpoint).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RaiderError::network(format!(
                "recognizer endpoint returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: PredictResponse = response
            .json()
            .await
            .map_err(|e| RaiderError::format_with_source("unparseable recognizer response", e))?;

        Ok(parsed.predictions)
    }
}
