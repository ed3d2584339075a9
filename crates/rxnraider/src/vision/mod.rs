//! Vision-language model capability port.
//!
//! The pipeline treats the model as a black box: submit one multi-part
//! prompt (instruction text, zero or more inline images, optional extra text
//! blocks), receive free-form text believed to contain JSON plus token-usage
//! counters. Any provider implementing that contract satisfies
//! [`VisionModel`]; tests substitute deterministic fakes.

pub mod openai;

use crate::Result;
use crate::types::TokenUsage;
use async_trait::async_trait;

pub use openai::OpenAiVision;

/// One inline image part of a request.
#[derive(Debug, Clone)]
pub struct InlineImage {
    /// Encoded image bytes (PNG/JPEG/WebP), inlined base64 on the wire
    pub bytes: Vec<u8>,
    /// Declared mime type, e.g. `image/png`
    pub mime_type: String,
}

impl InlineImage {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: "image/png".to_string(),
        }
    }
}

/// A multi-part request to the vision-language model.
///
/// Image parts keep their insertion order on the wire so positional figure
/// context (top diagram, then table rows) is preserved for the model.
#[derive(Debug, Clone, Default)]
pub struct VisionRequest {
    /// Instruction text, always the first part
    pub instruction: String,
    /// Inline image parts, in split order
    pub images: Vec<InlineImage>,
    /// Trailing text blocks (captions, serialized records)
    pub extra_text: Vec<String>,
}

/// Model output: raw text plus the token-accounting record for the call.
#[derive(Debug, Clone)]
pub struct VisionReply {
    pub text: String,
    pub usage: TokenUsage,
}

/// The injected vision-model capability.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Submit one multi-part request and return the model's text reply.
    ///
    /// # Errors
    ///
    /// - `RaiderError::Network` - the call failed; safe to re-drive later
    /// - `RaiderError::Timeout` - the call exceeded its deadline
    async fn generate(&self, request: &VisionRequest) -> Result<VisionReply>;
}
