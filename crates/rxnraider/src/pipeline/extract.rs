//! Structured-extraction orchestration.
//!
//! Drives the vision-model capability over a figure's segmented subimages
//! plus an optional caption, persists the raw response and its token-usage
//! record, and repairs the response into strict JSON.

use crate::error::{RaiderError, Result};
use crate::pipeline::layout;
use crate::pipeline::normalize::normalize_json_file;
use crate::types::TokenUsage;
use crate::vision::{InlineImage, VisionModel, VisionRequest};
use std::path::Path;

/// Extract the optimization-run record for one figure.
///
/// Builds one multi-part request: the instruction text, one inline image
/// part per subimage in split order, and the caption text when
/// `{image_dir}/{name}.txt` exists. On success the raw response text and the
/// token-usage record are persisted, then the response is normalized;
/// normalization failure is logged and tolerated. On request failure no
/// output file is written for this figure, so an absent output file means
/// "not yet processed" and the figure may be re-driven.
///
/// # Errors
///
/// - `RaiderError::Io` - no subimages or the instruction inputs are missing
/// - `RaiderError::Network` / `Timeout` - the capability call failed
pub async fn extract_figure_data(
    model: &dyn VisionModel,
    name: &str,
    image_dir: &Path,
    json_dir: &Path,
    instruction: &str,
) -> Result<()> {
    let subimages = layout::collect_subimages(image_dir, name);
    if subimages.is_empty() {
        return Err(RaiderError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no subimages found for figure '{name}'"),
        )));
    }

    let mut images = Vec::with_capacity(subimages.len());
    for path in &subimages {
        images.push(InlineImage::png(tokio::fs::read(path).await?));
    }

    let mut extra_text = Vec::new();
    let caption_path = layout::caption_path(image_dir, name);
    if caption_path.is_file() {
        let caption = tokio::fs::read_to_string(&caption_path).await?;
        extra_text.push(caption.trim().to_string());
        tracing::debug!(figure = name, "caption appended");
    } else {
        tracing::debug!(figure = name, "no caption found");
    }

    let request = VisionRequest {
        instruction: instruction.trim().to_string(),
        images,
        extra_text,
    };

    let reply = model.generate(&request).await.inspect_err(|err| {
        tracing::error!(figure = name, error = %err, "extraction request failed, no output written");
    })?;

    let response_path = layout::response_path(json_dir, name);
    persist_reply(&response_path, &layout::token_count_path(json_dir, name), &reply.text, &reply.usage).await?;
    tracing::info!(figure = name, path = %response_path.display(), "reaction data saved");

    if let Err(err) = normalize_json_file(&response_path).await {
        tracing::warn!(figure = name, error = %err, "reaction data not cleaned");
    }
    Ok(())
}

/// Persist a model reply: the text JSON-string-encoded (as received from the
/// wire) and its token-usage record in the `token_count/` subdirectory.
pub(crate) async fn persist_reply(
    response_path: &Path,
    token_path: &Path,
    text: &str,
    usage: &TokenUsage,
) -> Result<()> {
    if let Some(parent) = response_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    if let Some(parent) = token_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(response_path, serde_json::to_string(text)?).await?;
    tokio::fs::write(token_path, serde_json::to_string(usage)?).await?;
    Ok(())
}
