//! Footnote reconciliation.
//!
//! Figures qualify many table entries in footnotes ("a. 2 mol% catalyst",
//! "b. run at 60 °C"). A second, text-only model call reconciles the
//! already-extracted record against that footnote text and persists the
//! enriched record as an `_updated` sibling file.

use crate::error::Result;
use crate::pipeline::extract::persist_reply;
use crate::pipeline::layout;
use crate::pipeline::normalize::normalize_json_file;
use crate::vision::{VisionModel, VisionRequest};
use std::path::Path;

/// Enrich one figure's extracted record using footnote text.
///
/// Submits the follow-up instruction plus the serialized existing record (no
/// images) and persists the response as `{name}_response_updated.json` with
/// its own token-usage record, then normalizes it. Same failure policy as
/// extraction: on request failure nothing is written and the figure may be
/// re-driven.
///
/// # Errors
///
/// - `RaiderError::Io` - the figure has no extracted record yet
/// - `RaiderError::Network` / `Timeout` - the capability call failed
pub async fn merge_footnotes(model: &dyn VisionModel, name: &str, json_dir: &Path, instruction: &str) -> Result<()> {
    let record = tokio::fs::read_to_string(layout::response_path(json_dir, name)).await?;

    let request = VisionRequest {
        instruction: instruction.trim().to_string(),
        images: Vec::new(),
        extra_text: vec![record],
    };

    let reply = model.generate(&request).await.inspect_err(|err| {
        tracing::error!(figure = name, error = %err, "footnote-merge request failed, no output written");
    })?;

    let updated_path = layout::updated_response_path(json_dir, name);
    persist_reply(
        &updated_path,
        &layout::updated_token_count_path(json_dir, name),
        &reply.text,
        &reply.usage,
    )
    .await?;
    tracing::info!(figure = name, path = %updated_path.display(), "footnote-merged record saved");

    if let Err(err) = normalize_json_file(&updated_path).await {
        tracing::warn!(figure = name, error = %err, "footnote-merged record not cleaned");
    }
    Ok(())
}
