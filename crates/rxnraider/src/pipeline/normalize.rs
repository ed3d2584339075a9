//! Near-JSON repair for model output.
//!
//! Vision-language models wrap JSON in markdown code fences, and the raw
//! response files additionally carry the text JSON-string-encoded, so the
//! payload arrives as `"```json\n{\"a\":1}\n```"`. The normalizer strips the
//! fence artifacts, drops escaped newlines, unescapes quotes, and rewrites
//! the file as strict JSON with canonical 4-space indentation.

use crate::error::{RaiderError, Result};
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use std::path::Path;

/// Strip fence markers and escape artifacts from a raw response payload.
pub fn clean_response_text(raw: &str) -> String {
    raw.replace("\"```json\\n", "")
        .replace("```\"", "")
        .trim()
        .replace("\\n", "")
        .replace("\\\"", "\"")
}

/// Clean and parse a raw response payload.
///
/// # Errors
///
/// `RaiderError::Format` when the cleaned text is not valid JSON. Callers
/// must catch and continue rather than crash the batch; the raw file is
/// kept as evidence.
pub fn normalize_text(raw: &str) -> Result<Value> {
    let cleaned = clean_response_text(raw);
    serde_json::from_str(&cleaned)
        .map_err(|e| RaiderError::format_with_source("model output is not repairable JSON", e))
}

/// Serialize a JSON value with 4-space indentation and a trailing newline.
pub fn to_pretty_json(value: &Value) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    serde::Serialize::serialize(value, &mut serializer)?;
    let mut text = String::from_utf8(buffer)
        .map_err(|e| RaiderError::format_with_source("serialized JSON is not UTF-8", e))?;
    text.push('\n');
    Ok(text)
}

/// Repair a persisted response file in place.
///
/// Idempotent on already-clean JSON: re-normalizing a prior successful
/// output leaves semantic content unchanged.
pub async fn normalize_json_file(path: &Path) -> Result<()> {
    let raw = tokio::fs::read_to_string(path).await?;
    let value = normalize_text(&raw)?;
    tokio::fs::write(path, to_pretty_json(&value)?).await?;
    Ok(())
}
