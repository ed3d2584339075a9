//! Instruction-template compilation.
//!
//! The extraction instruction sent to the vision model is parameterized by
//! which optimization-run fields it must populate. A base template carries a
//! `<INSERT_HERE>` marker line; compilation replaces that line with the
//! selected field descriptions, drawn from a built-in key catalog plus any
//! user-defined (key, description) pairs. The compiled text is what the
//! processor passes as the extraction prompt.

use crate::error::{RaiderError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Marker line in the base template that the key list replaces.
pub const INSERT_MARKER: &str = "<INSERT_HERE>";

/// File names the directory-level API reads and writes.
pub const BASE_PROMPT_FILE: &str = "base_prompt.txt";
pub const INBUILT_KEYS_FILE: &str = "inbuilt_keyvaluepairs.txt";
pub const COMPILED_PROMPT_FILE: &str = "get_data_prompt.txt";

static QUOTED_KEY_RE: OnceLock<Regex> = OnceLock::new();

fn quoted_key_re() -> &'static Regex {
    QUOTED_KEY_RE.get_or_init(|| Regex::new(r#""([^"]*)""#).unwrap())
}

/// A user-defined extraction field, rendered as `"key": "description"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomKey {
    pub key: String,
    pub description: String,
}

impl CustomKey {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }
}

/// Select the catalog lines whose quoted keys intersect `selected_keys`.
///
/// A catalog line describes one built-in field and carries its key (and
/// possibly example values) in double quotes. Blank lines and lines without
/// any quoted string are skipped. A line is kept when at least one of its
/// quoted strings names a selected key; line text is kept verbatim so the
/// catalog's own formatting survives.
fn selected_catalog_lines<'a>(catalog: &'a str, selected_keys: &[String]) -> Vec<&'a str> {
    catalog
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| {
            quoted_key_re()
                .captures_iter(line)
                .any(|cap| selected_keys.iter().any(|key| key == &cap[1]))
        })
        .collect()
}

/// Expand the base template with the selected and user-defined keys.
///
/// Each line of `base_template` containing [`INSERT_MARKER`] is replaced by
/// the user-defined pairs (in given order) followed by the matching catalog
/// lines (in catalog order); every other line passes through unchanged.
///
/// # Errors
///
/// Returns `RaiderError::Validation` when the template has no marker, since
/// a compiled prompt that silently dropped every key would extract nothing.
pub fn compile_prompt(
    base_template: &str,
    catalog: &str,
    selected_keys: &[String],
    custom_keys: &[CustomKey],
) -> Result<String> {
    if !base_template.contains(INSERT_MARKER) {
        return Err(RaiderError::validation(format!(
            "prompt template does not contain the {INSERT_MARKER} marker"
        )));
    }

    let mut key_lines: Vec<String> = custom_keys
        .iter()
        .map(|pair| format!("\"{}\": \"{}\"", pair.key, pair.description))
        .collect();
    key_lines.extend(
        selected_catalog_lines(catalog, selected_keys)
            .into_iter()
            .map(|line| line.to_string()),
    );

    let mut compiled = Vec::new();
    for line in base_template.lines() {
        if line.contains(INSERT_MARKER) {
            compiled.extend(key_lines.iter().cloned());
        } else {
            compiled.push(line.to_string());
        }
    }
    Ok(compiled.join("\n") + "\n")
}

/// Compile the extraction prompt from a prompt directory.
///
/// Reads `base_prompt.txt` and `inbuilt_keyvaluepairs.txt` from
/// `prompt_dir`, writes the compiled text to `get_data_prompt.txt` next to
/// them, and returns the output path.
pub async fn compile_prompt_file(
    prompt_dir: &Path,
    selected_keys: &[String],
    custom_keys: &[CustomKey],
) -> Result<PathBuf> {
    let base_template = tokio::fs::read_to_string(prompt_dir.join(BASE_PROMPT_FILE)).await?;
    let catalog = tokio::fs::read_to_string(prompt_dir.join(INBUILT_KEYS_FILE)).await?;

    let compiled = compile_prompt(&base_template, &catalog, selected_keys, custom_keys)?;

    let output_path = prompt_dir.join(COMPILED_PROMPT_FILE);
    tokio::fs::write(&output_path, &compiled).await?;
    tracing::debug!(path = %output_path.display(), "extraction prompt compiled");
    Ok(output_path)
}
