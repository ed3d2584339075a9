//! Structure merge: reactant/product SMILES into the reaction record.
//!
//! Runs the structure-recognition capability against the figure's primary
//! diagram segment and folds the result into the optimization-run record.
//! The pipeline invariant is "fully resolved or fully unresolved": either
//! both sides carry structures, or both are the `"N.R"` sentinel.

use crate::error::{RaiderError, Result};
use crate::pipeline::layout;
use crate::pipeline::normalize::to_pretty_json;
use crate::recognize::StructureRecognizer;
use crate::types::{SmilesRecord, StructureSet};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Merge recognized structures into one figure's record.
///
/// Runs the recognizer on `cropped_images/{name}_1.png` (or the `_original`
/// degrade file), resolves the SMILES sides per the fallback policy, locates
/// the record key containing `"optimization"` (case-insensitive) and
/// overwrites the record file with
/// `{"SMILES": {...}, "Optimization Runs": <located value>}`.
///
/// Recognizer failure is not an error: it produces the `"N.R"` sentinel,
/// which is a documented success-with-unresolved-data outcome.
///
/// # Errors
///
/// - `RaiderError::Io` - primary segment or record file missing
/// - `RaiderError::Format` - the record file is not valid JSON
/// - `RaiderError::Schema` - no "optimization"-named key; the record file is
///   left untouched
pub async fn merge_structures(
    recognizer: &dyn StructureRecognizer,
    name: &str,
    image_dir: &Path,
    json_dir: &Path,
) -> Result<()> {
    let segment = layout::primary_segment_path(image_dir, name).ok_or_else(|| {
        RaiderError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no primary segment for figure '{name}'"),
        ))
    })?;
    let image_bytes = tokio::fs::read(&segment).await?;

    let smiles = resolve_structures(recognizer, &image_bytes).await;

    let record_path = record_path(json_dir, name)?;
    let record: Value = serde_json::from_str(&tokio::fs::read_to_string(&record_path).await?)?;

    let Some(opt_key) = find_optimization_key(&record) else {
        tracing::warn!(
            figure = name,
            "no optimization key found in the record, SMILES not added"
        );
        return Err(RaiderError::schema(format!(
            "record for figure '{name}' has no key containing 'optimization'"
        )));
    };

    let merged = json!({
        "SMILES": smiles,
        "Optimization Runs": record[&opt_key],
    });
    tokio::fs::write(&record_path, to_pretty_json(&merged)?).await?;
    tracing::info!(figure = name, "record updated with reaction SMILES");
    Ok(())
}

/// Resolve both SMILES sides from the recognizer output.
///
/// Only entries carrying a structure string are kept; a partial recognition
/// is still informative. Fallback policy, in strict order: recognizer error,
/// zero predictions, or a first prediction with an empty reactant or product
/// list after filtering all resolve to the sentinel on both sides. Otherwise
/// the first prediction's lists are used verbatim.
pub async fn resolve_structures(recognizer: &dyn StructureRecognizer, image_bytes: &[u8]) -> SmilesRecord {
    let predictions = match recognizer.predict(image_bytes).await {
        Ok(predictions) => predictions,
        Err(err) => {
            tracing::warn!(error = %err, "no reaction SMILES extracted, returning 'N.R'");
            return SmilesRecord::not_recognized();
        }
    };

    let Some(first) = predictions.first() else {
        return SmilesRecord::not_recognized();
    };

    let reactants: Vec<String> = first.reactants.iter().filter_map(|e| e.smiles.clone()).collect();
    let products: Vec<String> = first.products.iter().filter_map(|e| e.smiles.clone()).collect();

    if reactants.is_empty() || products.is_empty() {
        return SmilesRecord::not_recognized();
    }

    SmilesRecord {
        reactants: StructureSet::Recognized(reactants),
        products: StructureSet::Recognized(products),
    }
}

/// The footnote-merged record when present, else the base extraction record.
fn record_path(json_dir: &Path, name: &str) -> Result<PathBuf> {
    let updated = layout::updated_response_path(json_dir, name);
    if updated.is_file() {
        return Ok(updated);
    }
    let base = layout::response_path(json_dir, name);
    if base.is_file() {
        return Ok(base);
    }
    Err(RaiderError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("no extracted record for figure '{name}'"),
    )))
}

fn find_optimization_key(record: &Value) -> Option<String> {
    record
        .as_object()?
        .keys()
        .find(|key| key.to_lowercase().contains("optimization"))
        .cloned()
}
