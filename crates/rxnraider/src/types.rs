//! Shared data types for the figure pipeline.

use serde::{Deserialize, Serialize};

/// Sentinel marking "no reaction data recognized".
///
/// Distinguishes a resolved-but-empty recognition outcome from an aborted
/// step, which leaves no output at all.
pub const NOT_RECOGNIZED: &str = "N.R";

/// Token-accounting record returned alongside each vision-model call.
///
/// Persisted once per call, never merged or mutated. Provider-specific
/// counters beyond the three standard fields are preserved verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(flatten)]
    pub additional: serde_json::Map<String, serde_json::Value>,
}

/// One molecule entry in a recognizer prediction.
///
/// Entries without a structure string are legal; they are dropped during the
/// structure merge since a partial recognition is still informative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureEntry {
    /// Recognized structure string, if the recognizer resolved one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smiles: Option<String>,

    /// Entry category reported by the recognizer (e.g. "mol", "txt")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// One predicted reaction from the structure-recognition capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionPrediction {
    #[serde(default)]
    pub reactants: Vec<StructureEntry>,
    #[serde(default)]
    pub products: Vec<StructureEntry>,
}

/// One side (reactants or products) of the merged SMILES record.
///
/// Serializes either as a list of structure strings or as the `"N.R"`
/// sentinel string, matching the persisted record layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructureSet {
    Recognized(Vec<String>),
    NotRecognized(String),
}

impl StructureSet {
    /// The unresolved sentinel value.
    pub fn not_recognized() -> Self {
        StructureSet::NotRecognized(NOT_RECOGNIZED.to_string())
    }

    /// Whether this side carries recognized structures.
    pub fn is_recognized(&self) -> bool {
        matches!(self, StructureSet::Recognized(_))
    }
}

/// The `"SMILES"` entry of a merged reaction record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmilesRecord {
    pub reactants: StructureSet,
    pub products: StructureSet,
}

impl SmilesRecord {
    /// Both sides unresolved; the "fully unresolved" half of the pipeline
    /// invariant.
    pub fn not_recognized() -> Self {
        Self {
            reactants: StructureSet::not_recognized(),
            products: StructureSet::not_recognized(),
        }
    }
}
