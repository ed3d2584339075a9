//! Molecular-structure recognition capability port.
//!
//! The pipeline treats the recognizer as a black box: given one image,
//! return zero or more reaction predictions, each optionally carrying
//! reactant/product entries, each optionally carrying a structure string.
//! Any diagram-to-SMILES model behind [`StructureRecognizer`] satisfies it;
//! tests substitute deterministic fakes.

pub mod http;

use crate::Result;
use crate::types::ReactionPrediction;
use async_trait::async_trait;

pub use http::HttpRecognizer;

/// The injected structure-recognition capability.
#[async_trait]
pub trait StructureRecognizer: Send + Sync {
    /// Predict reactions in one encoded image.
    ///
    /// # Errors
    ///
    /// - `RaiderError::Network` - the call failed; the caller applies the
    ///   `"N.R"` fallback, it never aborts the figure
    /// - `RaiderError::Timeout` - the call exceeded its deadline
    async fn predict(&self, image_bytes: &[u8]) -> Result<Vec<ReactionPrediction>>;
}
