//! Multi-stage reconciliation pipeline.
//!
//! Per figure, three stages run in strict sequence, each consuming the
//! previous stage's output file:
//!
//! 1. [`extract`] - vision-model extraction over the segmented subimages
//! 2. [`footnotes`] - text-only reconciliation against footnote text
//! 3. [`structures`] - recognizer SMILES merged into the final record
//!
//! [`normalize`] repairs near-JSON model output inside stages 1 and 2,
//! [`status`] persists per-figure progress, and [`processor`] sequences the
//! stages and drives whole directories. All stages are per-figure and
//! non-fatal to a batch.

pub mod extract;
pub mod footnotes;
pub mod layout;
pub mod normalize;
pub mod processor;
pub mod status;
pub mod structures;

pub use extract::extract_figure_data;
pub use footnotes::merge_footnotes;
pub use normalize::{clean_response_text, normalize_json_file, normalize_text, to_pretty_json};
pub use processor::{BatchSummary, FigureProcessor, FigurePrompts};
pub use status::{FigureStage, FigureStatus, StatusLedger};
pub use structures::{merge_structures, resolve_structures};
