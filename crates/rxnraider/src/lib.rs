//! RxnRaider - Reaction-Optimization Data Extraction
//!
//! RxnRaider turns composite reaction-optimization figures from the
//! chemistry literature into machine-readable records. It segments each
//! figure into subimages at blank horizontal bands, drives a vision-language
//! model over the segments to extract the optimization-run table as JSON,
//! reconciles the table against the figure's footnotes with a follow-up
//! call, and merges reactant/product SMILES from a molecular-diagram
//! recognizer into one final record per figure.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rxnraider::config::RaiderConfig;
//! use rxnraider::pipeline::{FigureProcessor, FigurePrompts};
//! use rxnraider::recognize::HttpRecognizer;
//! use rxnraider::segment::batch_crop;
//! use rxnraider::vision::OpenAiVision;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn run() -> rxnraider::Result<()> {
//! let config = RaiderConfig::from_toml_file("rxnraider.toml")?;
//! batch_crop(Path::new("figures"), &config.segmentation)?;
//!
//! let processor = FigureProcessor::new(
//!     Arc::new(OpenAiVision::new(config.vision)?),
//!     Arc::new(HttpRecognizer::new(config.recognizer)?),
//!     "figures",
//!     "records",
//! );
//! let prompts = FigurePrompts {
//!     extraction: std::fs::read_to_string("prompts/get_data_prompt.txt")?,
//!     footnotes: std::fs::read_to_string("prompts/update_dict_prompt.txt")?,
//! };
//! let summary = processor.process_directory(&prompts).await?;
//! println!("processed {}, failed {}", summary.processed, summary.failed);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Segmentation** (`segment`): row-profile blank-band detection and
//!   adaptive figure splitting into `cropped_images/`
//! - **Pipeline** (`pipeline`): extraction, footnote-merge, and
//!   structure-merge stages with per-figure status tracking
//! - **Capability ports** (`vision`, `recognize`): trait seams over the
//!   vision-language model and the molecular-diagram recognizer, with HTTP
//!   implementations
//! - **Prompt compilation** (`prompt`): expands the extraction instruction
//!   template from a selected field taxonomy

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod recognize;
pub mod segment;
pub mod types;
pub mod vision;

pub use error::{RaiderError, Result};
pub use types::*;

pub use config::{RaiderConfig, RecognizerConfig, SegmentationConfig, VisionConfig};

pub use pipeline::{BatchSummary, FigureProcessor, FigurePrompts, FigureStage, FigureStatus, StatusLedger};

pub use segment::{BatchCropSummary, CropOutcome, batch_crop, crop_figure};

pub use prompt::{CustomKey, compile_prompt, compile_prompt_file};

pub use recognize::{HttpRecognizer, StructureRecognizer};
pub use vision::{InlineImage, OpenAiVision, VisionModel, VisionReply, VisionRequest};
