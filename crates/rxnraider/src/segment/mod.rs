//! Adaptive figure segmentation.
//!
//! Splits composite figure images into subfigures along horizontal
//! whitespace bands: [`profile`] locates individual cut rows,
//! [`splitter`] drives the detection across a whole image and persists the
//! resulting segments.

pub mod profile;
pub mod splitter;

pub use profile::{Region, RowProfile, find_split_line};
pub use splitter::{
    BatchCropSummary, CROPPED_DIR, CropOutcome, IMAGE_EXTENSIONS, adaptive_split_lines, batch_crop, crop_figure,
    segment_rows,
};
