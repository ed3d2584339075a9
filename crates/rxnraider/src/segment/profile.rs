//! Row-whitespace profiles and split-line detection.
//!
//! A figure is segmented along horizontal whitespace bands. The detector
//! works over a precomputed per-row count of background pixels so repeated
//! scans over moving regions never re-touch pixel data.

use crate::config::SegmentationConfig;
use image::GrayImage;

/// A half-open row interval `[start, end)` over an image's row axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: u32,
    pub end: u32,
}

impl Region {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// Per-row background-pixel counts for a grayscale image.
#[derive(Debug, Clone)]
pub struct RowProfile {
    counts: Vec<u32>,
    width: u32,
}

impl RowProfile {
    /// Count background pixels (intensity >= `white_threshold`) per row.
    pub fn from_image(image: &GrayImage, white_threshold: u8) -> Self {
        let width = image.width();
        let counts = image
            .rows()
            .map(|row| row.filter(|px| px.0[0] >= white_threshold).count() as u32)
            .collect();
        Self { counts, width }
    }

    /// Number of rows in the profile.
    pub fn height(&self) -> u32 {
        self.counts.len() as u32
    }

    /// Fraction of background pixels in `row`.
    ///
    /// Rows outside the profile and rows of a zero-width image count as
    /// fully blank.
    pub fn blank_fraction(&self, row: u32) -> f64 {
        if self.width == 0 {
            return 1.0;
        }
        match self.counts.get(row as usize) {
            Some(&count) => f64::from(count) / f64::from(self.width),
            None => 1.0,
        }
    }
}

/// Find the row to cut along within `region`.
///
/// Scans backward from `region.end` at `step_size` granularity and returns
/// the last row whose background fraction meets or exceeds
/// `blank_row_fraction`. Reaching `region.start` without a qualifying row
/// forces the cut at `region.start`. Coarse physical gaps between figure
/// elements are reliably wide, so probing every `step_size`-th row is safe.
///
/// Pure: same inputs, same output. The result is always within
/// `[region.start, region.end]`.
pub fn find_split_line(profile: &RowProfile, region: Region, config: &SegmentationConfig) -> u32 {
    if region.end <= region.start {
        return region.start;
    }

    let top_row = profile.height().saturating_sub(1);
    let mut row = region.end.min(top_row);
    while row > region.start {
        if profile.blank_fraction(row) >= config.blank_row_fraction {
            return row;
        }
        row = row.saturating_sub(config.step_size);
    }

    region.start
}
