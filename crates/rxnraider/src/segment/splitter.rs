//! Adaptive subfigure segmentation and persistence.
//!
//! Source figures stack a reaction-scheme diagram above rows of tabular
//! data. The segmenter cuts the figure along whitespace bands: one fixed
//! fractional region locates the diagram/table boundary, then evenly sized
//! moving regions cover the remaining height. Cutting can fail on noisy
//! layouts; the splitter then degrades to persisting the original image
//! unsplit, because the downstream extraction step requires at least one
//! image file per figure.

use crate::config::SegmentationConfig;
use crate::error::{RaiderError, Result};
use crate::segment::profile::{Region, RowProfile, find_split_line};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Recognized source-figure extensions.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Subdirectory that receives all persisted segments.
pub const CROPPED_DIR: &str = "cropped_images";

/// How a figure was persisted by [`crop_figure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropOutcome {
    /// This many non-empty segments were written.
    Segments(u32),
    /// Segmentation failed; the original image was written unsplit.
    Original,
}

/// Outcome counts for a [`batch_crop`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCropSummary {
    pub processed: u32,
    pub failed: u32,
}

/// Compute the ordered Split-Line Set for a whole image.
///
/// The first cut is searched in the configured fractional region
/// (`[first_region_start*H, first_region_end*H)` - the boundary expected to
/// separate the reaction diagram from the table below). The height after
/// that region is covered by `ceil(remaining / min_segment_height)` further
/// segments of even height, one detector pass each.
///
/// The returned list always has at least one entry. Lines are not guaranteed
/// monotonically increasing on pathological inputs; [`segment_rows`] absorbs
/// that by producing empty segments.
pub fn adaptive_split_lines(profile: &RowProfile, config: &SegmentationConfig) -> Vec<u32> {
    let height = profile.height();
    let first_region = Region::new(
        (f64::from(height) * config.first_region_start) as u32,
        (f64::from(height) * config.first_region_end) as u32,
    );
    let first_line = find_split_line(profile, first_region, config);

    let mut lines = vec![first_line];
    let remaining = height.saturating_sub(first_region.end);
    if remaining == 0 {
        return lines;
    }

    let num_segments = remaining.div_ceil(config.min_segment_height);
    let segment_height = remaining / num_segments;

    let mut region_start = first_region.end;
    for _ in 0..num_segments {
        let region = Region::new(region_start, region_start + segment_height);
        lines.push(find_split_line(profile, region, config));
        region_start = region.end;
    }

    lines
}

/// Cut `[0, height)` into row ranges at each split line, plus one final
/// range to the image end.
///
/// Ranges are clamped so their concatenation, in order, reconstructs exactly
/// `height` rows with no gaps or overlaps. A line behind the cursor or past
/// the image end yields an empty range, never an error.
pub fn segment_rows(height: u32, lines: &[u32]) -> Vec<(u32, u32)> {
    let mut segments = Vec::with_capacity(lines.len() + 1);
    let mut cursor = 0u32;
    for &line in lines {
        let end = line.min(height).max(cursor);
        segments.push((cursor, end));
        cursor = end;
    }
    segments.push((cursor, height));
    segments
}

/// Segment one figure and persist every non-empty segment.
///
/// Segments are written as `{name}_{i}.png` (1-based, in split order) under
/// `{image_dir}/cropped_images/`. If segmentation fails in any way (invalid
/// parameters, an empty line set, every segment empty, or an encode error)
/// the original image is written as `{name}_original.png` instead.
///
/// # Errors
///
/// `RaiderError::Io` when no source image exists for `name`, and
/// `ImageProcessing` when the source cannot be decoded. Segmentation
/// failures are not errors; they degrade to the `_original` fallback.
pub fn crop_figure(name: &str, image_dir: &Path, config: &SegmentationConfig) -> Result<CropOutcome> {
    let cropped_dir = image_dir.join(CROPPED_DIR);
    std::fs::create_dir_all(&cropped_dir)?;

    let source = find_source_image(name, image_dir).ok_or_else(|| {
        RaiderError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no source image for figure '{name}' in {}", image_dir.display()),
        ))
    })?;
    let image = image::open(&source)?;

    match split_and_persist(&image, name, &cropped_dir, config) {
        Ok(count) => {
            tracing::debug!(figure = name, segments = count, "figure segmented");
            Ok(CropOutcome::Segments(count))
        }
        Err(err) => {
            tracing::warn!(
                figure = name,
                error = %err,
                "segmentation failed, saving original image unsplit"
            );
            image.save(cropped_dir.join(format!("{name}_original.png")))?;
            Ok(CropOutcome::Original)
        }
    }
}

/// Segment every supported image file in `image_dir`.
///
/// Each file's transform is independent; one figure's failure never stops
/// the batch. Outputs land under a single `cropped_images/` subdirectory.
pub fn batch_crop(image_dir: &Path, config: &SegmentationConfig) -> Result<BatchCropSummary> {
    let mut summary = BatchCropSummary::default();
    for entry in std::fs::read_dir(image_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || !has_image_extension(&path) {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match crop_figure(name, image_dir, config) {
            Ok(_) => summary.processed += 1,
            Err(err) => {
                tracing::warn!(figure = name, error = %err, "figure skipped");
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

fn split_and_persist(image: &DynamicImage, name: &str, cropped_dir: &Path, config: &SegmentationConfig) -> Result<u32> {
    config.validate()?;

    let profile = RowProfile::from_image(&image.to_luma8(), config.white_threshold);
    let lines = adaptive_split_lines(&profile, config);
    persist_segments(image, &lines, name, cropped_dir)
}

/// Write every non-empty segment; empty segments are dropped, never
/// persisted. An empty Split-Line Set or zero written segments is a failure
/// so the caller can degrade to the original image.
pub(crate) fn persist_segments(
    image: &DynamicImage,
    lines: &[u32],
    name: &str,
    cropped_dir: &Path,
) -> Result<u32> {
    if lines.is_empty() {
        return Err(RaiderError::image_processing(format!(
            "no valid split lines for figure '{name}'"
        )));
    }

    let mut written = 0u32;
    for (idx, &(start, end)) in segment_rows(image.height(), lines).iter().enumerate() {
        if end <= start {
            tracing::warn!(figure = name, segment = idx + 1, "zero-size segment skipped");
            continue;
        }
        let segment = image.crop_imm(0, start, image.width(), end - start);
        segment.save(cropped_dir.join(format!("{}_{}.png", name, idx + 1)))?;
        written += 1;
    }

    if written == 0 {
        return Err(RaiderError::image_processing(format!(
            "no segment of figure '{name}' has a valid size"
        )));
    }
    Ok(written)
}

fn find_source_image(name: &str, image_dir: &Path) -> Option<PathBuf> {
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| image_dir.join(format!("{name}.{ext}")))
        .find(|path| path.is_file())
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use tempfile::TempDir;

    fn white_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([255u8])))
    }

    fn profile_of(image: &DynamicImage, config: &SegmentationConfig) -> RowProfile {
        RowProfile::from_image(&image.to_luma8(), config.white_threshold)
    }

    #[test]
    fn test_split_line_count_for_all_white_image() {
        // 400px tall, first region [100, 150): every row is blank, so the
        // first cut lands at 150. Remaining 250px with min height 120 gives
        // 3 further segments of 83px each, one line per segment.
        let config = SegmentationConfig::default();
        let image = white_image(60, 400);
        let lines = adaptive_split_lines(&profile_of(&image, &config), &config);
        assert_eq!(lines, vec![150, 233, 316, 399]);
    }

    #[test]
    fn test_split_lines_never_empty() {
        let config = SegmentationConfig::default();
        for height in [1, 2, 7, 119, 120, 399] {
            let image = white_image(10, height);
            let lines = adaptive_split_lines(&profile_of(&image, &config), &config);
            assert!(!lines.is_empty(), "height {height}");
        }
    }

    #[test]
    fn test_segment_rows_reconstruct_image_height() {
        for (height, lines) in [
            (400u32, vec![150u32, 233, 316, 399]),
            (400, vec![399, 150, 316]), // non-monotone
            (100, vec![0, 0, 100]),
            (50, vec![500]), // past the end
            (10, vec![]),
        ] {
            let segments = segment_rows(height, &lines);
            assert_eq!(segments.len(), lines.len() + 1);
            let mut cursor = 0;
            let mut total = 0;
            for &(start, end) in &segments {
                assert_eq!(start, cursor, "gap or overlap at {start}");
                assert!(end >= start);
                cursor = end;
                total += end - start;
            }
            assert_eq!(cursor, height);
            assert_eq!(total, height);
        }
    }

    #[test]
    fn test_segment_rows_negative_range_is_empty() {
        let segments = segment_rows(100, &[80, 40]);
        assert_eq!(segments, vec![(0, 80), (80, 80), (80, 100)]);
    }

    #[test]
    fn test_crop_figure_writes_five_segments() {
        let dir = TempDir::new().unwrap();
        white_image(60, 400).save(dir.path().join("fig3.png")).unwrap();

        let outcome = crop_figure("fig3", dir.path(), &SegmentationConfig::default()).unwrap();
        assert_eq!(outcome, CropOutcome::Segments(5));

        let cropped = dir.path().join(CROPPED_DIR);
        for i in 1..=5 {
            assert!(cropped.join(format!("fig3_{i}.png")).is_file(), "missing segment {i}");
        }
        assert!(!cropped.join("fig3_original.png").exists());

        // Segment heights reconstruct the full figure.
        let total: u32 = (1..=5)
            .map(|i| image::open(cropped.join(format!("fig3_{i}.png"))).unwrap().height())
            .sum();
        assert_eq!(total, 400);
    }

    #[test]
    fn test_crop_figure_degrades_to_original_on_bad_config() {
        let dir = TempDir::new().unwrap();
        white_image(40, 300).save(dir.path().join("fig1.png")).unwrap();

        let config = SegmentationConfig {
            step_size: 0,
            ..Default::default()
        };
        let outcome = crop_figure("fig1", dir.path(), &config).unwrap();
        assert_eq!(outcome, CropOutcome::Original);

        let cropped = dir.path().join(CROPPED_DIR);
        let files: Vec<_> = std::fs::read_dir(&cropped)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(files, vec!["fig1_original.png".to_string()]);
    }

    #[test]
    fn test_persist_segments_rejects_empty_line_set() {
        let dir = TempDir::new().unwrap();
        let err = persist_segments(&white_image(10, 10), &[], "fig", dir.path()).unwrap_err();
        assert!(matches!(err, RaiderError::ImageProcessing { .. }));
    }

    #[test]
    fn test_crop_figure_missing_image() {
        let dir = TempDir::new().unwrap();
        let err = crop_figure("absent", dir.path(), &SegmentationConfig::default()).unwrap_err();
        assert!(matches!(err, RaiderError::Io(_)));
    }

    #[test]
    fn test_crop_figure_accepts_other_extensions() {
        let dir = TempDir::new().unwrap();
        white_image(40, 240)
            .to_rgb8()
            .save(dir.path().join("fig2.jpg"))
            .unwrap();
        let outcome = crop_figure("fig2", dir.path(), &SegmentationConfig::default()).unwrap();
        assert!(matches!(outcome, CropOutcome::Segments(_)));
    }

    #[test]
    fn test_batch_crop_processes_directory() {
        let dir = TempDir::new().unwrap();
        white_image(30, 260).save(dir.path().join("a.png")).unwrap();
        white_image(30, 260).save(dir.path().join("b.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "caption").unwrap();

        let summary = batch_crop(dir.path(), &SegmentationConfig::default()).unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 0);

        let cropped = dir.path().join(CROPPED_DIR);
        assert!(cropped.join("a_1.png").is_file());
        assert!(cropped.join("b_1.png").is_file());
    }
}
