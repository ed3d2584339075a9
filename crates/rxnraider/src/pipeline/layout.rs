//! Per-figure filesystem layout.
//!
//! Every figure owns an independent file set, keyed by its name:
//!
//! - `{image_dir}/{name}.{ext}` - source figure
//! - `{image_dir}/{name}.txt` - optional caption
//! - `{image_dir}/cropped_images/{name}_{n}.png` - nth segment (1-based),
//!   or `{name}_original.png` on segmentation degrade
//! - `{json_dir}/{name}_response.json` - raw extraction output
//! - `{json_dir}/{name}_response_updated.json` - footnote-merged output
//! - `{json_dir}/token_count/{name}[_updated]_tokencount.json` - usage records
//! - `{json_dir}/status/{name}.json` - per-figure status

use crate::segment::CROPPED_DIR;
use std::path::{Path, PathBuf};

/// Subdirectory of the JSON directory holding token-usage records.
pub const TOKEN_COUNT_DIR: &str = "token_count";

/// Subdirectory of the JSON directory holding per-figure status files.
pub const STATUS_DIR: &str = "status";

pub fn caption_path(image_dir: &Path, name: &str) -> PathBuf {
    image_dir.join(format!("{name}.txt"))
}

pub fn response_path(json_dir: &Path, name: &str) -> PathBuf {
    json_dir.join(format!("{name}_response.json"))
}

pub fn updated_response_path(json_dir: &Path, name: &str) -> PathBuf {
    json_dir.join(format!("{name}_response_updated.json"))
}

pub fn token_count_path(json_dir: &Path, name: &str) -> PathBuf {
    json_dir.join(TOKEN_COUNT_DIR).join(format!("{name}_tokencount.json"))
}

pub fn updated_token_count_path(json_dir: &Path, name: &str) -> PathBuf {
    json_dir
        .join(TOKEN_COUNT_DIR)
        .join(format!("{name}_updated_tokencount.json"))
}

/// Ordered segment files for a figure: `{name}_1.png`, `{name}_2.png`, ...
/// in split order, or the single `{name}_original.png` degrade file when no
/// numbered segments exist. Empty when the figure was never cropped.
pub fn collect_subimages(image_dir: &Path, name: &str) -> Vec<PathBuf> {
    let cropped = image_dir.join(CROPPED_DIR);

    let mut paths = Vec::new();
    for index in 1.. {
        let path = cropped.join(format!("{name}_{index}.png"));
        if !path.is_file() {
            break;
        }
        paths.push(path);
    }

    if paths.is_empty() {
        let original = cropped.join(format!("{name}_original.png"));
        if original.is_file() {
            paths.push(original);
        }
    }

    paths
}

/// The figure's primary diagram segment: the first numbered segment, or the
/// `_original` degrade file.
pub fn primary_segment_path(image_dir: &Path, name: &str) -> Option<PathBuf> {
    let cropped = image_dir.join(CROPPED_DIR);
    let first = cropped.join(format!("{name}_1.png"));
    if first.is_file() {
        return Some(first);
    }
    let original = cropped.join(format!("{name}_original.png"));
    original.is_file().then_some(original)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"png").unwrap();
    }

    #[test]
    fn test_collect_subimages_in_split_order() {
        let dir = TempDir::new().unwrap();
        let cropped = dir.path().join(CROPPED_DIR);
        for i in 1..=3 {
            touch(&cropped.join(format!("fig_{i}.png")));
        }

        let paths = collect_subimages(dir.path(), "fig");
        assert_eq!(paths.len(), 3);
        for (i, path) in paths.iter().enumerate() {
            assert!(path.ends_with(format!("fig_{}.png", i + 1)));
        }
    }

    #[test]
    fn test_collect_subimages_stops_at_gap() {
        let dir = TempDir::new().unwrap();
        let cropped = dir.path().join(CROPPED_DIR);
        touch(&cropped.join("fig_1.png"));
        touch(&cropped.join("fig_3.png"));

        let paths = collect_subimages(dir.path(), "fig");
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn test_collect_subimages_falls_back_to_original() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join(CROPPED_DIR).join("fig_original.png"));

        let paths = collect_subimages(dir.path(), "fig");
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("fig_original.png"));
    }

    #[test]
    fn test_collect_subimages_empty_when_uncropped() {
        let dir = TempDir::new().unwrap();
        assert!(collect_subimages(dir.path(), "fig").is_empty());
    }

    #[test]
    fn test_primary_segment_prefers_first_numbered() {
        let dir = TempDir::new().unwrap();
        let cropped = dir.path().join(CROPPED_DIR);
        touch(&cropped.join("fig_1.png"));
        touch(&cropped.join("fig_original.png"));

        let path = primary_segment_path(dir.path(), "fig").unwrap();
        assert!(path.ends_with("fig_1.png"));
    }

    #[test]
    fn test_path_naming() {
        let json_dir = Path::new("/out");
        assert_eq!(response_path(json_dir, "fig"), Path::new("/out/fig_response.json"));
        assert_eq!(
            updated_response_path(json_dir, "fig"),
            Path::new("/out/fig_response_updated.json")
        );
        assert_eq!(
            token_count_path(json_dir, "fig"),
            Path::new("/out/token_count/fig_tokencount.json")
        );
        assert_eq!(
            updated_token_count_path(json_dir, "fig"),
            Path::new("/out/token_count/fig_updated_tokencount.json")
        );
    }
}
