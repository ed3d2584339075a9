//! Configuration loading and management.
//!
//! Every component takes an explicit configuration object at construction;
//! nothing is read from ambient process state. Configuration can be loaded
//! from TOML or JSON files, or created programmatically.
//!
//! # Example
//!
//! ```rust
//! use rxnraider::config::RaiderConfig;
//!
//! // Create with defaults
//! let config = RaiderConfig::default();
//! assert_eq!(config.segmentation.min_segment_height, 120);
//!
//! // Load from a TOML file
//! // let config = RaiderConfig::from_toml_file("rxnraider.toml")?;
//! ```

use crate::{RaiderError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for the full figure pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RaiderConfig {
    /// Adaptive segmentation parameters
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Vision-language model endpoint configuration
    #[serde(default)]
    pub vision: VisionConfig,

    /// Molecular-structure recognizer endpoint configuration
    #[serde(default)]
    pub recognizer: RecognizerConfig,
}

/// Parameters for whitespace-boundary detection and subfigure splitting.
///
/// The defaults encode the layout convention of the source figure corpus:
/// a reaction-scheme diagram in the top quarter followed by tabular data.
/// The first-cut region fractions are configuration, not literals, so the
/// algorithm generalizes to other layouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Minimum intensity for a pixel to count as background (white)
    #[serde(default = "default_white_threshold")]
    pub white_threshold: u8,

    /// Minimum fraction of background pixels for a row to be a blank line
    #[serde(default = "default_blank_row_fraction")]
    pub blank_row_fraction: f64,

    /// Rows skipped per probe while scanning for a blank line
    #[serde(default = "default_step_size")]
    pub step_size: u32,

    /// Minimum height in pixels of each segmented subfigure
    #[serde(default = "default_min_segment_height")]
    pub min_segment_height: u32,

    /// Start of the first-cut search region, as a fraction of image height
    #[serde(default = "default_first_region_start")]
    pub first_region_start: f64,

    /// End of the first-cut search region, as a fraction of image height
    #[serde(default = "default_first_region_end")]
    pub first_region_end: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            white_threshold: default_white_threshold(),
            blank_row_fraction: default_blank_row_fraction(),
            step_size: default_step_size(),
            min_segment_height: default_min_segment_height(),
            first_region_start: default_first_region_start(),
            first_region_end: default_first_region_end(),
        }
    }
}

impl SegmentationConfig {
    /// Validate parameter ranges.
    ///
    /// # Errors
    ///
    /// `RaiderError::Validation` when a parameter is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.step_size == 0 {
            return Err(RaiderError::validation("step_size must be at least 1"));
        }
        if self.min_segment_height == 0 {
            return Err(RaiderError::validation("min_segment_height must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.blank_row_fraction) {
            return Err(RaiderError::validation(format!(
                "blank_row_fraction must be within [0, 1], got {}",
                self.blank_row_fraction
            )));
        }
        if !(0.0..=1.0).contains(&self.first_region_start)
            || !(0.0..=1.0).contains(&self.first_region_end)
            || self.first_region_start >= self.first_region_end
        {
            return Err(RaiderError::validation(format!(
                "first-cut region fractions must satisfy 0 <= start < end <= 1, got [{}, {})",
                self.first_region_start, self.first_region_end
            )));
        }
        Ok(())
    }
}

/// Vision-language model endpoint configuration.
///
/// The API key is explicit configuration rather than ambient environment
/// state; callers that want env-based keys read the variable themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Chat-completions endpoint URL
    #[serde(default = "default_vision_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with each request
    #[serde(default = "default_vision_model")]
    pub model: String,

    /// Bearer token for the endpoint
    #[serde(default)]
    pub api_key: String,

    /// Completion token budget per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request deadline; exceeding it surfaces `RaiderError::Timeout`
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_vision_endpoint(),
            model: default_vision_model(),
            api_key: String::new(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Molecular-structure recognizer endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Prediction endpoint URL
    #[serde(default = "default_recognizer_endpoint")]
    pub endpoint: String,

    /// Request deadline; exceeding it surfaces `RaiderError::Timeout`
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_recognizer_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RaiderConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| RaiderError::format_with_source("invalid TOML configuration", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all component configurations.
    pub fn validate(&self) -> Result<()> {
        self.segmentation.validate()
    }
}

fn default_white_threshold() -> u8 {
    // Matches a 254.8 binary threshold over 8-bit grayscale: only pure white
    // survives.
    255
}

fn default_blank_row_fraction() -> f64 {
    0.995
}

fn default_step_size() -> u32 {
    10
}

fn default_min_segment_height() -> u32 {
    120
}

fn default_first_region_start() -> f64 {
    0.25
}

fn default_first_region_end() -> f64 {
    0.375
}

fn default_vision_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_vision_model() -> String {
    "gpt-4o-2024-08-06".to_string()
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_recognizer_endpoint() -> String {
    "http://localhost:8010/predict".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_segmentation_config() {
        let config = SegmentationConfig::default();
        assert_eq!(config.white_threshold, 255);
        assert_eq!(config.blank_row_fraction, 0.995);
        assert_eq!(config.step_size, 10);
        assert_eq!(config.min_segment_height, 120);
        assert_eq!(config.first_region_start, 0.25);
        assert_eq!(config.first_region_end, 0.375);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_zero_step() {
        let config = SegmentationConfig {
            step_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            RaiderError::Validation { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_region() {
        let config = SegmentationConfig {
            first_region_start: 0.5,
            first_region_end: 0.25,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_str_partial() {
        let config = RaiderConfig::from_toml_str(
            r#"
            [segmentation]
            min_segment_height = 200

            [vision]
            model = "gpt-4o-mini"
            api_key = "sk-test"
            "#,
        )
        .unwrap();
        assert_eq!(config.segmentation.min_segment_height, 200);
        assert_eq!(config.segmentation.step_size, 10);
        assert_eq!(config.vision.model, "gpt-4o-mini");
        assert_eq!(config.vision.api_key, "sk-test");
        assert_eq!(config.vision.max_tokens, 4000);
    }

    #[test]
    fn test_from_toml_str_invalid_values() {
        let result = RaiderConfig::from_toml_str(
            r#"
            [segmentation]
            blank_row_fraction = 1.5
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_toml_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[recognizer]\nendpoint = \"http://models:9000/predict\"").unwrap();
        let config = RaiderConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.recognizer.endpoint, "http://models:9000/predict");
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = RaiderConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: RaiderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed.segmentation.min_segment_height,
            config.segmentation.min_segment_height
        );
        assert_eq!(parsed.vision.endpoint, config.vision.endpoint);
    }
}
