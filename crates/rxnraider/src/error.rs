//! Error types for rxnraider.
//!
//! All fallible operations return [`Result`], an alias over [`RaiderError`].
//! Errors follow a per-figure failure model: every kind is non-fatal to a
//! batch, and one figure's failure must never stop processing of others.
//!
//! **System errors bubble up unchanged:**
//! - `RaiderError::Io` (from `std::io::Error`) - missing or unreadable image,
//!   prompt, or record files
//!
//! **Application errors are wrapped with context:**
//! - `Network` - an external capability call failed; no output is written for
//!   the figure, so it is safe to re-drive later
//! - `Timeout` - an external capability call exceeded its deadline
//! - `Format` - model output is not valid or repairable JSON; the raw file is
//!   kept as evidence
//! - `Schema` - an expected key (e.g. an "optimization"-named key) is absent
//!   from a JSON record; only the merge step for that figure aborts
//! - `ImageProcessing` - image decode/encode or segmentation failures
//! - `Validation` - invalid configuration or parameters
use thiserror::Error;

/// Result type alias using `RaiderError`.
pub type Result<T> = std::result::Result<T, RaiderError>;

/// Main error type for all rxnraider operations.
#[derive(Debug, Error)]
pub enum RaiderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Format error: {message}")]
    Format {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Image processing error: {message}")]
    ImageProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl From<serde_json::Error> for RaiderError {
    fn from(err: serde_json::Error) -> Self {
        RaiderError::Format {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<image::ImageError> for RaiderError {
    fn from(err: image::ImageError) -> Self {
        RaiderError::ImageProcessing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<reqwest::Error> for RaiderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RaiderError::Timeout(err.to_string())
        } else {
            RaiderError::Network {
                message: err.to_string(),
                source: Some(Box::new(err)),
            }
        }
    }
}

impl RaiderError {
    /// Create a Network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a Format error
    pub fn format<S: Into<String>>(message: S) -> Self {
        Self::Format {
            message: message.into(),
            source: None,
        }
    }

    /// Create a Format error with source
    pub fn format_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Format {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a Schema error
    pub fn schema<S: Into<String>>(message: S) -> Self {
        Self::Schema(message.into())
    }

    /// Create an ImageProcessing error
    pub fn image_processing<S: Into<String>>(message: S) -> Self {
        Self::ImageProcessing {
            message: message.into(),
            source: None,
        }
    }

    /// Create a Validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }
}
