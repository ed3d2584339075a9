//! Persisted per-figure processing status.
//!
//! Earlier tooling inferred a figure's state from which output files
//! existed, which races when figures are processed in parallel. The ledger
//! makes state explicit: one small JSON file per figure under
//! `{json_dir}/status/`. A missing file means the figure is pending.

use crate::error::Result;
use crate::pipeline::layout::STATUS_DIR;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a figure currently stands in the 4-stage pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureStage {
    Pending,
    Extracting,
    Merging,
    Done,
    Failed,
}

/// The persisted status record for one figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureStatus {
    pub stage: FigureStage,
    /// Failure description, present only when `stage` is `Failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FigureStatus {
    pub fn pending() -> Self {
        Self {
            stage: FigureStage::Pending,
            error: None,
        }
    }

    pub fn at(stage: FigureStage) -> Self {
        Self { stage, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            stage: FigureStage::Failed,
            error: Some(error.into()),
        }
    }
}

/// Reads and writes per-figure status files.
#[derive(Debug, Clone)]
pub struct StatusLedger {
    dir: PathBuf,
}

impl StatusLedger {
    pub fn new(json_dir: &Path) -> Self {
        Self {
            dir: json_dir.join(STATUS_DIR),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Load a figure's status; a missing file means pending.
    pub async fn load(&self, name: &str) -> Result<FigureStatus> {
        let path = self.path(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(FigureStatus::pending()),
            Err(err) => Err(err.into()),
        }
    }

    /// Persist a figure's status.
    pub async fn store(&self, name: &str, status: &FigureStatus) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path(name), serde_json::to_string_pretty(status)?).await?;
        Ok(())
    }

    pub async fn mark(&self, name: &str, stage: FigureStage) -> Result<()> {
        self.store(name, &FigureStatus::at(stage)).await
    }

    pub async fn mark_failed(&self, name: &str, error: &str) -> Result<()> {
        self.store(name, &FigureStatus::failed(error)).await
    }

    /// All recorded figure statuses, sorted by figure name.
    ///
    /// Only figures that reached at least one stage transition appear;
    /// pending figures have no file and are not listed.
    pub async fn scan(&self) -> Result<Vec<(String, FigureStatus)>> {
        let mut entries = Vec::new();
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
            Err(err) => return Err(err.into()),
        };
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = tokio::fs::read_to_string(&path).await?;
            entries.push((name.to_string(), serde_json::from_str(&content)?));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}
