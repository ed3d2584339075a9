//! Per-figure pipeline sequencing and batch orchestration.

use crate::error::Result;
use crate::pipeline::extract::extract_figure_data;
use crate::pipeline::footnotes::merge_footnotes;
use crate::pipeline::status::{FigureStage, StatusLedger};
use crate::pipeline::structures::merge_structures;
use crate::recognize::StructureRecognizer;
use crate::segment::IMAGE_EXTENSIONS;
use crate::vision::VisionModel;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Instruction texts driving the two model calls.
#[derive(Debug, Clone)]
pub struct FigurePrompts {
    /// Instruction for the structured-extraction call (usually produced by
    /// the prompt-key compiler)
    pub extraction: String,
    /// Follow-up instruction for the footnote-reconciliation call
    pub footnotes: String,
}

/// Outcome counts for a directory run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: u32,
    pub failed: u32,
    pub skipped: u32,
}

/// Drives the extraction → footnote-merge → structure-merge sequence for
/// figures whose subimages were already produced by the segmenter.
///
/// Within one figure the stages run in strict order: each stage's input is
/// the previous stage's output file. Across figures there is no shared
/// mutable state, so callers may process figures in parallel as long as
/// each figure's file set is touched by one worker at a time.
pub struct FigureProcessor {
    vision: Arc<dyn VisionModel>,
    recognizer: Arc<dyn StructureRecognizer>,
    image_dir: PathBuf,
    json_dir: PathBuf,
    ledger: StatusLedger,
}

impl FigureProcessor {
    pub fn new(
        vision: Arc<dyn VisionModel>,
        recognizer: Arc<dyn StructureRecognizer>,
        image_dir: impl Into<PathBuf>,
        json_dir: impl Into<PathBuf>,
    ) -> Self {
        let json_dir = json_dir.into();
        let ledger = StatusLedger::new(&json_dir);
        Self {
            vision,
            recognizer,
            image_dir: image_dir.into(),
            json_dir,
            ledger,
        }
    }

    /// The per-figure status ledger.
    pub fn ledger(&self) -> &StatusLedger {
        &self.ledger
    }

    /// Run the full sequence for one figure, recording status transitions.
    ///
    /// A failure marks the figure `Failed` (with the error text) and returns
    /// the error; it never affects other figures.
    pub async fn process_figure(&self, name: &str, prompts: &FigurePrompts) -> Result<()> {
        match self.run_stages(name, prompts).await {
            Ok(()) => {
                self.ledger.mark(name, FigureStage::Done).await?;
                Ok(())
            }
            Err(err) => {
                self.ledger.mark_failed(name, &err.to_string()).await?;
                Err(err)
            }
        }
    }

    async fn run_stages(&self, name: &str, prompts: &FigurePrompts) -> Result<()> {
        self.ledger.mark(name, FigureStage::Extracting).await?;
        extract_figure_data(self.vision.as_ref(), name, &self.image_dir, &self.json_dir, &prompts.extraction).await?;
        merge_footnotes(self.vision.as_ref(), name, &self.json_dir, &prompts.footnotes).await?;

        self.ledger.mark(name, FigureStage::Merging).await?;
        merge_structures(self.recognizer.as_ref(), name, &self.image_dir, &self.json_dir).await
    }

    /// Process every figure in the image directory.
    ///
    /// Figures are keyed by source-image stem; figures already marked `Done`
    /// are skipped, everything else (including previously failed figures) is
    /// re-driven. One figure's failure never stops the batch.
    pub async fn process_directory(&self, prompts: &FigurePrompts) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        for name in figure_names(&self.image_dir)? {
            if self.ledger.load(&name).await?.stage == FigureStage::Done {
                summary.skipped += 1;
                continue;
            }
            match self.process_figure(&name, prompts).await {
                Ok(()) => summary.processed += 1,
                Err(err) => {
                    tracing::warn!(figure = %name, error = %err, "figure failed");
                    summary.failed += 1;
                }
            }
        }
        tracing::info!(
            processed = summary.processed,
            failed = summary.failed,
            skipped = summary.skipped,
            "directory run complete"
        );
        Ok(summary)
    }
}

fn figure_names(image_dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(image_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if !is_image {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RaiderError;
    use crate::pipeline::layout;
    use crate::types::{ReactionPrediction, StructureEntry, TokenUsage};
    use crate::vision::{VisionReply, VisionRequest};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tempfile::TempDir;

    /// Replies with an extraction record on the first call (images present)
    /// and a footnote-enriched record on text-only calls.
    struct ScriptedVision {
        calls: AtomicU32,
        fail_on_footnotes: bool,
    }

    #[async_trait]
    impl VisionModel for ScriptedVision {
        async fn generate(&self, request: &VisionRequest) -> Result<VisionReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let text = if request.images.is_empty() {
                if self.fail_on_footnotes {
                    return Err(RaiderError::network("footnote call refused"));
                }
                "```json\n{\"Optimization Runs\": [{\"entry\": \"1\", \"temperature\": \"60 C\"}]}\n```"
            } else {
                "```json\n{\"Optimization Runs\": [{\"entry\": \"1\"}]}\n```"
            };
            Ok(VisionReply {
                text: text.to_string(),
                usage: TokenUsage::default(),
            })
        }
    }

    struct OneReaction;

    #[async_trait]
    impl StructureRecognizer for OneReaction {
        async fn predict(&self, _image_bytes: &[u8]) -> Result<Vec<ReactionPrediction>> {
            Ok(vec![ReactionPrediction {
                reactants: vec![StructureEntry {
                    smiles: Some("CCO".to_string()),
                    category: None,
                }],
                products: vec![StructureEntry {
                    smiles: Some("CC=O".to_string()),
                    category: None,
                }],
            }])
        }
    }

    fn seed_figure(image_dir: &Path, name: &str) {
        let cropped = image_dir.join(crate::segment::CROPPED_DIR);
        std::fs::create_dir_all(&cropped).unwrap();
        std::fs::write(image_dir.join(format!("{name}.png")), b"src").unwrap();
        std::fs::write(cropped.join(format!("{name}_1.png")), [1u8; 4]).unwrap();
    }

    fn prompts() -> FigurePrompts {
        FigurePrompts {
            extraction: "extract the runs".to_string(),
            footnotes: "apply the footnotes".to_string(),
        }
    }

    fn processor(images: &TempDir, json: &TempDir, fail_on_footnotes: bool) -> FigureProcessor {
        FigureProcessor::new(
            Arc::new(ScriptedVision {
                calls: AtomicU32::new(0),
                fail_on_footnotes,
            }),
            Arc::new(OneReaction),
            images.path(),
            json.path(),
        )
    }

    #[tokio::test]
    async fn test_full_sequence_produces_merged_record() {
        let images = TempDir::new().unwrap();
        let json = TempDir::new().unwrap();
        seed_figure(images.path(), "fig");

        let processor = processor(&images, &json, false);
        processor.process_figure("fig", &prompts()).await.unwrap();

        let merged: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(layout::updated_response_path(json.path(), "fig")).unwrap(),
        )
        .unwrap();
        assert_eq!(merged["SMILES"]["reactants"][0], "CCO");
        assert_eq!(merged["Optimization Runs"][0]["temperature"], "60 C");

        assert_eq!(processor.ledger().load("fig").await.unwrap().stage, FigureStage::Done);
    }

    #[tokio::test]
    async fn test_stage_failure_marks_figure_failed() {
        let images = TempDir::new().unwrap();
        let json = TempDir::new().unwrap();
        seed_figure(images.path(), "fig");

        let processor = processor(&images, &json, true);
        let err = processor.process_figure("fig", &prompts()).await.unwrap_err();
        assert!(matches!(err, RaiderError::Network { .. }));

        let status = processor.ledger().load("fig").await.unwrap();
        assert_eq!(status.stage, FigureStage::Failed);
        assert!(status.error.unwrap().contains("footnote call refused"));

        // The first stage's output survives; the failed stage wrote nothing.
        assert!(layout::response_path(json.path(), "fig").is_file());
        assert!(!layout::updated_response_path(json.path(), "fig").exists());
    }

    #[tokio::test]
    async fn test_directory_run_skips_done_and_isolates_failures() {
        let images = TempDir::new().unwrap();
        let json = TempDir::new().unwrap();
        seed_figure(images.path(), "a");
        seed_figure(images.path(), "b");
        // c has a source image but was never cropped, so extraction fails.
        std::fs::write(images.path().join("c.png"), b"src").unwrap();

        let processor = processor(&images, &json, false);
        processor.ledger().mark("a", FigureStage::Done).await.unwrap();

        let summary = processor.process_directory(&prompts()).await.unwrap();
        assert_eq!(
            summary,
            BatchSummary {
                processed: 1,
                failed: 1,
                skipped: 1
            }
        );
        assert_eq!(processor.ledger().load("b").await.unwrap().stage, FigureStage::Done);
        assert_eq!(processor.ledger().load("c").await.unwrap().stage, FigureStage::Failed);
    }
}
