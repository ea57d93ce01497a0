use std::path::PathBuf;

use crate::emotion::EmotionLabel;
use crate::error::{EngineError, Result};
use crate::timeline::{SourceId, SourceTimeline, TimePoint};

/// An extracted still, as handed over by frame extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub index: usize,
    pub timestamp: TimePoint,
    pub image_path: PathBuf,
}

/// Per-frame emotion inference. Model-backed implementations live outside
/// this crate.
pub trait EmotionClassifier: Send + Sync {
    fn classify(&self, frame: &Frame) -> Result<EmotionLabel>;
}

/// Deterministic classifier for exercising the assembler without a model.
#[derive(Debug, Clone)]
pub enum StubClassifier {
    Constant(EmotionLabel),
    /// Label for frame `i` is `script[i % script.len()]`.
    Scripted(Vec<EmotionLabel>),
}

impl StubClassifier {
    pub fn constant(label: EmotionLabel) -> Self {
        StubClassifier::Constant(label)
    }

    pub fn scripted(script: Vec<EmotionLabel>) -> Self {
        StubClassifier::Scripted(script)
    }
}

impl EmotionClassifier for StubClassifier {
    fn classify(&self, frame: &Frame) -> Result<EmotionLabel> {
        match self {
            StubClassifier::Constant(label) => Ok(*label),
            StubClassifier::Scripted(script) if script.is_empty() => Err(
                EngineError::Classifier("scripted stub has no labels".to_string()),
            ),
            StubClassifier::Scripted(script) => Ok(script[frame.index % script.len()]),
        }
    }
}

/// Runs the classifier over every frame, producing a label stream aligned
/// with `frames`.
pub fn label_frames(classifier: &dyn EmotionClassifier, frames: &[Frame]) -> Result<Vec<EmotionLabel>> {
    frames.iter().map(|frame| classifier.classify(frame)).collect()
}

impl SourceTimeline {
    /// Builds a timeline straight from extracted frames.
    pub fn classify(
        id: SourceId,
        path: impl Into<PathBuf>,
        duration: TimePoint,
        frames: &[Frame],
        classifier: &dyn EmotionClassifier,
    ) -> Result<Self> {
        let labels = label_frames(classifier, frames)?;
        let timestamps: Vec<TimePoint> = frames.iter().map(|f| f.timestamp).collect();
        SourceTimeline::from_streams(id, path, duration, &timestamps, &labels)
    }
}
