use thiserror::Error;

use crate::emotion::EmotionLabel;
use crate::timeline::SourceId;

/// Failures the assembler reports to its caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("unknown emotion label: {0:?}")]
    InvalidEmotionLabel(String),

    #[error("expected between 2 and 4 sources, got {count}")]
    InsufficientSources { count: usize },

    #[error("source {source_id} is malformed: {reason}")]
    MalformedSource { source_id: SourceId, reason: String },

    #[error("no source contains a frame labelled {}", emotion_name(.emotion))]
    NoMatchingFrames { emotion: Option<EmotionLabel> },

    #[error("classifier failed: {0}")]
    Classifier(String),

    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl EngineError {
    /// Stable machine-readable name, used by the daemon's error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidEmotionLabel(_) => "invalid_emotion_label",
            EngineError::InsufficientSources { .. } => "insufficient_sources",
            EngineError::MalformedSource { .. } => "malformed_source",
            EngineError::NoMatchingFrames { .. } => "no_matching_frames",
            EngineError::Classifier(_) => "classifier",
            EngineError::InvariantViolation(_) => "invariant_violation",
        }
    }
}

fn emotion_name(emotion: &Option<EmotionLabel>) -> &'static str {
    emotion.map_or("the requested emotion", |e| e.as_str())
}

pub type Result<T> = std::result::Result<T, EngineError>;
