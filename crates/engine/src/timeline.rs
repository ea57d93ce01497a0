use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::emotion::EmotionLabel;
use crate::error::{EngineError, Result};

/// Seconds from the start of a source. Sources share an axis starting at 0.
pub type TimePoint = f64;

/// Position of a source within one assembly request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub usize);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledFrame {
    pub timestamp: TimePoint,
    pub label: EmotionLabel,
}

/// One input video: its handle, total duration and per-frame labels.
///
/// Frames are validated on construction (finite, non-negative, strictly
/// increasing, within the duration) and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct SourceTimeline {
    pub id: SourceId,
    pub path: PathBuf,
    pub duration: TimePoint,
    frames: Vec<LabeledFrame>,
}

impl SourceTimeline {
    pub fn new(
        id: SourceId,
        path: impl Into<PathBuf>,
        duration: TimePoint,
        frames: Vec<LabeledFrame>,
    ) -> Result<Self> {
        let malformed = |reason: String| EngineError::MalformedSource {
            source_id: id,
            reason,
        };

        if !duration.is_finite() || duration <= 0.0 {
            return Err(malformed(format!("invalid duration {}", duration)));
        }

        let mut previous: Option<TimePoint> = None;
        for (idx, frame) in frames.iter().enumerate() {
            let t = frame.timestamp;
            if !t.is_finite() || t < 0.0 {
                return Err(malformed(format!("frame {} has invalid timestamp {}", idx, t)));
            }
            if t > duration {
                return Err(malformed(format!(
                    "frame {} at {}s is past the source duration {}s",
                    idx, t, duration
                )));
            }
            if let Some(prev) = previous {
                if t <= prev {
                    return Err(malformed(format!(
                        "frame {} at {}s does not follow {}s",
                        idx, t, prev
                    )));
                }
            }
            previous = Some(t);
        }

        Ok(SourceTimeline {
            id,
            path: path.into(),
            duration,
            frames,
        })
    }

    /// Zips the extractor's timestamps with the classifier's labels.
    /// Both streams must be index-aligned.
    pub fn from_streams(
        id: SourceId,
        path: impl Into<PathBuf>,
        duration: TimePoint,
        timestamps: &[TimePoint],
        labels: &[EmotionLabel],
    ) -> Result<Self> {
        if timestamps.len() != labels.len() {
            return Err(EngineError::MalformedSource {
                source_id: id,
                reason: format!(
                    "{} timestamps but {} labels",
                    timestamps.len(),
                    labels.len()
                ),
            });
        }

        let frames = timestamps
            .iter()
            .zip(labels)
            .map(|(&timestamp, &label)| LabeledFrame { timestamp, label })
            .collect();

        Self::new(id, path, duration, frames)
    }

    pub fn frames(&self) -> &[LabeledFrame] {
        &self.frames
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A candidate switch point: at `time`, cut to `source`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutEntry {
    pub time: TimePoint,
    pub source: SourceId,
}

/// Collision-free cut points, strictly increasing and starting at 0.
/// Only the merger builds these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CutList {
    entries: Vec<CutEntry>,
}

impl CutList {
    pub(crate) fn from_resolved(entries: Vec<CutEntry>) -> Self {
        debug_assert!(entries.first().map_or(false, |e| e.time == 0.0));
        debug_assert!(entries.windows(2).all(|w| w[0].time < w[1].time));
        CutList { entries }
    }

    pub fn entries(&self) -> &[CutEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
