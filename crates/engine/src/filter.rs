use rayon::prelude::*;
use serde::Serialize;

use crate::emotion::EmotionLabel;
use crate::timeline::{SourceId, SourceTimeline, TimePoint};

/// Timestamps of one source whose frame label matched the target emotion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredStamps {
    pub source: SourceId,
    pub stamps: Vec<TimePoint>,
}

impl FilteredStamps {
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }
}

pub fn filter_emotion(timeline: &SourceTimeline, target: EmotionLabel) -> FilteredStamps {
    let stamps = timeline
        .frames()
        .iter()
        .filter(|frame| frame.label == target)
        .map(|frame| frame.timestamp)
        .collect();

    FilteredStamps {
        source: timeline.id,
        stamps,
    }
}

/// Filters every source in parallel. Output order follows `timelines`.
pub fn filter_sources(timelines: &[SourceTimeline], target: EmotionLabel) -> Vec<FilteredStamps> {
    timelines
        .par_iter()
        .map(|timeline| filter_emotion(timeline, target))
        .collect()
}
