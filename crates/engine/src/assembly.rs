use serde::Serialize;
use tracing::{debug, info};

use crate::emotion::EmotionLabel;
use crate::error::{EngineError, Result};
use crate::filter::{filter_sources, FilteredStamps};
use crate::merger::{merge_cut_points, TieResolver};
use crate::plan::{build_clip_plan, ClipPlan};
use crate::timeline::{CutList, SourceTimeline};

pub const MIN_SOURCES: usize = 2;
pub const MAX_SOURCES: usize = 4;

#[derive(Debug, Clone)]
pub struct AssemblyRequest {
    pub emotion: EmotionLabel,
    pub sources: Vec<SourceTimeline>,
}

/// Everything the pipeline produced, kept for callers that want to show
/// why a given cut was made.
#[derive(Debug, Clone, Serialize)]
pub struct Assembly {
    pub emotion: EmotionLabel,
    pub matches: Vec<FilteredStamps>,
    pub cuts: CutList,
    pub plan: ClipPlan,
}

pub fn validate_source_count(count: usize) -> Result<()> {
    if (MIN_SOURCES..=MAX_SOURCES).contains(&count) {
        Ok(())
    } else {
        Err(EngineError::InsufficientSources { count })
    }
}

/// Filter, merge and plan in one pass.
pub fn assemble(request: &AssemblyRequest, resolver: &mut dyn TieResolver) -> Result<Assembly> {
    validate_source_count(request.sources.len())?;

    let matches = filter_sources(&request.sources, request.emotion);
    for set in &matches {
        debug!("Source {} matched {} at {} frames", set.source, request.emotion, set.stamps.len());
    }

    if matches.iter().all(FilteredStamps::is_empty) {
        return Err(EngineError::NoMatchingFrames {
            emotion: Some(request.emotion),
        });
    }

    let cuts = merge_cut_points(&matches, resolver)?;
    let plan = build_clip_plan(&cuts, &request.sources)?;

    info!(
        "Assembled {} segments ({:.2}s) from {} sources for {}",
        plan.len(),
        plan.total_duration(),
        request.sources.len(),
        request.emotion
    );

    Ok(Assembly {
        emotion: request.emotion,
        matches,
        cuts,
        plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::EmotionLabel::*;
    use crate::merger::LowestSourceId;
    use crate::timeline::{SourceId, TimePoint};

    fn source(id: usize, duration: TimePoint, labels: &[EmotionLabel]) -> SourceTimeline {
        let timestamps: Vec<TimePoint> = (0..labels.len()).map(|i| i as f64).collect();
        SourceTimeline::from_streams(SourceId(id), format!("{}.mp4", id), duration, &timestamps, labels)
            .unwrap()
    }

    #[test]
    fn source_count_bounds() {
        assert_eq!(
            validate_source_count(1),
            Err(EngineError::InsufficientSources { count: 1 })
        );
        assert!(validate_source_count(2).is_ok());
        assert!(validate_source_count(4).is_ok());
        assert_eq!(
            validate_source_count(5),
            Err(EngineError::InsufficientSources { count: 5 })
        );
    }

    #[test]
    fn rejects_single_source_before_filtering() {
        let request = AssemblyRequest {
            emotion: Happy,
            sources: vec![source(0, 5.0, &[Happy])],
        };
        let err = assemble(&request, &mut LowestSourceId).unwrap_err();
        assert_eq!(err, EngineError::InsufficientSources { count: 1 });
    }

    #[test]
    fn reports_no_matching_frames_with_emotion() {
        let request = AssemblyRequest {
            emotion: Surprise,
            sources: vec![source(0, 5.0, &[Happy, Sad]), source(1, 5.0, &[Neutral])],
        };
        let err = assemble(&request, &mut LowestSourceId).unwrap_err();
        assert_eq!(err, EngineError::NoMatchingFrames { emotion: Some(Surprise) });
        assert_eq!(err.to_string(), "no source contains a frame labelled surprise");
    }

    #[test]
    fn one_matching_source_among_many() {
        let request = AssemblyRequest {
            emotion: Fear,
            sources: vec![
                source(0, 5.0, &[Sad, Sad, Fear]),
                source(1, 5.0, &[Sad, Sad, Sad]),
            ],
        };
        let assembly = assemble(&request, &mut LowestSourceId).unwrap();
        let spans: Vec<(usize, TimePoint, TimePoint)> = assembly
            .plan
            .segments()
            .iter()
            .map(|s| (s.source.0, s.start, s.end))
            .collect();
        assert_eq!(spans, vec![(0, 0.0, 2.0), (0, 2.0, 5.0)]);
        assert!(assembly.matches[1].is_empty());
    }
}
