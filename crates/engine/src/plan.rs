use serde::Serialize;
use std::path::PathBuf;

use crate::error::{EngineError, Result};
use crate::timeline::{CutList, SourceId, SourceTimeline, TimePoint};

/// A contiguous span of one source, copied verbatim into the output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub source: SourceId,
    pub path: PathBuf,
    pub start: TimePoint,
    pub end: TimePoint,
}

impl Segment {
    pub fn duration(&self) -> TimePoint {
        self.end - self.start
    }
}

/// Ordered extraction instructions for the encoder. Segments are contiguous
/// and the first one starts at 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ClipPlan {
    segments: Vec<Segment>,
}

impl ClipPlan {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// End of the last segment.
    pub fn total_duration(&self) -> TimePoint {
        self.segments.last().map_or(0.0, |s| s.end)
    }
}

fn lookup(timelines: &[SourceTimeline], id: SourceId) -> Result<&SourceTimeline> {
    timelines.iter().find(|t| t.id == id).ok_or_else(|| {
        EngineError::InvariantViolation(format!("cut list references unknown source {}", id))
    })
}

fn checked_segment(timeline: &SourceTimeline, start: TimePoint, end: TimePoint) -> Result<Segment> {
    if end <= start {
        return Err(EngineError::InvariantViolation(format!(
            "degenerate segment {}..{} on source {}",
            start, end, timeline.id
        )));
    }
    Ok(Segment {
        source: timeline.id,
        path: timeline.path.clone(),
        start,
        end,
    })
}

/// Turns cut points into segments: each cut runs until the next one, and the
/// last cut runs to the end of its own source. A trailing cut sitting at (or
/// past) its source's end produces no segment.
pub fn build_clip_plan(cuts: &CutList, timelines: &[SourceTimeline]) -> Result<ClipPlan> {
    let entries = cuts.entries();
    let last = entries.last().ok_or_else(|| {
        EngineError::InvariantViolation("cannot plan an empty cut list".to_string())
    })?;

    let mut segments = Vec::with_capacity(entries.len());
    for pair in entries.windows(2) {
        let timeline = lookup(timelines, pair[0].source)?;
        segments.push(checked_segment(timeline, pair[0].time, pair[1].time)?);
    }

    let tail = lookup(timelines, last.source)?;
    if last.time < tail.duration {
        segments.push(checked_segment(tail, last.time, tail.duration)?);
    }

    if segments.is_empty() {
        return Err(EngineError::InvariantViolation(
            "cut list produced no playable segment".to_string(),
        ));
    }

    Ok(ClipPlan { segments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilteredStamps;
    use crate::merger::{merge_cut_points, LowestSourceId};

    fn source(id: usize, duration: TimePoint) -> SourceTimeline {
        SourceTimeline::new(SourceId(id), format!("{}.mp4", id), duration, Vec::new()).unwrap()
    }

    fn cuts(sets: &[(usize, &[TimePoint])]) -> CutList {
        let filtered: Vec<FilteredStamps> = sets
            .iter()
            .map(|(id, times)| FilteredStamps {
                source: SourceId(*id),
                stamps: times.to_vec(),
            })
            .collect();
        merge_cut_points(&filtered, &mut LowestSourceId).unwrap()
    }

    fn spans(plan: &ClipPlan) -> Vec<(usize, TimePoint, TimePoint)> {
        plan.segments()
            .iter()
            .map(|s| (s.source.0, s.start, s.end))
            .collect()
    }

    #[test]
    fn single_source_splits_at_every_match() {
        let plan = build_clip_plan(&cuts(&[(0, &[2.0, 4.0])]), &[source(0, 6.0)]).unwrap();
        assert_eq!(
            spans(&plan),
            vec![(0, 0.0, 2.0), (0, 2.0, 4.0), (0, 4.0, 6.0)]
        );
        assert_eq!(plan.total_duration(), 6.0);
    }

    #[test]
    fn last_segment_runs_to_its_own_source_end() {
        let plan = build_clip_plan(
            &cuts(&[(0, &[1.0]), (1, &[3.0])]),
            &[source(0, 10.0), source(1, 5.0)],
        )
        .unwrap();
        assert_eq!(spans(&plan), vec![(0, 0.0, 1.0), (0, 1.0, 3.0), (1, 3.0, 5.0)]);
    }

    #[test]
    fn trailing_cut_at_source_end_is_dropped() {
        let plan = build_clip_plan(
            &cuts(&[(0, &[2.0]), (1, &[5.0])]),
            &[source(0, 10.0), source(1, 5.0)],
        )
        .unwrap();
        assert_eq!(spans(&plan), vec![(0, 0.0, 2.0), (0, 2.0, 5.0)]);
        assert_eq!(plan.segments().last().unwrap().end, 5.0);
    }

    #[test]
    fn segments_are_contiguous() {
        let plan = build_clip_plan(
            &cuts(&[(0, &[0.5, 2.0, 7.5]), (1, &[1.0, 3.25]), (2, &[4.0])]),
            &[source(0, 9.0), source(1, 9.0), source(2, 9.0)],
        )
        .unwrap();
        let segments = plan.segments();
        assert_eq!(segments[0].start, 0.0);
        assert!(segments.windows(2).all(|w| w[0].end == w[1].start));
        assert!(segments.iter().all(|s| s.duration() > 0.0));
    }

    #[test]
    fn middle_segment_may_outrun_a_shorter_source() {
        // Source 0 is only 4s long; reconciling that is left to the encoder.
        let plan = build_clip_plan(
            &cuts(&[(0, &[1.0]), (1, &[6.0])]),
            &[source(0, 4.0), source(1, 10.0)],
        )
        .unwrap();
        assert_eq!(spans(&plan), vec![(0, 0.0, 1.0), (0, 1.0, 6.0), (1, 6.0, 10.0)]);
    }

    #[test]
    fn unknown_source_is_an_invariant_violation() {
        let err = build_clip_plan(&cuts(&[(3, &[1.0])]), &[source(0, 10.0)]).unwrap_err();
        assert_eq!(err.kind(), "invariant_violation");
    }
}
