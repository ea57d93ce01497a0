//! Combines per-source match timestamps into a single cut list.
//!
//! Entries from every source are sorted by time; when several sources hit
//! the target at exactly the same timestamp, a [`TieResolver`] picks the one
//! that survives. The list is then anchored at 0 so the output always opens
//! on some source's first frame.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::filter::FilteredStamps;
use crate::timeline::{CutEntry, CutList, SourceId, TimePoint};

/// Chooses which source keeps a timestamp claimed by several sources.
/// `candidates` always holds at least two ids, in sort order.
pub trait TieResolver {
    fn resolve(&mut self, time: TimePoint, candidates: &[SourceId]) -> SourceId;
}

impl<F> TieResolver for F
where
    F: FnMut(TimePoint, &[SourceId]) -> SourceId,
{
    fn resolve(&mut self, time: TimePoint, candidates: &[SourceId]) -> SourceId {
        self(time, candidates)
    }
}

/// Uniform random choice among tied sources.
pub struct RandomTieResolver<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomTieResolver<R> {
    pub fn new(rng: R) -> Self {
        RandomTieResolver { rng }
    }
}

impl RandomTieResolver<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible tie-breaking for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> TieResolver for RandomTieResolver<R> {
    fn resolve(&mut self, _time: TimePoint, candidates: &[SourceId]) -> SourceId {
        // Callers never pass an empty slice.
        *candidates.choose(&mut self.rng).unwrap_or(&candidates[0])
    }
}

/// Always keeps the lowest source id.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowestSourceId;

impl TieResolver for LowestSourceId {
    fn resolve(&mut self, _time: TimePoint, candidates: &[SourceId]) -> SourceId {
        candidates.iter().copied().min().unwrap_or(candidates[0])
    }
}

pub fn merge_cut_points(
    filtered: &[FilteredStamps],
    resolver: &mut dyn TieResolver,
) -> Result<CutList> {
    let mut entries: Vec<CutEntry> = Vec::new();
    for set in filtered {
        for &time in &set.stamps {
            if !time.is_finite() || time < 0.0 {
                return Err(EngineError::MalformedSource {
                    source_id: set.source,
                    reason: format!("match timestamp {} is not a valid offset", time),
                });
            }
            entries.push(CutEntry {
                time,
                source: set.source,
            });
        }
    }

    if entries.is_empty() {
        return Err(EngineError::NoMatchingFrames { emotion: None });
    }

    // Stable: ties keep source order, which is what the resolver sees.
    entries.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut resolved: Vec<CutEntry> = Vec::with_capacity(entries.len());
    let mut candidates: Vec<SourceId> = Vec::new();
    for group in entries.chunk_by(|a, b| a.time == b.time) {
        let time = group[0].time;
        let source = if group.len() == 1 {
            group[0].source
        } else {
            candidates.clear();
            candidates.extend(group.iter().map(|e| e.source));
            let winner = resolver.resolve(time, &candidates);
            if !candidates.contains(&winner) {
                return Err(EngineError::InvariantViolation(format!(
                    "tie resolver picked source {} which has no match at {}s",
                    winner, time
                )));
            }
            debug!("Resolved {}-way tie at {}s to source {}", group.len(), time, winner);
            winner
        };
        resolved.push(CutEntry { time, source });
    }

    if resolved[0].time != 0.0 {
        let opening = resolved[0].source;
        resolved.insert(0, CutEntry { time: 0.0, source: opening });
    }

    Ok(CutList::from_resolved(resolved))
}
