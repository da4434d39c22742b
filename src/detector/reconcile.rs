//! Merge-toward-expected-count pass.
//!
//! Runs only when a strategy found more regions than expected. Every loop
//! iteration removes exactly one region or exits, so the pass finishes in
//! at most `n` iterations and never grows the list.
use super::params::ReconcileParams;
use super::region::MaskRegion;
use crate::deadline::Deadline;
use crate::error::Result;
use log::debug;
use serde::Serialize;

/// Bookkeeping of one reconciliation run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileStats {
    pub input: usize,
    pub output: usize,
    pub noise_dropped: usize,
    pub folded: usize,
    pub pair_merges: usize,
    pub forced_merges: usize,
    pub iterations: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bucket {
    Large,
    Medium,
    Small,
}

struct Frame {
    height: f32,
    diagonal: f32,
}

impl Frame {
    fn in_letter_band(&self, r: &MaskRegion, params: &ReconcileParams) -> bool {
        r.centroid[1] < self.height * params.letter_band_fraction
    }
}

fn bucket(r: &MaskRegion, largest: usize, params: &ReconcileParams) -> Bucket {
    let share = r.pixel_count as f32 / largest.max(1) as f32;
    if share >= params.large_fraction {
        Bucket::Large
    } else if share >= params.medium_fraction {
        Bucket::Medium
    } else {
        Bucket::Small
    }
}

fn largest_index<'a, I>(regions: &[MaskRegion], candidates: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a usize>,
{
    candidates
        .into_iter()
        .copied()
        .max_by(|&a, &b| {
            regions[a]
                .pixel_count
                .cmp(&regions[b].pixel_count)
                .then(b.cmp(&a))
        })
}

/// Merge `regions[from]` into `regions[into]` and drop `from`.
fn absorb(regions: &mut Vec<MaskRegion>, into: usize, from: usize) {
    debug_assert_ne!(into, from);
    let merged = regions[into].merged(&regions[from]);
    regions[into] = merged;
    regions.remove(from);
}

/// Reduce `regions` toward `target`.
pub fn reconcile(
    mut regions: Vec<MaskRegion>,
    target: usize,
    width: u32,
    height: u32,
    params: &ReconcileParams,
    deadline: &Deadline,
) -> Result<(Vec<MaskRegion>, ReconcileStats)> {
    let mut stats = ReconcileStats {
        input: regions.len(),
        ..Default::default()
    };
    let target = target.max(1);
    if regions.len() <= target {
        stats.output = regions.len();
        return Ok((regions, stats));
    }
    let frame = Frame {
        height: height as f32,
        diagonal: ((width as f32).powi(2) + (height as f32).powi(2)).sqrt(),
    };

    // Noise floor; never discard everything.
    if regions.iter().any(|r| r.pixel_count >= params.noise_floor) {
        let before = regions.len();
        regions.retain(|r| r.pixel_count >= params.noise_floor);
        stats.noise_dropped = before - regions.len();
    }

    // Fold medium and small icon-band regions into the largest icon-band
    // region. Smallest first.
    while regions.len() > target {
        deadline.check("reconcile.fold")?;
        let largest = regions.iter().map(|r| r.pixel_count).max().unwrap_or(0);
        let icon: Vec<usize> = (0..regions.len())
            .filter(|&i| !frame.in_letter_band(&regions[i], params))
            .collect();
        let Some(anchor) = largest_index(&regions, &icon) else {
            break;
        };
        let candidate = icon
            .iter()
            .copied()
            .filter(|&i| i != anchor && bucket(&regions[i], largest, params) != Bucket::Large)
            .min_by(|&a, &b| regions[a].pixel_count.cmp(&regions[b].pixel_count).then(a.cmp(&b)));
        let Some(from) = candidate else {
            break;
        };
        absorb(&mut regions, anchor, from);
        stats.folded += 1;
        stats.iterations += 1;
    }

    // Closest pair within the distance bound, same band preferred.
    let max_distance = frame.diagonal * params.max_merge_distance_fraction;
    while regions.len() > target {
        deadline.check("reconcile.pairs")?;
        let mut best_same: Option<(f32, usize, usize)> = None;
        let mut best_cross: Option<(f32, usize, usize)> = None;
        for i in 0..regions.len() {
            for j in i + 1..regions.len() {
                let d = regions[i].center_distance(&regions[j]);
                if d > max_distance {
                    continue;
                }
                let same = frame.in_letter_band(&regions[i], params)
                    == frame.in_letter_band(&regions[j], params);
                let slot = if same { &mut best_same } else { &mut best_cross };
                if slot.map_or(true, |(bd, _, _)| d < bd) {
                    *slot = Some((d, i, j));
                }
            }
        }
        let Some((_, i, j)) = best_same.or(best_cross) else {
            break;
        };
        let (into, from) = if regions[i].pixel_count >= regions[j].pixel_count {
            (i, j)
        } else {
            (j, i)
        };
        absorb(&mut regions, into, from);
        stats.pair_merges += 1;
        stats.iterations += 1;
    }

    // Force the smallest into the largest.
    while regions.len() > target {
        deadline.check("reconcile.force")?;
        let all: Vec<usize> = (0..regions.len()).collect();
        let (Some(into), Some(from)) = (
            largest_index(&regions, &all),
            all.iter().copied().min_by(|&a, &b| {
                regions[a]
                    .pixel_count
                    .cmp(&regions[b].pixel_count)
                    .then(b.cmp(&a))
            }),
        ) else {
            break;
        };
        if into == from {
            break;
        }
        absorb(&mut regions, into, from);
        stats.forced_merges += 1;
        stats.iterations += 1;
    }

    stats.output = regions.len();
    debug!(
        "reconcile {} -> {} (noise {}, folded {}, pairs {}, forced {})",
        stats.input,
        stats.output,
        stats.noise_dropped,
        stats.folded,
        stats.pair_merges,
        stats.forced_merges
    );
    Ok((regions, stats))
}
