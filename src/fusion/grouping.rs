//! Greedy grouping of regions that describe the same sprite and the merge
//! of each group into one box.
//!
//! Grouping is a single pass over regions in a fixed order: largest
//! bounding box first, ties broken by source algorithm, then by top-left
//! corner. Each region joins the first existing group whose seed (its
//! first member) it matches, otherwise it starts a new group. The relation
//! is not transitive, so the order is part of the contract.
use super::options::{FusionOptions, FusionStrategy};
use super::region::Region;
use crate::types::{Rect, SourceAlgorithm};
use serde::Serialize;

/// How a fused sprite's box was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FusionMethod {
    /// Group with a single member.
    Single,
    WeightedAverage,
    HighestConfidence,
    Union,
}

/// Processing order used by [`group_regions`].
pub fn grouping_order(regions: &[Region]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..regions.len()).collect();
    order.sort_by(|&a, &b| {
        let (ra, rb) = (&regions[a], &regions[b]);
        rb.bounds
            .area()
            .cmp(&ra.bounds.area())
            .then(ra.source.cmp(&rb.source))
            .then(ra.bounds.y.cmp(&rb.bounds.y))
            .then(ra.bounds.x.cmp(&rb.bounds.x))
    });
    order
}

fn same_sprite(seed: &Region, other: &Region, options: &FusionOptions) -> bool {
    if seed.bounds.iou(&other.bounds) > options.overlap_threshold {
        return true;
    }
    let (a, b) = (seed.bounds.area() as f32, other.bounds.area() as f32);
    let area_diff = (a - b).abs() / a.max(b).max(1.0);
    seed.bounds.center_distance(&other.bounds) < options.proximity_threshold
        && area_diff < options.max_area_difference
}

/// Indices of `regions`, grouped. Groups appear in creation order.
pub fn group_regions(regions: &[Region], options: &FusionOptions) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for idx in grouping_order(regions) {
        let region = &regions[idx];
        match groups
            .iter_mut()
            .find(|g| same_sprite(&regions[g[0]], region, options))
        {
            Some(group) => group.push(idx),
            None => groups.push(vec![idx]),
        }
    }
    groups
}

/// Box, confidence, sources and method of one merged group.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedGroup {
    pub bounds: Rect,
    pub confidence: f32,
    pub sources: Vec<SourceAlgorithm>,
    pub method: FusionMethod,
}

/// Bonus added to the confidence per extra agreeing source.
const AGREEMENT_BONUS: f32 = 0.1;

/// Collapse one non-empty group.
pub fn merge_group(members: &[&Region], strategy: FusionStrategy) -> Option<MergedGroup> {
    let first = members.first()?;
    let mut sources: Vec<SourceAlgorithm> = members.iter().map(|r| r.source).collect();
    sources.sort();
    sources.dedup();
    if members.len() == 1 {
        return Some(MergedGroup {
            bounds: first.bounds,
            confidence: first.confidence.clamp(0.0, 1.0),
            sources,
            method: FusionMethod::Single,
        });
    }

    let weights: Vec<f32> = members
        .iter()
        .map(|r| (r.confidence * r.weight).max(0.0))
        .collect();
    let total: f32 = weights.iter().sum();
    let (weights, total) = if total > f32::EPSILON {
        (weights, total)
    } else {
        (vec![1.0; members.len()], members.len() as f32)
    };
    let weighted_conf =
        members.iter().zip(&weights).map(|(r, w)| r.confidence * w).sum::<f32>() / total;

    let (bounds, base_conf, method) = match strategy {
        FusionStrategy::WeightedAverage => {
            let avg = |f: fn(&Rect) -> u32| {
                members
                    .iter()
                    .zip(&weights)
                    .map(|(r, w)| f(&r.bounds) as f32 * w)
                    .sum::<f32>()
                    / total
            };
            let bounds = Rect {
                x: avg(|r| r.x).round() as u32,
                y: avg(|r| r.y).round() as u32,
                width: (avg(|r| r.width).round() as u32).max(1),
                height: (avg(|r| r.height).round() as u32).max(1),
            };
            (bounds, weighted_conf, FusionMethod::WeightedAverage)
        }
        FusionStrategy::HighestConfidence => {
            let best = members
                .iter()
                .zip(&weights)
                .fold((first, f32::MIN), |acc, (r, &w)| if w > acc.1 { (r, w) } else { acc })
                .0;
            (best.bounds, best.confidence, FusionMethod::HighestConfidence)
        }
        FusionStrategy::Union => {
            let bounds = members
                .iter()
                .skip(1)
                .fold(first.bounds, |acc, r| acc.union(&r.bounds));
            (bounds, weighted_conf, FusionMethod::Union)
        }
    };
    let bonus = AGREEMENT_BONUS * sources.len().saturating_sub(1) as f32;
    Some(MergedGroup {
        bounds,
        confidence: (base_conf + bonus).clamp(0.0, 1.0),
        sources,
        method,
    })
}
