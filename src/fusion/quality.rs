//! Scores describing how trustworthy a fused sprite list is.
use crate::types::Rect;
use crate::types::SourceAlgorithm;
use serde::Serialize;

/// IoU above which two returned sprites count as conflicting.
const CONFLICT_IOU: f32 = 0.1;

/// Every score is in [0, 1]; `overall` is the mean of the other four.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub algorithm_agreement: f32,
    pub spatial_consistency: f32,
    pub size_distribution: f32,
    pub expected_count_match: f32,
    pub overall: f32,
}

/// 1 exactly when `count == expected`, falling off linearly otherwise.
pub fn expected_count_score(count: usize, expected: usize) -> f32 {
    if count == expected {
        return 1.0;
    }
    if expected == 0 {
        return 0.0;
    }
    let diff = count.abs_diff(expected) as f32;
    (1.0 - diff / expected as f32).clamp(0.0, 1.0)
}

/// Score `sprites`, each given as its box and contributing sources.
///
/// `active_sources` is the number of techniques that produced regions.
pub fn evaluate<'a, I>(sprites: I, active_sources: usize, expected: usize) -> QualityMetrics
where
    I: IntoIterator<Item = (&'a Rect, &'a [SourceAlgorithm])>,
{
    let sprites: Vec<(&Rect, &[SourceAlgorithm])> = sprites.into_iter().collect();
    let n = sprites.len();

    let algorithm_agreement = if n == 0 {
        0.0
    } else {
        let active = active_sources.max(1) as f32;
        sprites
            .iter()
            .map(|(_, s)| (s.len() as f32 / active).min(1.0))
            .sum::<f32>()
            / n as f32
    };

    let spatial_consistency = if n < 2 {
        1.0
    } else {
        let mut pairs = 0usize;
        let mut conflicts = 0usize;
        for i in 0..n {
            for j in i + 1..n {
                pairs += 1;
                if sprites[i].0.iou(sprites[j].0) > CONFLICT_IOU {
                    conflicts += 1;
                }
            }
        }
        1.0 - conflicts as f32 / pairs as f32
    };

    let size_distribution = if n < 2 {
        1.0
    } else {
        let areas: Vec<f32> = sprites.iter().map(|(r, _)| r.area() as f32).collect();
        let mean = areas.iter().sum::<f32>() / n as f32;
        let var = areas.iter().map(|a| (a - mean).powi(2)).sum::<f32>() / n as f32;
        let cv = if mean > 0.0 { var.sqrt() / mean } else { 0.0 };
        1.0 / (1.0 + cv)
    };

    let expected_count_match = expected_count_score(n, expected);
    let overall = ((algorithm_agreement
        + spatial_consistency
        + size_distribution
        + expected_count_match)
        / 4.0)
        .clamp(0.0, 1.0);

    QualityMetrics {
        algorithm_agreement,
        spatial_consistency,
        size_distribution,
        expected_count_match,
        overall,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_score_is_one_only_on_exact_match() {
        assert_eq!(expected_count_score(5, 5), 1.0);
        assert!(expected_count_score(4, 5) < 1.0);
        assert!(expected_count_score(6, 5) < 1.0);
        assert_eq!(expected_count_score(20, 5), 0.0);
        assert_eq!(expected_count_score(0, 0), 1.0);
        assert_eq!(expected_count_score(1, 0), 0.0);
    }

    #[test]
    fn identical_disjoint_boxes_score_high() {
        let rects: Vec<Rect> = (0..3)
            .map(|i| Rect::new(i * 20, 0, 10, 10).unwrap())
            .collect();
        let sources = [SourceAlgorithm::Edge, SourceAlgorithm::Color];
        let q = evaluate(rects.iter().map(|r| (r, &sources[..])), 2, 3);
        assert_eq!(q.algorithm_agreement, 1.0);
        assert_eq!(q.spatial_consistency, 1.0);
        assert_eq!(q.size_distribution, 1.0);
        assert_eq!(q.expected_count_match, 1.0);
        assert_eq!(q.overall, 1.0);
    }

    #[test]
    fn overall_stays_in_unit_range() {
        let rects = vec![
            Rect::new(0, 0, 100, 100).unwrap(),
            Rect::new(5, 5, 90, 90).unwrap(),
            Rect::new(0, 0, 1, 1).unwrap(),
        ];
        let sources = [SourceAlgorithm::Morphology];
        let q = evaluate(rects.iter().map(|r| (r, &sources[..])), 3, 10);
        assert!((0.0..=1.0).contains(&q.overall));
        assert!(q.spatial_consistency < 1.0);
        let empty = evaluate(std::iter::empty(), 3, 5);
        assert!((0.0..=1.0).contains(&empty.overall));
        assert_eq!(empty.expected_count_match, 0.0);
    }
}
