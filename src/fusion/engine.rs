use super::classify::classify;
use super::grouping::{group_regions, merge_group, FusionMethod};
use super::options::FusionOptions;
use super::quality::{evaluate, QualityMetrics};
use super::region::{color_cluster_parts, Region, SourceRegion};
use crate::collaborators::{
    ColorSegmenter, KMeansColorSegmenter, ModelRefiner, MorphSeparator, MorphologicalSeparator,
    RefinementRequest, SpriteSummary,
};
use crate::deadline::Deadline;
use crate::diagnostics::{elapsed_ms, TimingBreakdown};
use crate::edges::EdgeAnalyzer;
use crate::error::{Result, SpriteError};
use crate::image::RasterImage;
use crate::types::{Rect, SourceAlgorithm, SpriteType};
use image::RgbaImage;
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// One sprite produced by fusion.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FusedSprite {
    pub id: usize,
    pub bounds: Rect,
    pub sprite_type: SpriteType,
    pub confidence: f32,
    pub sources: Vec<SourceAlgorithm>,
    pub fusion_method: FusionMethod,
    /// Cutout attached by [`SheetSplitter::extract_fused`](crate::split::SheetSplitter::extract_fused).
    #[serde(skip)]
    pub extracted: Option<RgbaImage>,
}

/// Number of regions each technique contributed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCounts {
    pub edge: usize,
    pub color: usize,
    pub morphology: usize,
}

impl RegionCounts {
    fn active_sources(&self) -> usize {
        [self.edge, self.color, self.morphology]
            .iter()
            .filter(|&&n| n > 0)
            .count()
    }
}

/// Output of [`RegionFusionEngine::fuse`].
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionResult {
    pub sprites: Vec<FusedSprite>,
    /// Mean confidence of the returned sprites, 0 when none.
    pub confidence: f32,
    pub quality: QualityMetrics,
    pub region_counts: RegionCounts,
    pub model_refined: bool,
    /// A stage failed; `sprites` is empty.
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub timings: TimingBreakdown,
}

impl FusionResult {
    fn failed(reason: String, timings: TimingBreakdown) -> Self {
        Self {
            failed: true,
            failure: Some(reason),
            timings,
            ..Default::default()
        }
    }
}

/// Runs edge analysis and both segmentation services, then reconciles
/// their regions into one sprite list.
#[derive(Clone)]
pub struct RegionFusionEngine {
    color: Arc<dyn ColorSegmenter>,
    morph: Arc<dyn MorphSeparator>,
    model: Option<Arc<dyn ModelRefiner>>,
}

impl Default for RegionFusionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RegionFusionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionFusionEngine")
            .field("model_refiner", &self.model.is_some())
            .finish()
    }
}

impl RegionFusionEngine {
    /// Engine backed by the bundled k-means and morphology services.
    pub fn new() -> Self {
        Self {
            color: Arc::new(KMeansColorSegmenter::default()),
            morph: Arc::new(MorphologicalSeparator::default()),
            model: None,
        }
    }

    pub fn with_color_segmenter(mut self, segmenter: Arc<dyn ColorSegmenter>) -> Self {
        self.color = segmenter;
        self
    }

    pub fn with_morph_separator(mut self, separator: Arc<dyn MorphSeparator>) -> Self {
        self.morph = separator;
        self
    }

    pub fn with_model_refiner(mut self, refiner: Arc<dyn ModelRefiner>) -> Self {
        self.model = Some(refiner);
        self
    }

    pub fn has_model_refiner(&self) -> bool {
        self.model.is_some()
    }

    /// Fuse the three region sources.
    ///
    /// A failing analyzer or collaborator yields `Ok` with `failed = true`
    /// and no sprites. Only deadline expiry and cancellation are returned
    /// as errors.
    pub fn fuse(
        &self,
        image: &RasterImage,
        options: &FusionOptions,
        deadline: &Deadline,
    ) -> Result<FusionResult> {
        let total_start = Instant::now();
        let mut timings = TimingBreakdown::default();
        deadline.check("fusion")?;

        let stage_start = Instant::now();
        let edge_analyzer = EdgeAnalyzer::new(options.edge.clone());
        let (edges, (colors, morph)) = rayon::join(
            || edge_analyzer.detect(image, deadline),
            || {
                rayon::join(
                    || self.color.segment(image, &options.color, deadline),
                    || self.morph.separate(image, &options.morphology, deadline),
                )
            },
        );
        timings.push("fusion.sources", elapsed_ms(stage_start));

        let (edges, colors, morph) = match (edges, colors, morph) {
            (Ok(e), Ok(c), Ok(m)) => (e, c, m),
            (e, c, m) => {
                let mut errors: Vec<SpriteError> =
                    [e.err(), c.err(), m.err()].into_iter().flatten().collect();
                if let Some(pos) = errors.iter().position(SpriteError::is_interrupt) {
                    return Err(errors.swap_remove(pos));
                }
                let reason = errors
                    .iter()
                    .map(|err| err.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                warn!("fusion attempt aborted: {reason}");
                timings.finish(total_start);
                return Ok(FusionResult::failed(reason, timings));
            }
        };
        deadline.check("fusion.adapt")?;

        let stage_start = Instant::now();
        let parts = color_cluster_parts(
            &colors,
            image.width(),
            image.height(),
            options.color.alpha_threshold,
            options.min_color_region,
        );
        let region_counts = RegionCounts {
            edge: edges.contours.len(),
            color: parts.len(),
            morphology: morph.separated_regions.len(),
        };
        let regions: Vec<Region> = edges
            .contours
            .into_iter()
            .map(SourceRegion::Edge)
            .chain(parts.into_iter().map(SourceRegion::Color))
            .chain(
                morph
                    .separated_regions
                    .into_iter()
                    .map(SourceRegion::Morphology),
            )
            .enumerate()
            .map(|(id, src)| src.into_region(id, options))
            .collect();
        debug!(
            "fusion regions edge={} color={} morphology={}",
            region_counts.edge, region_counts.color, region_counts.morphology
        );

        let groups = group_regions(&regions, options);
        let mut sprites: Vec<FusedSprite> = groups
            .iter()
            .filter_map(|group| {
                let members: Vec<&Region> = group.iter().map(|&i| &regions[i]).collect();
                merge_group(&members, options.strategy)
            })
            .enumerate()
            .map(|(id, merged)| FusedSprite {
                id,
                bounds: merged.bounds,
                sprite_type: classify(merged.bounds.area() as f32, merged.bounds.aspect_ratio()),
                confidence: merged.confidence,
                sources: merged.sources,
                fusion_method: merged.method,
                extracted: None,
            })
            .collect();
        timings.push("fusion.group", elapsed_ms(stage_start));
        deadline.check("fusion.group")?;

        let active = region_counts.active_sources();
        let preliminary = quality_of(&sprites, active, options.expected_count);
        let mut model_refined = false;
        if preliminary.overall < options.quality_threshold && options.allow_model_refine {
            if let Some(refiner) = &self.model {
                let stage_start = Instant::now();
                model_refined = self.apply_model_advice(
                    refiner.as_ref(),
                    image,
                    &mut sprites,
                    options,
                );
                timings.push("fusion.model", elapsed_ms(stage_start));
            }
        }

        let sprites = validate(sprites, options);
        let quality = quality_of(&sprites, active, options.expected_count);
        let confidence = if sprites.is_empty() {
            0.0
        } else {
            sprites.iter().map(|s| s.confidence).sum::<f32>() / sprites.len() as f32
        };
        timings.finish(total_start);
        info!(
            "fusion produced {} sprites (quality {:.3}, confidence {:.3})",
            sprites.len(),
            quality.overall,
            confidence
        );
        Ok(FusionResult {
            sprites,
            confidence,
            quality,
            region_counts,
            model_refined,
            failed: false,
            failure: None,
            timings,
        })
    }

    /// Ask the refiner to re-score `sprites`. Returns whether advice was
    /// applied; refiner failures are logged and ignored.
    fn apply_model_advice(
        &self,
        refiner: &dyn ModelRefiner,
        image: &RasterImage,
        sprites: &mut [FusedSprite],
        options: &FusionOptions,
    ) -> bool {
        let request = RefinementRequest {
            prompt: format!(
                "Review {} candidate sprites on a sheet expected to hold {}. \
                 Return a confidence in [0, 1] for each sprite id.",
                sprites.len(),
                options.expected_count
            ),
            expected_count: options.expected_count,
            sprites: sprites
                .iter()
                .map(|s| SpriteSummary {
                    id: s.id,
                    bounds: s.bounds,
                    sprite_type: s.sprite_type,
                    confidence: s.confidence,
                })
                .collect(),
        };
        let advice = match refiner.refine(image, &request) {
            Ok(advice) => advice,
            Err(err) => {
                warn!("model refinement ignored: {err}");
                return false;
            }
        };
        let blend = options.weights.model.clamp(0.0, 1.0);
        let mut applied = false;
        for adj in &advice.adjustments {
            if let Some(sprite) = sprites.iter_mut().find(|s| s.id == adj.id) {
                let advised = adj.confidence.clamp(0.0, 1.0);
                sprite.confidence = (1.0 - blend) * sprite.confidence + blend * advised;
                if !sprite.sources.contains(&SourceAlgorithm::Model) {
                    sprite.sources.push(SourceAlgorithm::Model);
                }
                applied = true;
            }
        }
        applied
    }
}

fn quality_of(sprites: &[FusedSprite], active: usize, expected: usize) -> QualityMetrics {
    evaluate(
        sprites.iter().map(|s| (&s.bounds, s.sources.as_slice())),
        active,
        expected,
    )
}

/// Drop weak or out-of-range sprites, order them by type priority, area
/// and confidence, and keep at most `expected_count + count_buffer`.
pub fn validate(sprites: Vec<FusedSprite>, options: &FusionOptions) -> Vec<FusedSprite> {
    let mut kept: Vec<FusedSprite> = sprites
        .into_iter()
        .filter(|s| {
            let area = s.bounds.area();
            s.confidence >= options.min_confidence
                && area >= options.min_area
                && area <= options.max_area
        })
        .collect();
    kept.sort_by(|a, b| {
        a.sprite_type
            .priority()
            .cmp(&b.sprite_type.priority())
            .then(b.bounds.area().cmp(&a.bounds.area()))
            .then(b.confidence.total_cmp(&a.confidence))
    });
    kept.truncate(options.expected_count + options.count_buffer);
    for (id, sprite) in kept.iter_mut().enumerate() {
        sprite.id = id;
    }
    kept
}
