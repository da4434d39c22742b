//! Detector pipeline: strategy fallback, reconciliation and labelling.
//!
//! Typical usage:
//! ```no_run
//! use sprite_splitter::{Deadline, DetectionOutcome, DetectorParams, SpriteDetector};
//! use sprite_splitter::image::io::load_raster;
//!
//! # fn main() -> sprite_splitter::Result<()> {
//! let image = load_raster("sheet.png".as_ref())?;
//! let detector = SpriteDetector::new(DetectorParams::default());
//! let report = detector.detect(&image, &Deadline::none())?;
//! if let DetectionOutcome::Detected(detection) = &report.outcome {
//!     for sprite in &detection.sprites {
//!         println!("{:?} {:?}", sprite.sprite_type, sprite.bounds);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
use super::baseline::baseline_regions;
use super::legacy::legacy_regions;
use super::params::{DetectorParams, Strategy};
use super::reconcile::reconcile;
use super::region::MaskRegion;
use crate::deadline::Deadline;
use crate::diagnostics::{
    elapsed_ms, DetectionReport, FusionStage, InputDescriptor, PipelineTrace, StrategyAttempt,
    TimingBreakdown,
};
use crate::error::Result;
use crate::fusion::{classify, FusionOptions, RegionFusionEngine};
use crate::image::{Mask, RasterImage};
use crate::segmentation::foreground_mask;
use crate::types::{PercentRect, Rect, SpriteType};
use log::{debug, info, warn};
use serde::Serialize;
use std::time::Instant;

/// One sprite found on the sheet.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedSprite {
    pub id: usize,
    pub bounds: Rect,
    /// `bounds` in percentage-of-image space.
    pub bounds_percent: PercentRect,
    pub sprite_type: SpriteType,
    pub confidence: f32,
    /// Foreground pixels inside `bounds`.
    pub pixel_count: usize,
}

/// Sprites produced by the first successful strategy.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub strategy: Strategy,
    pub image_width: u32,
    pub image_height: u32,
    pub sprites: Vec<DetectedSprite>,
}

/// Either some sprites or the explicit "nothing found" result.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum DetectionOutcome {
    Detected(Detection),
    /// Every strategy ran and produced nothing.
    NoSprites { attempts: usize },
}

impl DetectionOutcome {
    pub fn sprites(&self) -> &[DetectedSprite] {
        match self {
            DetectionOutcome::Detected(d) => &d.sprites,
            DetectionOutcome::NoSprites { .. } => &[],
        }
    }
}

/// Sprite detector trying baseline, fusion and legacy strategies in turn.
#[derive(Clone, Debug, Default)]
pub struct SpriteDetector {
    params: DetectorParams,
    fusion: RegionFusionEngine,
}

impl SpriteDetector {
    pub fn new(params: DetectorParams) -> Self {
        Self {
            params,
            fusion: RegionFusionEngine::new(),
        }
    }

    /// Use a custom fusion engine (e.g. with remote segmentation services).
    pub fn with_fusion_engine(mut self, engine: RegionFusionEngine) -> Self {
        self.fusion = engine;
        self
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Detect sprites. Strategy failures fall through to the next strategy;
    /// only deadline expiry and cancellation are returned as errors.
    pub fn detect(&self, image: &RasterImage, deadline: &Deadline) -> Result<DetectionReport> {
        let total_start = Instant::now();
        let params = &self.params;
        let (w, h) = (image.width(), image.height());
        let mut timings = TimingBreakdown::default();
        let mut attempts = Vec::new();
        let mut fusion_stage = None;

        deadline.check("mask")?;
        let mask = timings.measure("mask", || foreground_mask(image, &params.foreground));
        let foreground_pixels = mask.count();

        let mut found: Option<(Strategy, Vec<MaskRegion>)> = None;
        for &strategy in &params.strategies {
            deadline.check(strategy.as_str())?;
            let stage_start = Instant::now();
            let (regions, failure) = match strategy {
                Strategy::Baseline => (baseline_regions(&mask, &params.baseline), None),
                Strategy::Legacy => (legacy_regions(&mask, &params.legacy), None),
                Strategy::Fusion => {
                    let (regions, stage) = self.run_fusion(image, &mask, deadline)?;
                    let failure = stage
                        .failed
                        .then(|| "fusion stage failed".to_string());
                    fusion_stage = Some(stage);
                    (regions, failure)
                }
            };
            let elapsed = elapsed_ms(stage_start);
            timings.push(strategy.as_str(), elapsed);
            info!(
                "strategy {} produced {} regions in {:.2} ms",
                strategy.as_str(),
                regions.len(),
                elapsed
            );
            if let Some(reason) = &failure {
                warn!("strategy {} failed: {reason}", strategy.as_str());
            }
            attempts.push(StrategyAttempt {
                strategy,
                regions: regions.len(),
                elapsed_ms: elapsed,
                failure,
            });
            if !regions.is_empty() {
                found = Some((strategy, regions));
                break;
            }
        }

        let mut reconciliation = None;
        let outcome = match found {
            None => {
                info!("no sprites detected after {} strategies", attempts.len());
                DetectionOutcome::NoSprites {
                    attempts: attempts.len(),
                }
            }
            Some((strategy, regions)) => {
                let stage_start = Instant::now();
                let regions = if regions.len() > params.expected_count {
                    let (regions, stats) = reconcile(
                        regions,
                        params.expected_count,
                        w,
                        h,
                        &params.reconcile,
                        deadline,
                    )?;
                    reconciliation = Some(stats);
                    regions
                } else {
                    regions
                };
                timings.push("reconcile", elapsed_ms(stage_start));
                let sprites = label_sprites(regions, w, h, params.dominance_ratio);
                DetectionOutcome::Detected(Detection {
                    strategy,
                    image_width: w,
                    image_height: h,
                    sprites,
                })
            }
        };
        timings.finish(total_start);

        Ok(DetectionReport {
            outcome,
            trace: PipelineTrace {
                input: InputDescriptor {
                    width: w,
                    height: h,
                },
                timings,
                foreground_pixels,
                attempts,
                fusion: fusion_stage,
                reconciliation,
            },
        })
    }

    fn run_fusion(
        &self,
        image: &RasterImage,
        mask: &Mask,
        deadline: &Deadline,
    ) -> Result<(Vec<MaskRegion>, FusionStage)> {
        let options = FusionOptions {
            expected_count: self.params.expected_count,
            allow_model_refine: false,
            ..self.params.fusion.clone()
        };
        let result = self.fusion.fuse(image, &options, deadline)?;
        let regions = result
            .sprites
            .iter()
            .map(|s| MaskRegion {
                bounds: s.bounds,
                pixel_count: mask.count_in(&s.bounds),
                centroid: s.bounds.center(),
                confidence: s.confidence,
            })
            .collect();
        let stage = FusionStage {
            region_counts: result.region_counts,
            quality: result.quality,
            confidence: result.confidence,
            failed: result.failed,
            timings: result.timings,
        };
        Ok((regions, stage))
    }
}

/// Classify each region, promote a clearly dominant one to `Symbol` and
/// order the list by type priority, then area.
pub fn label_sprites(
    regions: Vec<MaskRegion>,
    width: u32,
    height: u32,
    dominance_ratio: f32,
) -> Vec<DetectedSprite> {
    let mut sprites: Vec<DetectedSprite> = regions
        .into_iter()
        .map(|r| DetectedSprite {
            id: 0,
            bounds: r.bounds,
            bounds_percent: r.bounds.to_percent(width, height),
            sprite_type: classify(r.bounds.area() as f32, r.bounds.aspect_ratio()),
            confidence: r.confidence.clamp(0.0, 1.0),
            pixel_count: r.pixel_count,
        })
        .collect();

    let mut by_pixels: Vec<usize> = (0..sprites.len()).collect();
    by_pixels.sort_by(|&a, &b| sprites[b].pixel_count.cmp(&sprites[a].pixel_count));
    if let [first, second, ..] = by_pixels[..] {
        let (top, next) = (sprites[first].pixel_count, sprites[second].pixel_count);
        if top as f32 >= next as f32 * dominance_ratio {
            debug!("promoting dominant region {:?} to symbol", sprites[first].bounds);
            sprites[first].sprite_type = SpriteType::Symbol;
        }
    }

    sprites.sort_by(|a, b| {
        a.sprite_type
            .priority()
            .cmp(&b.sprite_type.priority())
            .then(b.bounds.area().cmp(&a.bounds.area()))
            .then(a.bounds.x.cmp(&b.bounds.x))
            .then(a.bounds.y.cmp(&b.bounds.y))
    });
    for (id, sprite) in sprites.iter_mut().enumerate() {
        sprite.id = id;
    }
    sprites
}
