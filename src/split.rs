//! End-to-end sheet splitting: detect sprites, then cut each one out.
//!
//! Layers are extracted in parallel with rayon; every extraction owns its
//! scratch buffers and only reads the shared raster.
use crate::deadline::Deadline;
use crate::detector::{DetectionOutcome, SpriteDetector};
use crate::diagnostics::{elapsed_ms, DetectionReport};
use crate::error::Result;
use crate::extract::{ExtractedLayerData, LayerExtractor, LayerInfo};
use crate::fusion::{FusedSprite, FusionResult};
use crate::image::RasterImage;
use crate::types::{Pixel, Rect, SpriteType};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;

/// A sprite the extractor could not cut out.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerFailure {
    pub sprite_id: usize,
    pub reason: String,
}

#[derive(Debug)]
pub struct SplitOutcome {
    pub report: DetectionReport,
    /// One layer per detected sprite, in detection order.
    pub layers: Vec<ExtractedLayerData>,
    pub failures: Vec<LayerFailure>,
    pub extraction_ms: f64,
}

impl SplitOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self.report.outcome, DetectionOutcome::NoSprites { .. })
    }
}

#[derive(Clone, Debug, Default)]
pub struct SheetSplitter {
    detector: SpriteDetector,
    extractor: LayerExtractor,
}

impl SheetSplitter {
    pub fn new(detector: SpriteDetector, extractor: LayerExtractor) -> Self {
        Self {
            detector,
            extractor,
        }
    }

    pub fn detector(&self) -> &SpriteDetector {
        &self.detector
    }

    pub fn extractor(&self) -> &LayerExtractor {
        &self.extractor
    }

    pub fn split(&self, image: &RasterImage) -> Result<SplitOutcome> {
        let deadline = Deadline::from_budget_ms(self.detector.params().budget_ms);
        self.split_with_deadline(image, &deadline)
    }

    /// Detect and extract. Deadline expiry or cancellation in any layer
    /// aborts the call; other extraction errors are recorded per sprite.
    pub fn split_with_deadline(
        &self,
        image: &RasterImage,
        deadline: &Deadline,
    ) -> Result<SplitOutcome> {
        let report = self.detector.detect(image, deadline)?;
        let start = Instant::now();
        let results: Vec<(usize, Result<ExtractedLayerData>)> = report
            .outcome
            .sprites()
            .par_iter()
            .map(|sprite| {
                let layer =
                    self.extract_at(image, sprite.id, sprite.bounds, sprite.sprite_type, deadline);
                (sprite.id, layer)
            })
            .collect();

        let (layers, failures) = partition_layers(results)?;
        let extraction_ms = elapsed_ms(start);
        info!(
            "split: {} layers, {} failures, extraction {:.1} ms",
            layers.len(),
            failures.len(),
            extraction_ms
        );
        Ok(SplitOutcome {
            report,
            layers,
            failures,
            extraction_ms,
        })
    }

    /// Cut out every sprite of a fusion result and attach the image to
    /// [`FusedSprite::extracted`]. Sprites that fail keep `None` and are
    /// reported.
    pub fn extract_fused(
        &self,
        image: &RasterImage,
        fusion: &mut FusionResult,
        deadline: &Deadline,
    ) -> Result<Vec<LayerFailure>> {
        let results: Vec<(usize, Result<ExtractedLayerData>)> = fusion
            .sprites
            .par_iter()
            .map(|sprite| {
                let layer =
                    self.extract_at(image, sprite.id, sprite.bounds, sprite.sprite_type, deadline);
                (sprite.id, layer)
            })
            .collect();
        let (layers, failures) = partition_layers(results)?;
        for layer in layers {
            let target = fusion
                .sprites
                .iter_mut()
                .find(|s: &&mut FusedSprite| layer.id == layer_id(s.id));
            if let Some(sprite) = target {
                sprite.extracted = Some(layer.image);
            }
        }
        Ok(failures)
    }

    fn extract_at(
        &self,
        image: &RasterImage,
        id: usize,
        bounds: Rect,
        sprite_type: SpriteType,
        deadline: &Deadline,
    ) -> Result<ExtractedLayerData> {
        let info = LayerInfo::new(
            layer_id(id),
            format!("{}-{}", sprite_type.as_str(), id),
            sprite_type,
        );
        let [cx, cy] = bounds.center();
        let seed = Pixel::new(cx as u32, cy as u32);
        self.extractor
            .refine_pixels(image, bounds, &[seed], info, deadline)
    }
}

fn layer_id(sprite_id: usize) -> String {
    format!("sprite-{sprite_id}")
}

/// Split per-sprite results into layers and recorded failures. An
/// interrupt in any of them is returned as the error.
fn partition_layers(
    results: Vec<(usize, Result<ExtractedLayerData>)>,
) -> Result<(Vec<ExtractedLayerData>, Vec<LayerFailure>)> {
    let mut layers = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (sprite_id, result) in results {
        match result {
            Ok(layer) => layers.push(layer),
            Err(err) if err.is_interrupt() => return Err(err),
            Err(err) => {
                warn!("sprite {sprite_id}: extraction failed: {err}");
                failures.push(LayerFailure {
                    sprite_id,
                    reason: err.to_string(),
                });
            }
        }
    }
    Ok((layers, failures))
}
