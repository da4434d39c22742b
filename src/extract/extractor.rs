//! Per-layer extraction driver.
use super::alpha::{anti_alias, build_alpha, feather};
use super::assemble::{content_aware_fill, smooth_edges, with_alpha};
use super::boundary::{grow_region, refine_boundary};
use super::contour::precision_contour;
use super::layer::{unix_millis, ExtractedLayerData, ExtractionMetadata, LayerInfo};
use super::options::{ExtractionOptions, PrecisionMode};
use crate::deadline::Deadline;
use crate::error::Result;
use crate::image::io::to_rgba_image;
use crate::image::RasterImage;
use crate::types::{PercentPoint, PercentRect, Pixel, Rect};
use log::debug;

/// Confidence reported when no edge supported the refined box.
const FALLBACK_CONFIDENCE: f32 = 0.25;

/// Turns an approximate sprite box into a pixel-exact RGBA cutout.
#[derive(Clone, Debug, Default)]
pub struct LayerExtractor {
    options: ExtractionOptions,
}

impl LayerExtractor {
    pub fn new(options: ExtractionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    /// Extract the layer around `bounds` with no processing budget.
    ///
    /// `hints` are contour points of the approximate outline; surgical mode
    /// grows a colour region from the first one that lands on the image.
    pub fn refine(
        &self,
        image: &RasterImage,
        bounds: &PercentRect,
        hints: &[PercentPoint],
        info: LayerInfo,
    ) -> Result<ExtractedLayerData> {
        self.refine_with_deadline(image, bounds, hints, info, &Deadline::none())
    }

    pub fn refine_with_deadline(
        &self,
        image: &RasterImage,
        bounds: &PercentRect,
        hints: &[PercentPoint],
        info: LayerInfo,
        deadline: &Deadline,
    ) -> Result<ExtractedLayerData> {
        let (w, h) = (image.width(), image.height());
        let approx = bounds.to_pixels(w, h)?;
        let seeds: Vec<Pixel> = hints.iter().filter_map(|p| p.to_pixel(w, h)).collect();
        self.refine_pixels(image, approx, &seeds, info, deadline)
    }

    /// Pixel-space entry point used by the sheet splitter.
    pub fn refine_pixels(
        &self,
        image: &RasterImage,
        approx: Rect,
        seeds: &[Pixel],
        info: LayerInfo,
        deadline: &Deadline,
    ) -> Result<ExtractedLayerData> {
        deadline.check("extract")?;
        let opts = &self.options;
        let (w, h) = (image.width(), image.height());
        let roi = approx.padded(opts.padding(), w, h);

        let boundary = refine_boundary(image, &roi, &approx, opts, deadline)?;
        let mut refined = boundary.refined;
        if opts.mode == PrecisionMode::Surgical {
            if let Some(&seed) = seeds.first() {
                let grown = grow_region(
                    image,
                    &roi,
                    seed,
                    opts.region_grow_threshold,
                    &opts.foreground,
                );
                if let Some(grown) = grown {
                    refined = refined.union(&grown);
                }
            }
        }

        deadline.check("extract.contour")?;
        let contour = precision_contour(&boundary.edges, &boundary.grad, &roi, w, h, opts);

        deadline.check("extract.alpha")?;
        let (rw, rh) = (refined.width as usize, refined.height as usize);
        let mut rgba = image.crop_rgba(&refined);
        let mut alpha = build_alpha(image, &refined, opts.alpha_fill, &opts.foreground);
        let rgba = match opts.mode {
            PrecisionMode::Standard => {
                alpha = feather(&alpha, rw, rh, opts.feather_radius);
                with_alpha(rgba, &alpha)
            }
            PrecisionMode::Surgical => {
                content_aware_fill(&mut rgba, &alpha, rw, rh, opts.fill_radius);
                alpha = anti_alias(&feather(&alpha, rw, rh, opts.feather_radius), rw, rh);
                let mut rgba = with_alpha(rgba, &alpha);
                smooth_edges(&mut rgba, rw, rh);
                rgba
            }
        };

        let pixel_count = alpha.iter().filter(|&&a| a > 0).count() as u64;
        let confidence = if boundary.fallback {
            FALLBACK_CONFIDENCE
        } else {
            (0.5 + 0.5 * contour.mean_pressure()).clamp(0.0, 1.0)
        };
        debug!(
            "layer {}: approx {:?} -> refined {:?} ({} mode, {} contour points, fallback={})",
            info.id,
            approx,
            refined,
            opts.mode.as_str(),
            contour.points.len(),
            boundary.fallback
        );

        let metadata = ExtractionMetadata {
            method: opts.mode,
            alpha_fill: opts.alpha_fill,
            confidence,
            pixel_count,
            boundary_length: contour.boundary_length,
            fallback: boundary.fallback,
            timestamp_ms: unix_millis(),
        };
        Ok(ExtractedLayerData {
            id: info.id,
            name: info.name,
            sprite_type: info.sprite_type,
            original_bounds: approx.to_percent(w, h),
            refined_bounds: refined.to_percent(w, h),
            refined_pixels: refined,
            contour,
            image: to_rgba_image(refined.width, refined.height, rgba)?,
            alpha,
            metadata,
        })
    }
}
