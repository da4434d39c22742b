//! Deterministic k-means colour clustering.
use super::{ColorCluster, ColorSegmentOptions, ColorSegmentation, ColorSegmenter, ColorSpace};
use crate::deadline::Deadline;
use crate::error::Result;
use crate::image::{is_foreground_rgba, ForegroundParams, RasterImage};
use crate::types::Pixel;
use log::debug;

/// Largest distance between two colours in 8-bit RGB space.
const MAX_COLOR_DISTANCE: f32 = 441.673;

/// Lloyd's k-means over opaque pixels.
///
/// Centroids are seeded from evenly spaced samples in raster order so the
/// same image always clusters the same way.
#[derive(Clone, Debug)]
pub struct KMeansColorSegmenter {
    /// When set, pixels rejected by this predicate are not clustered.
    pub background: Option<ForegroundParams>,
}

impl Default for KMeansColorSegmenter {
    fn default() -> Self {
        Self {
            background: Some(ForegroundParams::default()),
        }
    }
}

fn feature(px: [u8; 4], space: ColorSpace) -> [f32; 3] {
    let (r, g, b) = (px[0] as f32, px[1] as f32, px[2] as f32);
    match space {
        ColorSpace::Rgb => [r, g, b],
        ColorSpace::Hsv => {
            let max = r.max(g).max(b);
            let min = r.min(g).min(b);
            let delta = max - min;
            let hue = if delta <= f32::EPSILON {
                0.0
            } else if max == r {
                60.0 * ((g - b) / delta).rem_euclid(6.0)
            } else if max == g {
                60.0 * ((b - r) / delta + 2.0)
            } else {
                60.0 * ((r - g) / delta + 4.0)
            };
            let sat = if max <= f32::EPSILON { 0.0 } else { delta / max };
            [hue / 360.0 * 255.0, sat * 255.0, max]
        }
    }
}

#[inline]
fn dist(a: [f32; 3], b: [f32; 3]) -> f32 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}

impl ColorSegmenter for KMeansColorSegmenter {
    fn segment(
        &self,
        image: &RasterImage,
        options: &ColorSegmentOptions,
        deadline: &Deadline,
    ) -> Result<ColorSegmentation> {
        let mut pixels = Vec::new();
        let mut features = Vec::new();
        let mut alphas = Vec::new();
        for y in 0..image.height() {
            deadline.check_row(y as usize, "kmeans.collect")?;
            for x in 0..image.width() {
                let px = image.pixel(x, y);
                if px[3] <= options.alpha_threshold {
                    continue;
                }
                if let Some(bg) = &self.background {
                    if !is_foreground_rgba(px, bg) {
                        continue;
                    }
                }
                pixels.push(Pixel::new(x, y));
                features.push(feature(px, options.color_space));
                alphas.push(px[3] as f32);
            }
        }

        let n = pixels.len();
        let k = options.k.min(n);
        if k == 0 {
            return Ok(ColorSegmentation::default());
        }

        let mut centroids: Vec<[f32; 3]> = (0..k).map(|i| features[i * n / k]).collect();
        let mut assignment = vec![0usize; n];
        let mut iterations = 0;
        for _ in 0..options.max_iterations.max(1) {
            deadline.check("kmeans.iterate")?;
            iterations += 1;
            for (a, f) in assignment.iter_mut().zip(&features) {
                *a = nearest(&centroids, *f);
            }
            let mut sums = vec![[0.0f64; 3]; k];
            let mut counts = vec![0usize; k];
            for (&a, f) in assignment.iter().zip(&features) {
                for c in 0..3 {
                    sums[a][c] += f[c] as f64;
                }
                counts[a] += 1;
            }
            let mut max_shift = 0.0f32;
            for (i, centroid) in centroids.iter_mut().enumerate() {
                if counts[i] == 0 {
                    continue;
                }
                let updated = [
                    (sums[i][0] / counts[i] as f64) as f32,
                    (sums[i][1] / counts[i] as f64) as f32,
                    (sums[i][2] / counts[i] as f64) as f32,
                ];
                max_shift = max_shift.max(dist(*centroid, updated));
                *centroid = updated;
            }
            if max_shift <= options.convergence_threshold {
                break;
            }
        }

        let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
        let mut spread = 0.0f64;
        for (i, &a) in assignment.iter().enumerate() {
            members[a].push(i);
            spread += dist(centroids[a], features[i]) as f64;
        }
        let clusters: Vec<ColorCluster> = members
            .into_iter()
            .filter(|m| !m.is_empty())
            .map(|m| {
                let size = m.len();
                let alpha_sum: f32 = m.iter().map(|&i| alphas[i]).sum();
                ColorCluster {
                    pixels: m.iter().map(|&i| pixels[i]).collect(),
                    size,
                    average_alpha: alpha_sum / size as f32,
                    dominance: size as f32 / n as f32,
                }
            })
            .collect();
        let mean_spread = (spread / n as f64) as f32;
        let confidence = (1.0 - mean_spread / MAX_COLOR_DISTANCE).clamp(0.0, 1.0);
        debug!(
            "KMeansColorSegmenter: {} pixels -> {} clusters in {} iterations",
            n,
            clusters.len(),
            iterations
        );
        Ok(ColorSegmentation {
            clusters,
            confidence,
        })
    }
}

fn nearest(centroids: &[[f32; 3]], f: [f32; 3]) -> usize {
    let mut best = (f32::MAX, 0);
    for (i, c) in centroids.iter().enumerate() {
        let d = dist(*c, f);
        if d < best.0 {
            best = (d, i);
        }
    }
    best.1
}
