//! Canonical region type and the adapters that convert each technique's
//! native output into it.
use super::options::{AlgorithmWeights, FusionOptions};
use crate::collaborators::{ColorSegmentation, SeparatedRegion};
use crate::edges::Contour;
use crate::image::Mask;
use crate::segmentation::{connected_components, Connectivity};
use crate::types::{Rect, SourceAlgorithm};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionProperties {
    pub edge_strength: f32,
    pub color_uniformity: f32,
    /// Foreground pixels over bounding-box area.
    pub density: f32,
}

/// A candidate sprite from one technique, before fusion.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: usize,
    pub source: SourceAlgorithm,
    pub bounds: Rect,
    pub area: f32,
    pub confidence: f32,
    pub aspect_ratio: f32,
    pub centroid: [f32; 2],
    pub weight: f32,
    pub properties: RegionProperties,
}

/// One spatially connected part of a colour cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorClusterPart {
    pub bounds: Rect,
    pub centroid: [f32; 2],
    pub pixel_count: usize,
    /// Share of all clustered pixels held by this part.
    pub dominance: f32,
    pub average_alpha: f32,
}

/// Native output of each technique.
#[derive(Clone, Debug)]
pub enum SourceRegion {
    Edge(Contour),
    Color(ColorClusterPart),
    Morphology(SeparatedRegion),
}

impl SourceRegion {
    pub fn source(&self) -> SourceAlgorithm {
        match self {
            SourceRegion::Edge(_) => SourceAlgorithm::Edge,
            SourceRegion::Color(_) => SourceAlgorithm::Color,
            SourceRegion::Morphology(_) => SourceAlgorithm::Morphology,
        }
    }

    pub fn into_region(self, id: usize, options: &FusionOptions) -> Region {
        let weights: &AlgorithmWeights = &options.weights;
        match self {
            SourceRegion::Edge(contour) => {
                let m = contour.metrics;
                Region {
                    id,
                    source: SourceAlgorithm::Edge,
                    bounds: m.bounds,
                    area: m.area,
                    confidence: (m.extent * m.solidity).clamp(0.0, 1.0),
                    aspect_ratio: m.aspect_ratio,
                    centroid: m.centroid,
                    weight: weights.edge,
                    properties: RegionProperties {
                        edge_strength: if contour.closed { 1.0 } else { 0.5 },
                        color_uniformity: 0.0,
                        density: m.extent.clamp(0.0, 1.0),
                    },
                }
            }
            SourceRegion::Color(part) => Region {
                id,
                source: SourceAlgorithm::Color,
                bounds: part.bounds,
                area: part.pixel_count as f32,
                confidence: (part.dominance * options.color_dominance_gain).clamp(0.0, 1.0),
                aspect_ratio: part.bounds.aspect_ratio(),
                centroid: part.centroid,
                weight: weights.color,
                properties: RegionProperties {
                    edge_strength: 0.0,
                    color_uniformity: 1.0,
                    density: part.pixel_count as f32 / part.bounds.area() as f32,
                },
            },
            SourceRegion::Morphology(sep) => Region {
                id,
                source: SourceAlgorithm::Morphology,
                bounds: sep.bounds,
                area: sep.area,
                confidence: sep.confidence.clamp(0.0, 1.0),
                aspect_ratio: sep.bounds.aspect_ratio(),
                centroid: sep.bounds.center(),
                weight: weights.morph,
                properties: RegionProperties {
                    edge_strength: 0.0,
                    color_uniformity: 0.0,
                    density: (sep.area / sep.bounds.area() as f32).clamp(0.0, 1.0),
                },
            },
        }
    }
}

/// Split colour clusters into connected parts, dropping translucent
/// clusters and parts smaller than `min_size` pixels.
pub fn color_cluster_parts(
    segmentation: &ColorSegmentation,
    width: u32,
    height: u32,
    alpha_threshold: u8,
    min_size: usize,
) -> Vec<ColorClusterPart> {
    let total: usize = segmentation.clusters.iter().map(|c| c.size).sum();
    if total == 0 {
        return Vec::new();
    }
    let mut parts = Vec::new();
    for cluster in &segmentation.clusters {
        if cluster.average_alpha <= alpha_threshold as f32 || cluster.size < min_size {
            continue;
        }
        let mut mask = Mask::new(width as usize, height as usize);
        for p in &cluster.pixels {
            if p.x < width && p.y < height {
                mask.set(p.x as usize, p.y as usize, true);
            }
        }
        for comp in connected_components(&mask, Connectivity::C8) {
            if comp.pixel_count < min_size {
                continue;
            }
            parts.push(ColorClusterPart {
                bounds: comp.bounds,
                centroid: comp.centroid,
                pixel_count: comp.pixel_count,
                dominance: comp.pixel_count as f32 / total as f32,
                average_alpha: cluster.average_alpha,
            });
        }
    }
    parts
}
