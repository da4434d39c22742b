//! Ordered precision contour of a layer with per-point edge strength.
use super::options::ExtractionOptions;
use crate::edges::{douglas_peucker, douglas_peucker_closed, trace_contours, Grad};
use crate::image::Mask;
use crate::types::{PercentPoint, Pixel, Rect};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    /// The outline turns sharply here.
    Corner,
    /// Gentle turn on a soft gradient.
    Smooth,
    /// Straight run on a crisp edge.
    Edge,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContourPoint {
    /// Pixel centre in percentage-of-image space.
    pub position: PercentPoint,
    /// Image pixel.
    pub pixel: Pixel,
    /// Gradient magnitude normalised by the ROI maximum, 0..=1.
    pub pressure: f32,
    pub kind: PointKind,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerContour {
    pub points: Vec<ContourPoint>,
    /// Perimeter of the traced (unsimplified) boundary in pixels.
    pub boundary_length: f32,
    pub closed: bool,
}

impl LayerContour {
    pub fn mean_pressure(&self) -> f32 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.iter().map(|p| p.pressure).sum::<f32>() / self.points.len() as f32
    }
}

/// Turn angle in degrees at `p` between the incoming and outgoing segment.
fn turn_angle(prev: [f32; 2], p: [f32; 2], next: [f32; 2]) -> f32 {
    let a = [p[0] - prev[0], p[1] - prev[1]];
    let b = [next[0] - p[0], next[1] - p[1]];
    let (la, lb) = (a[0].hypot(a[1]), b[0].hypot(b[1]));
    if la <= f32::EPSILON || lb <= f32::EPSILON {
        return 0.0;
    }
    let cos = ((a[0] * b[0] + a[1] * b[1]) / (la * lb)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Trace the longest boundary of `edges` (ROI coordinates), simplify it and
/// annotate every kept point.
pub fn precision_contour(
    edges: &Mask,
    grad: &Grad,
    roi: &Rect,
    image_width: u32,
    image_height: u32,
    options: &ExtractionOptions,
) -> LayerContour {
    let contours = trace_contours(edges, options.max_contour_points.max(3));
    let Some(longest) = contours
        .iter()
        .reduce(|best, c| if c.points.len() > best.points.len() { c } else { best })
    else {
        return LayerContour::default();
    };

    let pts: Vec<[f32; 2]> = longest
        .points
        .iter()
        .map(|p| [p.x as f32, p.y as f32])
        .collect();
    let kept = if longest.closed {
        douglas_peucker_closed(&pts, options.simplify_epsilon)
    } else {
        douglas_peucker(&pts, options.simplify_epsilon)
    };
    let max_mag = grad.mag.max_value();
    let n = kept.len();
    let points = kept
        .iter()
        .enumerate()
        .map(|(k, &i)| {
            let neighbour = |offset: isize| {
                let j = k as isize + offset;
                if longest.closed {
                    Some(kept[j.rem_euclid(n as isize) as usize])
                } else if (0..n as isize).contains(&j) {
                    Some(kept[j as usize])
                } else {
                    None
                }
            };
            let turn = match (neighbour(-1), neighbour(1)) {
                (Some(a), Some(b)) if n >= 3 => turn_angle(pts[a], pts[i], pts[b]),
                _ => 0.0,
            };
            let local = longest.points[i];
            let pressure = if max_mag > 0.0 {
                (grad.mag.get(local.x as usize, local.y as usize) / max_mag).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let kind = if turn >= options.corner_angle_deg {
                PointKind::Corner
            } else if pressure >= options.strong_edge {
                PointKind::Edge
            } else {
                PointKind::Smooth
            };
            let pixel = Pixel::new(roi.x + local.x, roi.y + local.y);
            ContourPoint {
                position: PercentPoint::from_pixel(
                    pixel.x as f32 + 0.5,
                    pixel.y as f32 + 0.5,
                    image_width,
                    image_height,
                ),
                pixel,
                pressure,
                kind,
            }
        })
        .collect();

    LayerContour {
        points,
        boundary_length: longest.metrics.perimeter,
        closed: longest.closed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::sobel_gradients;
    use crate::image::ImageF32;

    fn ring(w: usize, h: usize, rect: (usize, usize, usize, usize)) -> Mask {
        let (x0, y0, x1, y1) = rect;
        Mask::from_fn(w, h, |x, y| {
            let inside = (x0..=x1).contains(&x) && (y0..=y1).contains(&y);
            inside && (x == x0 || x == x1 || y == y0 || y == y1)
        })
    }

    #[test]
    fn square_ring_simplifies_to_four_corners() {
        let edges = ring(30, 30, (5, 5, 24, 24));
        let luma = ImageF32::from_fn(30, 30, |x, y| {
            if (5..=24).contains(&x) && (5..=24).contains(&y) {
                0.0
            } else {
                255.0
            }
        });
        let grad = sobel_gradients(&luma);
        let roi = Rect::new(10, 20, 30, 30).unwrap();
        let contour = precision_contour(&edges, &grad, &roi, 100, 100, &ExtractionOptions::default());
        assert!(contour.closed);
        assert_eq!(contour.points.len(), 4);
        assert!(contour
            .points
            .iter()
            .all(|p| p.kind == PointKind::Corner));
        let mut pixels: Vec<(u32, u32)> = contour.points.iter().map(|p| (p.pixel.x, p.pixel.y)).collect();
        pixels.sort();
        assert_eq!(pixels, vec![(15, 25), (15, 44), (34, 25), (34, 44)]);
        assert!((contour.boundary_length - 76.0).abs() < 1e-3);
        for p in &contour.points {
            assert!((0.0..=1.0).contains(&p.pressure));
            assert_eq!(p.position.to_pixel(100, 100), Some(p.pixel));
        }
    }

    #[test]
    fn no_edges_gives_empty_contour() {
        let edges = Mask::new(10, 10);
        let grad = sobel_gradients(&ImageF32::new(10, 10));
        let roi = Rect::new(0, 0, 10, 10).unwrap();
        let contour = precision_contour(&edges, &grad, &roi, 10, 10, &ExtractionOptions::default());
        assert!(contour.points.is_empty());
        assert_eq!(contour.mean_pressure(), 0.0);
    }

    #[test]
    fn straight_turns_are_not_corners() {
        assert_eq!(turn_angle([0.0, 0.0], [1.0, 0.0], [2.0, 0.0]), 0.0);
        assert!((turn_angle([0.0, 0.0], [1.0, 0.0], [1.0, 1.0]) - 90.0).abs() < 1e-4);
    }
}
