//! Border-following contour extraction, shape metrics and polyline
//! simplification.
//!
//! The tracer scans the edge map in raster order and, from every unvisited
//! edge pixel, walks the 8-neighbourhood with a turn-left-after-step rule:
//! after stepping in direction `d` the next search starts two directions
//! counter-clockwise of `d` and proceeds clockwise. Walks stop when they
//! return to their start pixel, run out of neighbours, or hit the point cap.
//! Capped walks are kept and flagged as truncated.
use crate::image::Mask;
use crate::types::{Pixel, Rect};
use serde::Serialize;

/// Clockwise direction ring in image coordinates (+y down), starting east.
const DIRECTIONS: [(isize, isize); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Default cap on the number of points collected per contour.
pub const MAX_CONTOUR_POINTS: usize = 10_000;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContourMetrics {
    /// Enclosed area (shoelace formula over pixel centres).
    pub area: f32,
    /// Cumulative segment length including the closing segment.
    pub perimeter: f32,
    pub centroid: [f32; 2],
    pub bounds: Rect,
    /// Bounding box width / height.
    pub aspect_ratio: f32,
    /// area / bounding-box area.
    pub extent: f32,
    /// Approximated by `extent`; no convex hull is built.
    pub solidity: f32,
    /// Every non-zero turn has the same orientation.
    pub convex: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contour {
    pub points: Vec<Pixel>,
    /// The walk returned to its start pixel.
    pub closed: bool,
    /// The walk stopped at the point cap.
    pub truncated: bool,
    pub metrics: ContourMetrics,
}

/// Trace every edge component of `edges`.
///
/// Contours with fewer than three points are dropped since no metric is
/// meaningful for them.
pub fn trace_contours(edges: &Mask, max_points: usize) -> Vec<Contour> {
    let (w, h) = (edges.w, edges.h);
    let mut visited = vec![false; w * h];
    let mut contours = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            if visited[i] || !edges.is_set(x, y) {
                continue;
            }
            let (points, closed, truncated) = follow_border(edges, &mut visited, x, y, max_points);
            if points.len() >= 3 {
                let metrics = contour_metrics(&points);
                contours.push(Contour {
                    points,
                    closed,
                    truncated,
                    metrics,
                });
            }
        }
    }
    contours
}

fn follow_border(
    edges: &Mask,
    visited: &mut [bool],
    start_x: usize,
    start_y: usize,
    max_points: usize,
) -> (Vec<Pixel>, bool, bool) {
    let (w, h) = (edges.w as isize, edges.h as isize);
    let mut points = vec![Pixel::new(start_x as u32, start_y as u32)];
    visited[start_y * edges.w + start_x] = true;

    let (mut cx, mut cy) = (start_x as isize, start_y as isize);
    let mut dir = 0usize;
    loop {
        if points.len() >= max_points {
            return (points, false, true);
        }
        let mut next = None;
        for k in 0..8 {
            let d = (dir + 6 + k) % 8;
            let (dx, dy) = DIRECTIONS[d];
            let (nx, ny) = (cx + dx, cy + dy);
            if nx >= 0 && ny >= 0 && nx < w && ny < h && edges.is_set(nx as usize, ny as usize) {
                next = Some((nx, ny, d));
                break;
            }
        }
        let Some((nx, ny, d)) = next else {
            return (points, false, false);
        };
        if nx == start_x as isize && ny == start_y as isize {
            return (points, true, false);
        }
        visited[ny as usize * edges.w + nx as usize] = true;
        points.push(Pixel::new(nx as u32, ny as u32));
        cx = nx;
        cy = ny;
        dir = d;
    }
}

/// Area, perimeter, centroid, bounding box and derived ratios.
pub fn contour_metrics(points: &[Pixel]) -> ContourMetrics {
    let n = points.len();
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut sum_x = 0.0f64;
    let mut sum_y = 0.0f64;
    let mut twice_area = 0.0f64;
    let mut perimeter = 0.0f64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % n];
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
        sum_x += p.x as f64;
        sum_y += p.y as f64;
        twice_area += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
        let (dx, dy) = (q.x as f64 - p.x as f64, q.y as f64 - p.y as f64);
        perimeter += (dx * dx + dy * dy).sqrt();
    }
    let bounds = Rect::from_extents(min_x, min_y, max_x, max_y);
    let area = (twice_area.abs() * 0.5) as f32;
    let extent = area / bounds.area() as f32;
    ContourMetrics {
        area,
        perimeter: perimeter as f32,
        centroid: [(sum_x / n as f64) as f32, (sum_y / n as f64) as f32],
        bounds,
        aspect_ratio: bounds.aspect_ratio(),
        extent,
        solidity: extent,
        convex: is_convex(points),
    }
}

fn is_convex(points: &[Pixel]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0i64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross = (b.x as i64 - a.x as i64) * (c.y as i64 - b.y as i64)
            - (b.y as i64 - a.y as i64) * (c.x as i64 - b.x as i64);
        if cross == 0 {
            continue;
        }
        let s = cross.signum();
        if sign == 0 {
            sign = s;
        } else if s != sign {
            return false;
        }
    }
    sign != 0
}

/// Douglas–Peucker simplification of a closed ring. Returns the indices of
/// the kept points in ring order.
pub fn douglas_peucker_closed(points: &[[f32; 2]], epsilon: f32) -> Vec<usize> {
    let n = points.len();
    if n <= 3 {
        return (0..n).collect();
    }
    // Split the ring at the point farthest from the first one.
    let far = (1..n)
        .max_by(|&a, &b| {
            dist2(points[0], points[a]).total_cmp(&dist2(points[0], points[b]))
        })
        .unwrap_or(n / 2);

    let mut first = douglas_peucker(&points[..=far], epsilon);
    let mut tail: Vec<[f32; 2]> = points[far..].to_vec();
    tail.push(points[0]);
    let second = douglas_peucker(&tail, epsilon);

    // `second` starts at `far` (already present) and ends at the ring start.
    first.extend(
        second
            .into_iter()
            .skip(1)
            .map(|i| far + i)
            .filter(|&i| i < n),
    );
    first
}

/// Douglas–Peucker simplification of an open polyline. Endpoints are always
/// kept; indices are returned in order.
pub fn douglas_peucker(points: &[[f32; 2]], epsilon: f32) -> Vec<usize> {
    let n = points.len();
    if n <= 2 {
        return (0..n).collect();
    }
    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;
    let mut stack = vec![(0usize, n - 1)];
    while let Some((lo, hi)) = stack.pop() {
        if hi <= lo + 1 {
            continue;
        }
        let mut best = (0.0f32, lo);
        for i in lo + 1..hi {
            let d = point_segment_distance(points[i], points[lo], points[hi]);
            if d > best.0 {
                best = (d, i);
            }
        }
        if best.0 > epsilon {
            keep[best.1] = true;
            stack.push((lo, best.1));
            stack.push((best.1, hi));
        }
    }
    (0..n).filter(|&i| keep[i]).collect()
}

#[inline]
fn dist2(a: [f32; 2], b: [f32; 2]) -> f32 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

fn point_segment_distance(p: [f32; 2], a: [f32; 2], b: [f32; 2]) -> f32 {
    let len2 = dist2(a, b);
    if len2 <= f32::EPSILON {
        return dist2(p, a).sqrt();
    }
    let t = (((p[0] - a[0]) * (b[0] - a[0]) + (p[1] - a[1]) * (b[1] - a[1])) / len2).clamp(0.0, 1.0);
    let proj = [a[0] + t * (b[0] - a[0]), a[1] + t * (b[1] - a[1])];
    dist2(p, proj).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_ring(x0: usize, y0: usize, side: usize, w: usize, h: usize) -> Mask {
        Mask::from_fn(w, h, |x, y| {
            let inside = (x0..x0 + side).contains(&x) && (y0..y0 + side).contains(&y);
            let border = x == x0 || y == y0 || x == x0 + side - 1 || y == y0 + side - 1;
            inside && border
        })
    }

    #[test]
    fn traces_square_ring_as_one_closed_contour() {
        let ring = square_ring(2, 3, 10, 16, 16);
        let contours = trace_contours(&ring, MAX_CONTOUR_POINTS);
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        assert!(c.closed);
        assert!(!c.truncated);
        assert_eq!(c.points.len(), 36);
        assert_eq!(c.metrics.bounds, Rect::new(2, 3, 10, 10).unwrap());
        assert!((c.metrics.area - 81.0).abs() < 1e-3);
        assert!((c.metrics.perimeter - 36.0).abs() < 1e-3);
        assert!((c.metrics.centroid[0] - 6.5).abs() < 1e-3);
        assert!((c.metrics.aspect_ratio - 1.0).abs() < 1e-6);
        assert!(c.metrics.convex);
    }

    #[test]
    fn point_cap_truncates_walk() {
        let ring = square_ring(0, 0, 20, 20, 20);
        let contours = trace_contours(&ring, 10);
        assert!(contours[0].truncated);
        assert_eq!(contours[0].points.len(), 10);
    }

    #[test]
    fn douglas_peucker_reduces_square_to_corners() {
        let ring = square_ring(0, 0, 10, 10, 10);
        let contour = &trace_contours(&ring, MAX_CONTOUR_POINTS)[0];
        let pts: Vec<[f32; 2]> = contour
            .points
            .iter()
            .map(|p| [p.x as f32, p.y as f32])
            .collect();
        let kept = douglas_peucker_closed(&pts, 0.5);
        let corners: Vec<[f32; 2]> = kept.iter().map(|&i| pts[i]).collect();
        assert_eq!(corners.len(), 4, "{corners:?}");
        for c in [[0.0, 0.0], [9.0, 0.0], [9.0, 9.0], [0.0, 9.0]] {
            assert!(corners.contains(&c));
        }
    }
}
