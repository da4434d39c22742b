//! Cutout assembly: colour completion around the silhouette and smoothing
//! of partially transparent pixels.
//!
//! Buffers are tightly packed RGBA8 of the refined box.

const BINOMIAL_3X3: [[f32; 3]; 3] = [
    [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
    [2.0 / 16.0, 4.0 / 16.0, 2.0 / 16.0],
    [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
];

/// Replace the alpha channel of `rgba` with `alpha`.
pub fn with_alpha(mut rgba: Vec<u8>, alpha: &[u8]) -> Vec<u8> {
    for (px, &a) in rgba.chunks_exact_mut(4).zip(alpha) {
        px[3] = a;
    }
    rgba
}

fn touches_foreground(alpha: &[u8], w: usize, h: usize, x: usize, y: usize) -> bool {
    for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
        for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
            if alpha[ny * w + nx] > 0 {
                return true;
            }
        }
    }
    false
}

/// Background pixels adjacent to the silhouette take the mean colour of
/// the foreground pixels within `radius`, so later blurring does not pull
/// stale background colour into the edge.
pub fn content_aware_fill(rgba: &mut [u8], alpha: &[u8], w: usize, h: usize, radius: u32) {
    if w == 0 || h == 0 {
        return;
    }
    let source = rgba.to_vec();
    let r = radius.max(1) as usize;
    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            if alpha[i] > 0 || !touches_foreground(alpha, w, h, x, y) {
                continue;
            }
            let mut sum = [0u32; 3];
            let mut n = 0u32;
            for ny in y.saturating_sub(r)..=(y + r).min(h - 1) {
                for nx in x.saturating_sub(r)..=(x + r).min(w - 1) {
                    let j = ny * w + nx;
                    if alpha[j] == 0 {
                        continue;
                    }
                    for c in 0..3 {
                        sum[c] += source[j * 4 + c] as u32;
                    }
                    n += 1;
                }
            }
            if n > 0 {
                for c in 0..3 {
                    rgba[i * 4 + c] = ((sum[c] + n / 2) / n) as u8;
                }
            }
        }
    }
}

/// 3×3 Gaussian smoothing of RGB, applied only where 0 < alpha < 255.
pub fn smooth_edges(rgba: &mut [u8], w: usize, h: usize) {
    let source = rgba.to_vec();
    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let a = source[i * 4 + 3];
            if a == 0 || a == 255 {
                continue;
            }
            let mut acc = [0.0f32; 3];
            let mut weight = 0.0f32;
            for (ky, row) in BINOMIAL_3X3.iter().enumerate() {
                let ny = y as isize + ky as isize - 1;
                if ny < 0 || ny >= h as isize {
                    continue;
                }
                for (kx, &k) in row.iter().enumerate() {
                    let nx = x as isize + kx as isize - 1;
                    if nx < 0 || nx >= w as isize {
                        continue;
                    }
                    let j = (ny as usize * w + nx as usize) * 4;
                    for c in 0..3 {
                        acc[c] += source[j + c] as f32 * k;
                    }
                    weight += k;
                }
            }
            for c in 0..3 {
                rgba[i * 4 + c] = (acc[c] / weight).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}
