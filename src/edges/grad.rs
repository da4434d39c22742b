//! Sobel gradients with magnitude and a 4-bucket direction quantization.
//!
//! - Convolves the 3×3 Sobel pair with border clamping.
//! - Outputs per-pixel `gx`, `gy`, `mag = sqrt(gx^2 + gy^2)`.
//! - Caches the gradient direction folded into [0°, 180°) and quantized to
//!   the four non-maximum-suppression buckets 0°, 45°, 90° and 135°.
//!
//! Image coordinates have +y pointing down, so bucket 1 (45°) runs from the
//! top-left to the bottom-right neighbour.
use crate::image::{ImageF32, Plane, PlaneMut};

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Per-pixel gradient buffers and direction buckets.
#[derive(Clone, Debug)]
pub struct Grad {
    /// Horizontal derivative
    pub gx: ImageF32,
    /// Vertical derivative (positive when the pixel below is brighter)
    pub gy: ImageF32,
    /// Euclidean magnitude per pixel
    pub mag: ImageF32,
    /// Direction bucket per pixel: 0 → 0°, 1 → 45°, 2 → 90°, 3 → 135°
    pub dir_q4: Vec<u8>,
}

impl Grad {
    /// Neighbour offsets along the gradient for a direction bucket.
    #[inline]
    pub fn bucket_offset(bucket: u8) -> (isize, isize) {
        match bucket {
            0 => (1, 0),
            1 => (1, 1),
            2 => (0, 1),
            _ => (-1, 1),
        }
    }

    /// Keep, per pixel, whichever of `self` and `other` has the larger
    /// magnitude. Both must have the same size.
    pub fn strongest(mut self, other: &Grad) -> Grad {
        debug_assert_eq!((self.mag.w, self.mag.h), (other.mag.w, other.mag.h));
        for i in 0..self.mag.data.len() {
            if other.mag.data[i] > self.mag.data[i] {
                self.gx.data[i] = other.gx.data[i];
                self.gy.data[i] = other.gy.data[i];
                self.mag.data[i] = other.mag.data[i];
                self.dir_q4[i] = other.dir_q4[i];
            }
        }
        self
    }
}

#[inline]
pub fn quantize_direction(gx: f32, gy: f32) -> u8 {
    let mut deg = gy.atan2(gx).to_degrees();
    if deg < 0.0 {
        deg += 180.0;
    }
    if !(22.5..157.5).contains(&deg) {
        0
    } else if deg < 67.5 {
        1
    } else if deg < 112.5 {
        2
    } else {
        3
    }
}

/// Compute Sobel gradients on a single-channel float image.
pub fn sobel_gradients(l: &ImageF32) -> Grad {
    let w = l.w;
    let h = l.h;
    let mut gx = ImageF32::new(w, h);
    let mut gy = ImageF32::new(w, h);
    let mut mag = ImageF32::new(w, h);
    let mut dir_q4 = vec![0u8; w * h];

    if w == 0 || h == 0 {
        return Grad {
            gx,
            gy,
            mag,
            dir_q4,
        };
    }

    for y in 0..h {
        let y_idx = [y.saturating_sub(1), y, (y + 1).min(h - 1)];
        let rows = [l.row(y_idx[0]), l.row(y_idx[1]), l.row(y_idx[2])];
        let out_gx = gx.row_mut(y);
        let out_gy = gy.row_mut(y);
        let out_mag = mag.row_mut(y);
        for x in 0..w {
            let x_idx = [x.saturating_sub(1), x, (x + 1).min(w - 1)];

            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            for (ky, yy_row) in rows.iter().enumerate() {
                let kx_row = &SOBEL_KERNEL_X[ky];
                let ky_row = &SOBEL_KERNEL_Y[ky];
                sum_x += yy_row[x_idx[0]] * kx_row[0]
                    + yy_row[x_idx[1]] * kx_row[1]
                    + yy_row[x_idx[2]] * kx_row[2];
                sum_y += yy_row[x_idx[0]] * ky_row[0]
                    + yy_row[x_idx[1]] * ky_row[1]
                    + yy_row[x_idx[2]] * ky_row[2];
            }

            out_gx[x] = sum_x;
            out_gy[x] = sum_y;
            out_mag[x] = (sum_x * sum_x + sum_y * sum_y).sqrt();
            dir_q4[y * w + x] = quantize_direction(sum_x, sum_y);
        }
    }

    Grad {
        gx,
        gy,
        mag,
        dir_q4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_step_has_horizontal_gradient() {
        let img = ImageF32::from_fn(8, 8, |x, _| if x < 4 { 0.0 } else { 255.0 });
        let grad = sobel_gradients(&img);
        assert!(grad.mag.get(3, 4) > 0.0);
        assert!(grad.mag.get(4, 4) > 0.0);
        assert_eq!(grad.mag.get(1, 4), 0.0);
        assert_eq!(grad.dir_q4[4 * 8 + 3], 0);
    }

    #[test]
    fn strongest_keeps_the_larger_response() {
        let vertical = ImageF32::from_fn(8, 8, |x, _| if x < 4 { 0.0 } else { 20.0 });
        let horizontal = ImageF32::from_fn(8, 8, |_, y| if y < 4 { 0.0 } else { 255.0 });
        let weak = sobel_gradients(&vertical);
        let strong = sobel_gradients(&horizontal);
        let merged = weak.clone().strongest(&strong);
        assert_eq!(merged.mag.get(3, 3), strong.mag.get(3, 3));
        assert_eq!(merged.dir_q4[3 * 8 + 3], strong.dir_q4[3 * 8 + 3]);
        // Away from the horizontal step only the weak vertical edge responds.
        assert_eq!(merged.mag.get(3, 0), weak.mag.get(3, 0));
        assert_eq!(merged.dir_q4[3], 0);
    }

    #[test]
    fn direction_buckets() {
        assert_eq!(quantize_direction(1.0, 0.0), 0);
        assert_eq!(quantize_direction(-1.0, 0.0), 0);
        assert_eq!(quantize_direction(1.0, 1.0), 1);
        assert_eq!(quantize_direction(0.0, 1.0), 2);
        assert_eq!(quantize_direction(-1.0, 1.0), 3);
        assert_eq!(quantize_direction(1.0, -1.0), 3);
    }
}
