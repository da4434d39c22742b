//! Non-maximum suppression on gradient magnitude with direction alignment.
//!
//! Each pixel is compared against its two neighbours along the quantized
//! gradient direction. Ties between a pixel and its forward neighbour keep
//! the backward pixel, so a symmetric step edge yields a one-pixel line
//! instead of vanishing.
//!
//! The outermost 1-pixel frame is suppressed to avoid out-of-bounds lookups.
use super::grad::Grad;
use crate::image::{ImageF32, PlaneMut};

/// Thinned magnitude image: suppressed pixels are zero.
pub fn non_max_suppression(grad: &Grad) -> ImageF32 {
    let w = grad.mag.w;
    let h = grad.mag.h;
    let mut out = ImageF32::new(w, h);
    if w < 3 || h < 3 {
        return out;
    }

    for y in 1..h - 1 {
        let out_row = out.row_mut(y);
        for x in 1..w - 1 {
            let mag = grad.mag.get(x, y);
            if mag <= 0.0 {
                continue;
            }
            let (dx, dy) = Grad::bucket_offset(grad.dir_q4[y * w + x]);
            let fwd = grad
                .mag
                .get((x as isize + dx) as usize, (y as isize + dy) as usize);
            let back = grad
                .mag
                .get((x as isize - dx) as usize, (y as isize - dy) as usize);
            if mag > back && mag >= fwd {
                out_row[x] = mag;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::grad::sobel_gradients;

    #[test]
    fn step_edge_thins_to_single_column() {
        let img = ImageF32::from_fn(12, 10, |x, _| if x < 6 { 0.0 } else { 200.0 });
        let grad = sobel_gradients(&img);
        let thin = non_max_suppression(&grad);
        for y in 1..9 {
            let cols: Vec<usize> = (0..12).filter(|&x| thin.get(x, y) > 0.0).collect();
            assert_eq!(cols, vec![5], "row {y}");
        }
    }
}
