//! Double-threshold classification and 8-connected hysteresis.
use crate::image::{ImageF32, Mask};

const WEAK: u8 = 1;
const STRONG: u8 = 2;

/// Pixels >= `high` are strong, pixels >= `low` are weak. Weak pixels are
/// kept only when 8-connected (transitively) to a strong pixel.
pub fn hysteresis(thinned: &ImageF32, low: f32, high: f32) -> Mask {
    let (w, h) = (thinned.w, thinned.h);
    let low = low.min(high);
    let mut class = vec![0u8; w * h];
    let mut stack = Vec::new();
    for (i, &m) in thinned.data.iter().enumerate() {
        if m <= 0.0 {
            continue;
        }
        if m >= high {
            class[i] = STRONG;
            stack.push(i);
        } else if m >= low {
            class[i] = WEAK;
        }
    }

    while let Some(i) = stack.pop() {
        let (x, y) = ((i % w) as isize, (i / w) as isize);
        for dy in -1..=1isize {
            for dx in -1..=1isize {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let j = ny as usize * w + nx as usize;
                if class[j] == WEAK {
                    class[j] = STRONG;
                    stack.push(j);
                }
            }
        }
    }

    let mut mask = Mask::new(w, h);
    for (dst, &c) in mask.data.iter_mut().zip(&class) {
        if c == STRONG {
            *dst = crate::image::mask::ON;
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_pixels_survive_only_when_connected() {
        let mut img = ImageF32::new(8, 3);
        // Strong seed followed by a weak chain.
        img.set(1, 1, 200.0);
        img.set(2, 1, 60.0);
        img.set(3, 2, 60.0);
        // Isolated weak pixel.
        img.set(6, 0, 60.0);
        let mask = hysteresis(&img, 50.0, 150.0);
        assert!(mask.is_set(1, 1));
        assert!(mask.is_set(2, 1));
        assert!(mask.is_set(3, 2));
        assert!(!mask.is_set(6, 0));
        assert_eq!(mask.count(), 3);
    }
}
