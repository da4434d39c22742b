//! Binary pixel mask (0 / 255) used for foreground masks and edge maps.
use super::traits::{Plane, PlaneMut};
use crate::types::Rect;

pub const ON: u8 = 255;
pub const OFF: u8 = 0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    pub w: usize,
    pub h: usize,
    pub data: Vec<u8>,
}

impl Mask {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![OFF; w * h],
        }
    }

    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut mask = Self::new(w, h);
        for y in 0..h {
            for x in 0..w {
                if f(x, y) {
                    mask.data[y * w + x] = ON;
                }
            }
        }
        mask
    }

    #[inline]
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.data[y * self.w + x] != OFF
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        self.data[y * self.w + x] = if on { ON } else { OFF };
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v != OFF).count()
    }

    /// Count of set pixels inside `rect` (clipped to the mask).
    pub fn count_in(&self, rect: &Rect) -> usize {
        let x1 = (rect.right() as usize).min(self.w);
        let y1 = (rect.bottom() as usize).min(self.h);
        let mut n = 0;
        for y in (rect.y as usize).min(y1)..y1 {
            let row = &self.data[y * self.w..(y + 1) * self.w];
            n += row[(rect.x as usize).min(x1)..x1]
                .iter()
                .filter(|&&v| v != OFF)
                .count();
        }
        n
    }

    /// Tight box of all set pixels.
    pub fn bounding_box(&self) -> Option<Rect> {
        let mut min_x = usize::MAX;
        let mut min_y = usize::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        for y in 0..self.h {
            for x in 0..self.w {
                if self.is_set(x, y) {
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }
        (min_x != usize::MAX)
            .then(|| Rect::from_extents(min_x as u32, min_y as u32, max_x as u32, max_y as u32))
    }

    /// Copy of a sub-rectangle.
    pub fn crop(&self, rect: &Rect) -> Mask {
        Mask::from_fn(rect.width as usize, rect.height as usize, |x, y| {
            self.is_set(rect.x as usize + x, rect.y as usize + y)
        })
    }

    pub fn and(&self, other: &Mask) -> Mask {
        self.combine(other, |a, b| a && b)
    }

    pub fn or(&self, other: &Mask) -> Mask {
        self.combine(other, |a, b| a || b)
    }

    fn combine(&self, other: &Mask, f: impl Fn(bool, bool) -> bool) -> Mask {
        debug_assert_eq!((self.w, self.h), (other.w, other.h));
        Mask {
            w: self.w,
            h: self.h,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| if f(a != OFF, b != OFF) { ON } else { OFF })
                .collect(),
        }
    }
}

impl Plane for Mask {
    type Sample = u8;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.w..(y + 1) * self.w]
    }
}

impl PlaneMut for Mask {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [u8] {
        &mut self.data[y * self.w..(y + 1) * self.w]
    }
}
