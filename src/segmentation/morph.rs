//! Binary morphology on [`Mask`] buffers.
//!
//! Pixels outside the image count as unset for erosion and are ignored for
//! dilation, so erosion shrinks shapes touching the border.
use crate::image::{Mask, Plane};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementShape {
    #[default]
    Square,
    Cross,
}

/// Structuring element of odd `size` (forced odd, at least 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuringElement {
    pub shape: ElementShape,
    pub size: usize,
}

impl Default for StructuringElement {
    fn default() -> Self {
        Self {
            shape: ElementShape::Square,
            size: 3,
        }
    }
}

impl StructuringElement {
    pub fn square(size: usize) -> Self {
        Self {
            shape: ElementShape::Square,
            size,
        }
    }

    fn offsets(&self) -> Vec<(isize, isize)> {
        let half = (self.size.max(1) | 1) as isize / 2;
        let mut out = Vec::new();
        for dy in -half..=half {
            for dx in -half..=half {
                let keep = match self.shape {
                    ElementShape::Square => true,
                    ElementShape::Cross => dx == 0 || dy == 0,
                };
                if keep {
                    out.push((dx, dy));
                }
            }
        }
        out
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MorphOp {
    Erode,
    Dilate,
    Open,
    Close,
}

pub fn erode(src: &Mask, element: &StructuringElement) -> Mask {
    let offsets = element.offsets();
    Mask::from_fn(src.w, src.h, |x, y| {
        offsets.iter().all(|&(dx, dy)| {
            let (nx, ny) = (x as isize + dx, y as isize + dy);
            src.contains(nx, ny) && src.is_set(nx as usize, ny as usize)
        })
    })
}

pub fn dilate(src: &Mask, element: &StructuringElement) -> Mask {
    let offsets = element.offsets();
    Mask::from_fn(src.w, src.h, |x, y| {
        offsets.iter().any(|&(dx, dy)| {
            let (nx, ny) = (x as isize + dx, y as isize + dy);
            src.contains(nx, ny) && src.is_set(nx as usize, ny as usize)
        })
    })
}

/// Erosion then dilation: removes specks smaller than the element.
pub fn open(src: &Mask, element: &StructuringElement) -> Mask {
    dilate(&erode(src, element), element)
}

/// Dilation then erosion: fills gaps smaller than the element.
pub fn close(src: &Mask, element: &StructuringElement) -> Mask {
    erode(&dilate(src, element), element)
}

pub fn apply(src: &Mask, op: MorphOp, element: &StructuringElement) -> Mask {
    match op {
        MorphOp::Erode => erode(src, element),
        MorphOp::Dilate => dilate(src, element),
        MorphOp::Open => open(src, element),
        MorphOp::Close => close(src, element),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_removes_single_pixel_speck() {
        let mut mask = Mask::from_fn(12, 12, |x, y| (5..10).contains(&x) && (5..10).contains(&y));
        mask.set(1, 1, true);
        let out = open(&mask, &StructuringElement::default());
        assert!(!out.is_set(1, 1));
        assert_eq!(out.count(), 25);
    }

    #[test]
    fn close_fills_one_pixel_gap() {
        let mask = Mask::from_fn(9, 5, |x, y| x != 4 && (1..4).contains(&y) && (1..8).contains(&x));
        let out = close(&mask, &StructuringElement::default());
        assert!(out.is_set(4, 2));
    }

    #[test]
    fn cross_element_dilates_without_corners() {
        let mut mask = Mask::new(5, 5);
        mask.set(2, 2, true);
        let cross = StructuringElement {
            shape: ElementShape::Cross,
            size: 3,
        };
        let out = dilate(&mask, &cross);
        assert_eq!(out.count(), 5);
        assert!(!out.is_set(1, 1));
    }
}
