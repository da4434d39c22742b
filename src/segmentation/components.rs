//! Connected-component labelling by iterative flood fill.
use crate::image::Mask;
use crate::types::Rect;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connectivity {
    C4,
    #[default]
    C8,
}

impl Connectivity {
    fn offsets(self) -> &'static [(isize, isize)] {
        const C4: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        const C8: [(isize, isize); 8] = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ];
        match self {
            Connectivity::C4 => &C4,
            Connectivity::C8 => &C8,
        }
    }
}

/// One labelled blob of set mask pixels.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// 1-based label in the labelling buffer.
    pub label: u32,
    pub bounds: Rect,
    pub pixel_count: usize,
    pub centroid: [f32; 2],
}

impl Component {
    /// Foreground pixels over bounding-box area.
    pub fn density(&self) -> f32 {
        self.pixel_count as f32 / self.bounds.area() as f32
    }
}

/// Per-pixel labels (0 = background) plus component summaries.
#[derive(Clone, Debug)]
pub struct Labeling {
    pub w: usize,
    pub h: usize,
    pub labels: Vec<u32>,
    pub components: Vec<Component>,
}

impl Labeling {
    #[inline]
    pub fn label_at(&self, x: usize, y: usize) -> u32 {
        self.labels[y * self.w + x]
    }

    /// Mask holding exactly the pixels of the listed labels.
    pub fn mask_of(&self, labels: &[u32]) -> Mask {
        let mut mask = Mask::new(self.w, self.h);
        for (dst, &l) in mask.data.iter_mut().zip(&self.labels) {
            if l != 0 && labels.contains(&l) {
                *dst = crate::image::mask::ON;
            }
        }
        mask
    }
}

/// Label every connected blob of set pixels in raster order.
pub fn label_components(mask: &Mask, connectivity: Connectivity) -> Labeling {
    let (w, h) = (mask.w, mask.h);
    let mut labels = vec![0u32; w * h];
    let mut components = Vec::new();
    let mut stack = Vec::new();
    let offsets = connectivity.offsets();

    for start in 0..w * h {
        if labels[start] != 0 || mask.data[start] == 0 {
            continue;
        }
        let label = components.len() as u32 + 1;
        labels[start] = label;
        stack.push(start);

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (usize::MAX, usize::MAX, 0, 0);
        let (mut sum_x, mut sum_y, mut count) = (0.0f64, 0.0f64, 0usize);
        while let Some(i) = stack.pop() {
            let (x, y) = (i % w, i / w);
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
            sum_x += x as f64;
            sum_y += y as f64;
            count += 1;
            for &(dx, dy) in offsets {
                let (nx, ny) = (x as isize + dx, y as isize + dy);
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let j = ny as usize * w + nx as usize;
                if labels[j] == 0 && mask.data[j] != 0 {
                    labels[j] = label;
                    stack.push(j);
                }
            }
        }

        components.push(Component {
            label,
            bounds: Rect::from_extents(min_x as u32, min_y as u32, max_x as u32, max_y as u32),
            pixel_count: count,
            centroid: [(sum_x / count as f64) as f32, (sum_y / count as f64) as f32],
        });
    }

    Labeling {
        w,
        h,
        labels,
        components,
    }
}

/// Component summaries only.
pub fn connected_components(mask: &Mask, connectivity: Connectivity) -> Vec<Component> {
    label_components(mask, connectivity).components
}

/// Components of the part of `mask` inside `band`, in full-image coordinates.
pub fn components_in_band(mask: &Mask, band: &Rect, connectivity: Connectivity) -> Vec<Component> {
    band_components(mask, band, connectivity)
        .components
        .into_iter()
        .map(|c| to_image_coords(c, band))
        .collect()
}

/// Components inside `band`, each paired with the label of the
/// `whole`-image component it is part of. `whole` must label the same mask
/// with the same connectivity.
pub fn band_components_in(
    whole: &Labeling,
    mask: &Mask,
    band: &Rect,
    connectivity: Connectivity,
) -> Vec<(Component, u32)> {
    let sub = band_components(mask, band, connectivity);
    let mut out = Vec::with_capacity(sub.components.len());
    for c in &sub.components {
        // The flood seed is the component's first pixel in raster order, so
        // it lies on the component's top row.
        let y = c.bounds.y as usize;
        let seed = (c.bounds.x as usize..c.bounds.right() as usize)
            .find(|&x| sub.label_at(x, y) == c.label);
        if let Some(x) = seed {
            let label = whole.label_at(x + band.x as usize, y + band.y as usize);
            out.push((to_image_coords(c.clone(), band), label));
        }
    }
    out
}

fn band_components(mask: &Mask, band: &Rect, connectivity: Connectivity) -> Labeling {
    label_components(&mask.crop(band), connectivity)
}

fn to_image_coords(mut c: Component, band: &Rect) -> Component {
    c.bounds = band.offset_child(&c.bounds);
    c.centroid = [c.centroid[0] + band.x as f32, c.centroid[1] + band.y as f32];
    c
}
