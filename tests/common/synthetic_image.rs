use sprite_splitter::image::RasterImage;

pub const WHITE: [u8; 4] = [255, 255, 255, 255];
pub const CLEAR: [u8; 4] = [0, 0, 0, 0];

/// Paints flat shapes onto a solid canvas.
pub struct SheetBuilder {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl SheetBuilder {
    pub fn new(width: u32, height: u32, background: [u8; 4]) -> Self {
        assert!(width > 0 && height > 0, "image dimensions must be positive");
        let data = background
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    fn put(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if x < self.width && y < self.height {
            let i = ((y * self.width + x) * 4) as usize;
            self.data[i..i + 4].copy_from_slice(&color);
        }
    }

    pub fn rect(mut self, x: u32, y: u32, w: u32, h: u32, color: [u8; 4]) -> Self {
        for yy in y..y + h {
            for xx in x..x + w {
                self.put(xx, yy, color);
            }
        }
        self
    }

    pub fn disc(mut self, cx: u32, cy: u32, r: u32, color: [u8; 4]) -> Self {
        let r2 = (r * r) as i64;
        for y in cy.saturating_sub(r)..=cy + r {
            for x in cx.saturating_sub(r)..=cx + r {
                let (dx, dy) = (x as i64 - cx as i64, y as i64 - cy as i64);
                if dx * dx + dy * dy <= r2 {
                    self.put(x, y, color);
                }
            }
        }
        self
    }

    pub fn build(self) -> RasterImage {
        RasterImage::from_rgba(self.width, self.height, self.data)
            .expect("builder keeps the buffer size consistent")
    }
}

/// Pixels of a cutout at or above `threshold` alpha.
pub fn opaque_pixels(image: &image::RgbaImage, threshold: u8) -> usize {
    image.pixels().filter(|p| p.0[3] >= threshold).count()
}
