//! I/O helpers for RGBA rasters, masks and JSON.
//!
//! - `load_raster`: decode a PNG/JPEG/WebP into an owned [`RasterImage`].
//! - `save_rgba_png`: write a tightly packed RGBA buffer to a PNG.
//! - `save_mask_png`: write a binary [`Mask`] as an 8-bit grayscale PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{Mask, RasterImage};
use crate::error::{Result, SpriteError};
use image::{DynamicImage, GrayImage, RgbaImage};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Decode an image file into RGBA8.
pub fn load_raster(path: &Path) -> Result<RasterImage> {
    let img = image::open(path)?;
    raster_from_dynamic(img)
}

/// Decode an in-memory encoded image (PNG, JPEG, ...).
pub fn decode_raster(bytes: &[u8]) -> Result<RasterImage> {
    let img = image::load_from_memory(bytes)?;
    raster_from_dynamic(img)
}

pub fn raster_from_dynamic(img: DynamicImage) -> Result<RasterImage> {
    let rgba = img.into_rgba8();
    let (w, h) = rgba.dimensions();
    RasterImage::from_rgba(w, h, rgba.into_raw())
}

/// Convert an RGBA buffer into an `image::RgbaImage`.
pub fn to_rgba_image(width: u32, height: u32, data: Vec<u8>) -> Result<RgbaImage> {
    let expected = width as usize * height as usize * 4;
    let actual = data.len();
    RgbaImage::from_raw(width, height, data)
        .ok_or(SpriteError::BufferSize { expected, actual })
}

pub fn save_rgba_png(image: &RgbaImage, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    image.save(path)?;
    Ok(())
}

pub fn save_mask_png(mask: &Mask, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let out = GrayImage::from_raw(mask.w as u32, mask.h as u32, mask.data.clone()).ok_or(
        SpriteError::BufferSize {
            expected: mask.w * mask.h,
            actual: mask.data.len(),
        },
    )?;
    out.save(path)?;
    Ok(())
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| SpriteError::Config(format!("failed to serialize {}: {e}", path.display())))?;
    fs::write(path, json).map_err(|source| SpriteError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| SpriteError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}
