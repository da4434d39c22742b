mod common;

use common::synthetic_image::{opaque_pixels, SheetBuilder, WHITE};
use sprite_splitter::extract::{AlphaFill, LayerInfo, PointKind};
use sprite_splitter::prelude::*;
use sprite_splitter::types::{PercentPoint, PercentRect, Rect};
use sprite_splitter::SpriteType;

const INK: [u8; 4] = [30, 30, 30, 255];

fn info(name: &str) -> LayerInfo {
    LayerInfo::new(name, name, SpriteType::Object)
}

#[test]
fn standard_cutout_round_trips_through_png() {
    let _ = env_logger::builder().is_test(true).try_init();
    let image = SheetBuilder::new(200, 100, WHITE)
        .rect(50, 30, 40, 30, INK)
        .build();
    let approx = PercentRect::new(22.0, 25.0, 25.0, 40.0);
    let layer = LayerExtractor::default()
        .refine(&image, &approx, &[], info("box"))
        .unwrap();

    assert_eq!(layer.refined_pixels, Rect::new(49, 29, 42, 32).unwrap());
    let back = layer.refined_bounds.to_pixels(200, 100).unwrap();
    assert_eq!(back, layer.refined_pixels);
    assert_eq!(opaque_pixels(&layer.image, 255), 36 * 26);
    assert!(layer
        .contour
        .points
        .iter()
        .any(|p| p.kind == PointKind::Corner));

    let path = std::env::temp_dir().join(format!("sprite-splitter-{}.png", std::process::id()));
    layer.save_png(&path).unwrap();
    let reloaded = image::open(&path).unwrap().into_rgba8();
    let _ = std::fs::remove_file(&path);
    assert_eq!(reloaded.dimensions(), layer.image.dimensions());
    assert_eq!(reloaded.as_raw(), layer.image.as_raw());
}

#[test]
fn surgical_cutout_of_a_disc_keeps_its_silhouette() {
    let image = SheetBuilder::new(120, 120, WHITE)
        .disc(60, 60, 25, INK)
        .build();
    let approx = PercentRect::new(30.0, 30.0, 40.0, 40.0);
    let hint = PercentPoint::new(50.0, 50.0);
    let layer = LayerExtractor::new(ExtractionOptions::surgical())
        .refine(&image, &approx, &[hint], info("disc"))
        .unwrap();

    let r = layer.refined_pixels;
    assert!(r.contains(35, 60) && r.contains(85, 60), "{r:?}");
    assert!(r.width <= 55 && r.height <= 55, "{r:?}");

    // Area of a radius-25 disc is about 1963 px.
    let covered = opaque_pixels(&layer.image, 128) as f64;
    assert!((covered - 1963.0).abs() / 1963.0 < 0.05, "{covered}");
    // Corners of the box lie outside the disc.
    assert_eq!(layer.image.get_pixel(0, 0).0[3], 0);
    assert!(layer.metadata.confidence > 0.5);
}

#[test]
fn rectangle_fill_covers_the_whole_refined_box() {
    let image = SheetBuilder::new(100, 100, WHITE)
        .disc(50, 50, 20, INK)
        .build();
    let options = ExtractionOptions {
        alpha_fill: AlphaFill::Rectangle,
        feather_radius: 0,
        ..Default::default()
    };
    let layer = LayerExtractor::new(options)
        .refine(&image, &PercentRect::new(25.0, 25.0, 50.0, 50.0), &[], info("rect"))
        .unwrap();
    assert_eq!(
        opaque_pixels(&layer.image, 255) as u64,
        layer.refined_pixels.area()
    );
    assert_eq!(layer.metadata.pixel_count, layer.refined_pixels.area());
}
